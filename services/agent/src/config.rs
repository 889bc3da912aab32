use std::path::PathBuf;
use std::time::Duration;

/// Agent configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Unique identity of this agent within the fleet. Env var: `AGENT_ID`.
    pub agent_id: String,
    /// TCP port the agent listens on (default 5001). Env var: `AGENT_PORT`.
    pub agent_port: u16,
    /// Host the controller should advertise to users; empty means
    /// best-effort local-IP probing. Env var: `PUBLIC_HOST`.
    pub public_host: String,
    /// Controller base URL for heartbeats, trailing slash stripped
    /// (default `http://127.0.0.1:5000`). Env var: `SERVER_URL`.
    pub server_url: String,
    /// Seconds between heartbeats (default 5). Env var: `HEARTBEAT_INTERVAL`.
    pub heartbeat_interval: Duration,
    /// Inclusive host port range handed out for RDP endpoints
    /// (defaults 40000..=45000). Env vars: `RDP_PORT_RANGE_START`,
    /// `RDP_PORT_RANGE_END`.
    pub rdp_port_start: u16,
    pub rdp_port_end: u16,
    /// Master switch for GPU support; the host still has to prove GPU
    /// capability at startup (default true). Env var: `GPU_ENABLED`.
    pub gpu_enabled: bool,
    /// Minutes between reclamation passes (default 15). Env var:
    /// `CLEANUP_INTERVAL_MINUTES`.
    pub cleanup_interval: Duration,
    /// Minutes a session may sit without an established RDP connection
    /// before it is reclaimed (default 120). Env var:
    /// `CONTAINER_IDLE_TIMEOUT_MINUTES`.
    pub container_idle_timeout: Duration,
    /// Allowed-images list; absent or empty admits any image
    /// (default `allowed_images.txt`). Env var: `ALLOWED_IMAGES_FILE`.
    pub allowed_images_file: PathBuf,
    /// Force an image pull on every launch (default false). Env var:
    /// `PULL_ALWAYS`.
    pub pull_always: bool,
    /// Runtime shell helper invoked to start a session container
    /// (default `scripts/docker_launch.sh`). Env var: `LAUNCH_SCRIPT`.
    pub launch_script: PathBuf,
    /// Shared secret expected on inbound calls and attached to heartbeats;
    /// empty disables auth. Env var: `API_TOKEN`.
    pub api_token: Option<String>,
}

impl AgentConfig {
    pub fn from_env() -> Self {
        Self {
            agent_id: env_or("AGENT_ID", "agent-local"),
            agent_port: env_parse("AGENT_PORT", 5001),
            public_host: env_or("PUBLIC_HOST", ""),
            server_url: env_or("SERVER_URL", "http://127.0.0.1:5000")
                .trim_end_matches('/')
                .to_owned(),
            heartbeat_interval: Duration::from_secs(env_parse("HEARTBEAT_INTERVAL", 5)),
            rdp_port_start: env_parse("RDP_PORT_RANGE_START", 40000),
            rdp_port_end: env_parse("RDP_PORT_RANGE_END", 45000),
            gpu_enabled: env_bool("GPU_ENABLED", true),
            cleanup_interval: Duration::from_secs(
                env_parse::<u64>("CLEANUP_INTERVAL_MINUTES", 15) * 60,
            ),
            container_idle_timeout: Duration::from_secs(
                env_parse::<u64>("CONTAINER_IDLE_TIMEOUT_MINUTES", 120) * 60,
            ),
            allowed_images_file: PathBuf::from(env_or(
                "ALLOWED_IMAGES_FILE",
                "allowed_images.txt",
            )),
            pull_always: env_bool("PULL_ALWAYS", false),
            launch_script: PathBuf::from(env_or("LAUNCH_SCRIPT", "scripts/docker_launch.sh")),
            api_token: std::env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}
