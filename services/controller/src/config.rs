use std::path::PathBuf;
use std::time::Duration;

/// Controller configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// TCP port to listen on (default 5000). Env var: `SERVER_PORT`.
    pub server_port: u16,
    /// HMAC key for session cookies. Required. Env var: `SECRET_KEY`.
    pub secret_key: String,
    /// Session lifetime in seconds (default 12 h). Env var:
    /// `SESSION_LIFETIME`.
    pub session_lifetime: Duration,
    /// An agent is online iff its last heartbeat is at most this old
    /// (default 40 s). Env var: `AGENT_ONLINE_WINDOW`.
    pub agent_online_window: Duration,
    /// Per-candidate `/execute` deadline (default 12 s). Env var:
    /// `DISPATCH_TIMEOUT`.
    pub dispatch_timeout: Duration,
    /// Spacing between fallback attempts, seconds with fraction
    /// (default 0.8). Env var: `FALLBACK_RETRY_DELAY`.
    pub fallback_retry_delay: Duration,
    /// Flat-file user store (default `users.txt`). Env var: `USER_FILE`.
    pub user_file: PathBuf,
    /// Allowed-images list; absent or empty admits any image
    /// (default `allowed_images.txt`). Env var: `ALLOWED_IMAGES_FILE`.
    pub allowed_images_file: PathBuf,
    /// Shared secret expected on `/heartbeat` and attached to agent
    /// calls; empty disables auth. Env var: `API_TOKEN`.
    pub api_token: Option<String>,
}

impl ControllerConfig {
    pub fn from_env() -> Self {
        Self {
            server_port: env_parse("SERVER_PORT", 5000),
            secret_key: std::env::var("SECRET_KEY").expect("SECRET_KEY"),
            session_lifetime: Duration::from_secs(env_parse("SESSION_LIFETIME", 12 * 3600)),
            agent_online_window: Duration::from_secs(env_parse("AGENT_ONLINE_WINDOW", 40)),
            dispatch_timeout: Duration::from_secs(env_parse("DISPATCH_TIMEOUT", 12)),
            fallback_retry_delay: Duration::from_secs_f64(env_parse("FALLBACK_RETRY_DELAY", 0.8)),
            user_file: PathBuf::from(env_or("USER_FILE", "users.txt")),
            allowed_images_file: PathBuf::from(env_or(
                "ALLOWED_IMAGES_FILE",
                "allowed_images.txt",
            )),
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
