//! Agent-side domain types.

/// Everything the runtime helper needs to start one session container.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSpec {
    pub image: String,
    /// `rdp_<user>_<unix_seconds>`, also the container's engine name.
    pub container_name: String,
    /// Host port published onto the container's internal RDP port.
    pub host_port: u16,
    pub cpu_limit: u32,
    pub memory_limit_mb: u64,
    pub gpu: bool,
    pub username: String,
    pub password: String,
}

/// A container carrying the management label, as reported by the engine.
/// The label is the sole ownership truth; the agent keeps no in-process
/// registry that could diverge from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedContainer {
    pub id: String,
    pub image: String,
    pub names: Vec<String>,
}

/// Successful launch, ready to be wrapped into the wire envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchedSession {
    pub rdp_host: String,
    pub rdp_port: u16,
    pub container_id: String,
    pub startup_seconds: f64,
}

/// The internal RDP port every session image listens on.
pub const RDP_INTERNAL_PORT: u16 = 3389;

/// Label marking containers owned by the agent.
pub const MANAGED_LABEL: &str = "managed_by=rdp_agent";
