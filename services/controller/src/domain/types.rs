//! Controller-side domain types.

use std::time::{Duration, Instant};

use deskpool_domain::capacity::CapacitySnapshot;
use deskpool_domain::role::UserRole;

/// One worker in the fleet, as last reported by its heartbeat.
#[derive(Debug, Clone)]
pub struct AgentRecord {
    pub agent_id: String,
    /// Base URL, trailing slash stripped.
    pub url: String,
    pub capacity: CapacitySnapshot,
    pub last_seen: Instant,
}

impl AgentRecord {
    pub fn online(&self, window: Duration) -> bool {
        self.last_seen.elapsed() <= window
    }
}

/// Read-only copy of one agent used during placement. Snapshots are taken
/// under the fleet lock and then released, so no lock is held across
/// network I/O.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentView {
    pub agent_id: String,
    pub url: String,
    pub capacity: CapacitySnapshot,
    pub online: bool,
}

/// A user as stored in the flat-file store, minus the hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub username: String,
    pub first_login: bool,
    pub role: UserRole,
}

/// What a successful dispatch hands back to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOutcome {
    pub agent_id: String,
    pub rdp_host: String,
    pub rdp_port: u16,
    pub container_id: String,
    pub startup_seconds: Option<f64>,
}
