//! Fleet membership messages: heartbeat, `/info` and `/ping`.

use deskpool_domain::capacity::CapacitySnapshot;
use serde::{Deserialize, Serialize};

/// Snapshot an agent pushes to the controller's `/heartbeat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatBody {
    pub agent_id: String,
    /// Base URL the controller should dial back on, scheme included.
    pub url: String,
    #[serde(flatten)]
    pub capacity: CapacitySnapshot,
}

/// Fields every heartbeat must carry, in rejection order.
pub const HEARTBEAT_FIELDS: [&str; 8] = [
    "agent_id",
    "url",
    "total_cpu",
    "used_cpu",
    "total_mem_mb",
    "used_mem_mb",
    "running_containers",
    "gpu_capable",
];

/// Returns the first required field absent from a raw heartbeat body, so
/// the 400 can say `missing field: X` as the protocol demands.
pub fn missing_heartbeat_field(body: &serde_json::Value) -> Option<&'static str> {
    HEARTBEAT_FIELDS
        .into_iter()
        .find(|f| body.get(f).is_none_or(serde_json::Value::is_null))
}

/// `GET /info` reply: the heartbeat shape plus a wall-clock timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoResponse {
    #[serde(flatten)]
    pub heartbeat: HeartbeatBody,
    /// Unix seconds at sampling time.
    pub ts: i64,
}

/// `GET /ping` reply; liveness only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    pub agent_id: String,
}

impl PingResponse {
    pub fn ok(agent_id: impl Into<String>) -> Self {
        Self {
            status: "ok".to_owned(),
            agent_id: agent_id.into(),
        }
    }
}
