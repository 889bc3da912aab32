//! The `POST /execute` request/response pair.

use serde::{Deserialize, Serialize};

/// Launch order sent by the controller to the chosen agent.
///
/// The credentials flow through to the container init so the user can
/// authenticate against their own RDP session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub username: String,
    pub password: String,
    pub image: String,
    pub cpu_limit: u32,
    pub memory_limit_mb: u64,
    pub gpu: bool,
}

/// Fields every `/execute` body must carry. Checked one by one so the
/// rejection can name the first missing field.
pub const EXECUTE_FIELDS: [&str; 6] = [
    "username",
    "password",
    "image",
    "cpu_limit",
    "memory_limit_mb",
    "gpu",
];

/// Returns the first required field absent from a raw `/execute` body.
pub fn missing_execute_field(body: &serde_json::Value) -> Option<&'static str> {
    EXECUTE_FIELDS
        .into_iter()
        .find(|f| body.get(f).is_none_or(serde_json::Value::is_null))
}

/// Agent reply envelope.
///
/// Business failures from the runtime ride HTTP 200 with `status:"error"`
/// so the controller has a single parsing path; validation failures reuse
/// the same envelope under a 4xx, port exhaustion under 503.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecuteResponse {
    Ok {
        rdp_host: String,
        rdp_port: u16,
        container_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        startup_seconds: Option<f64>,
    },
    Error {
        error: String,
    },
}
