use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use deskpool_domain::capacity::CapacitySnapshot;
use deskpool_wire::fleet::{HeartbeatBody, missing_heartbeat_field};

use crate::handlers::session::AuthSession;
use crate::state::AppState;

// ── POST /heartbeat ──────────────────────────────────────────────────────────

/// Absorb an agent snapshot. The body is validated field by field so the
/// 400 names the missing field, as the wire protocol demands.
pub async fn heartbeat(State(state): State<AppState>, Json(body): Json<serde_json::Value>) -> Response {
    if let Some(field) = missing_heartbeat_field(&body) {
        return bad_request(format!("missing field: {field}"));
    }
    let heartbeat: HeartbeatBody = match serde_json::from_value(body) {
        Ok(hb) => hb,
        Err(e) => return bad_request(format!("malformed heartbeat: {e}")),
    };
    if let Err(e) = heartbeat.capacity.validate() {
        return bad_request(e.to_string());
    }

    tracing::debug!(agent_id = %heartbeat.agent_id, "heartbeat absorbed");
    state.fleet.absorb(heartbeat).await;
    Json(serde_json::json!({"status": "ok"})).into_response()
}

fn bad_request(error: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": error})),
    )
        .into_response()
}

// ── GET /api/agents ──────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AgentStatusView {
    pub agent_id: String,
    pub url: String,
    #[serde(flatten)]
    pub capacity: CapacitySnapshot,
    pub online: bool,
}

/// Current fleet snapshot for UI refresh. Session-guarded: the fleet view
/// leaks host addresses and capacity, which is operator data.
pub async fn agents(
    _session: AuthSession,
    State(state): State<AppState>,
) -> Json<Vec<AgentStatusView>> {
    let mut views: Vec<AgentStatusView> = state
        .fleet
        .snapshot(state.config.agent_online_window)
        .await
        .into_iter()
        .map(|a| AgentStatusView {
            agent_id: a.agent_id,
            url: a.url,
            capacity: a.capacity,
            online: a.online,
        })
        .collect();
    views.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
    Json(views)
}
