use axum::{Json, extract::State};

use deskpool_wire::fleet::{InfoResponse, PingResponse};

use crate::error::AgentError;
use crate::state::AppState;

// ── GET /ping ────────────────────────────────────────────────────────────────

pub async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse::ok(state.config.agent_id.clone()))
}

// ── GET /info ────────────────────────────────────────────────────────────────

pub async fn info(State(state): State<AppState>) -> Result<Json<InfoResponse>, AgentError> {
    let info = state.info_response().await?;
    Ok(Json(info))
}
