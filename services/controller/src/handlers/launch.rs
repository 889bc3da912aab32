use axum::{Json, extract::State};
use serde::Serialize;

use deskpool_wire::execute::{ExecuteRequest, missing_execute_field};

use crate::domain::repository::UserStore;
use crate::error::ControllerError;
use crate::state::AppState;
use crate::usecase::admission::admit;
use crate::usecase::launch::DispatchUseCase;
use crate::usecase::placement::{Demand, ScoreWeights, rank_candidates};

// ── POST /launch ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LaunchResponse {
    pub status: String,
    pub agent_id: String,
    pub rdp_host: String,
    pub rdp_port: u16,
    pub container_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_seconds: Option<f64>,
    /// Human-readable summary for the legacy client.
    pub message: String,
}

/// Admit, place and dispatch one session launch.
///
/// Authentication rides in the body: the credentials must flow to the
/// agent anyway, so `/launch` verifies them against the user store instead
/// of trusting a session. May block for the sum of per-candidate deadlines
/// plus inter-attempt spacing; callers need a generous client timeout.
pub async fn launch(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<LaunchResponse>, ControllerError> {
    if let Some(field) = missing_execute_field(&body) {
        return Err(ControllerError::Validation(format!("missing field: {field}")));
    }
    let mut request: ExecuteRequest = serde_json::from_value(body)
        .map_err(|e| ControllerError::Validation(format!("malformed request: {e}")))?;

    request.username = request.username.trim().to_owned();
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ControllerError::Unauthorized);
    }
    let user = state
        .users
        .verify(&request.username, &request.password)
        .await?
        .ok_or(ControllerError::Unauthorized)?;

    request.image = admit(&request, user.role, &state.allowed_images)?;

    let fleet = state.fleet.snapshot(state.config.agent_online_window).await;
    let candidates = rank_candidates(
        &fleet,
        Demand {
            cpu: request.cpu_limit,
            mem_mb: request.memory_limit_mb,
            gpu: request.gpu,
        },
        ScoreWeights::default(),
    );

    let usecase = DispatchUseCase {
        caller: state.caller.clone(),
        retry_delay: state.config.fallback_retry_delay,
    };
    let outcome = usecase.execute(&candidates, &request).await?;

    let message = format!(
        "RDP session ready: connect to {}:{} (agent {})",
        outcome.rdp_host, outcome.rdp_port, outcome.agent_id
    );
    Ok(Json(LaunchResponse {
        status: "ok".to_owned(),
        agent_id: outcome.agent_id,
        rdp_host: outcome.rdp_host,
        rdp_port: outcome.rdp_port,
        container_id: outcome.container_id,
        startup_seconds: outcome.startup_seconds,
        message,
    }))
}
