use axum::{Json, extract::State};

use deskpool_wire::execute::{ExecuteRequest, ExecuteResponse, missing_execute_field};

use crate::error::AgentError;
use crate::state::AppState;
use crate::usecase::launch::{LaunchParams, LaunchSessionUseCase};

// ── POST /execute ────────────────────────────────────────────────────────────

/// Launches one session container. The body is checked field by field so
/// a malformed request is rejected with the name of the missing field
/// instead of a serde rejection.
pub async fn execute(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ExecuteResponse>, AgentError> {
    if let Some(field) = missing_execute_field(&body) {
        return Err(AgentError::MissingField(field));
    }
    let request: ExecuteRequest = serde_json::from_value(body)
        .map_err(|e| AgentError::InvalidRequest(format!("malformed request: {e}")))?;

    let usecase = LaunchSessionUseCase {
        launcher: state.launcher.clone(),
        scanner: crate::infra::host::TcpPortScanner,
        params: LaunchParams {
            port_start: state.config.rdp_port_start,
            port_end: state.config.rdp_port_end,
            gpu_capable: state.gpu_capable,
            allowed_images: state.allowed_images.as_ref().clone(),
            advertised_host: state.advertised_host(),
        },
    };

    let session = usecase.execute(request).await?;
    Ok(Json(ExecuteResponse::Ok {
        rdp_host: session.rdp_host,
        rdp_port: session.rdp_port,
        container_id: session.container_id,
        startup_seconds: Some(session.startup_seconds),
    }))
}
