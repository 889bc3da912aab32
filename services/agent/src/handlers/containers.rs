use axum::{Json, extract::State};
use serde::Serialize;

use crate::domain::repository::ContainerStore;
use crate::error::AgentError;
use crate::state::AppState;

// ── GET /containers ──────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ContainersResponse {
    pub containers: Vec<ContainerView>,
}

#[derive(Serialize)]
pub struct ContainerView {
    pub id: String,
    pub image: String,
    pub names: Vec<String>,
}

/// Debug view of the running managed containers, straight from the engine.
pub async fn containers(
    State(state): State<AppState>,
) -> Result<Json<ContainersResponse>, AgentError> {
    let containers = state
        .store
        .list_managed(true)
        .await?
        .into_iter()
        .map(|c| ContainerView {
            id: c.id,
            image: c.image,
            names: c.names,
        })
        .collect();
    Ok(Json(ContainersResponse { containers }))
}
