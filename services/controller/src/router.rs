use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use deskpool_core::auth::{BearerToken, require_bearer};
use deskpool_core::health::{healthz, readyz};
use deskpool_core::middleware::request_id_layer;

use crate::handlers::{
    fleet::{agents, heartbeat},
    launch::launch,
    session::{change_password, login, logout},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let bearer = BearerToken::new(state.config.api_token.clone());

    // Agent-facing surface: shares the fleet secret with the agents.
    let agent_facing = Router::new()
        .route("/heartbeat", post(heartbeat))
        .route_layer(middleware::from_fn_with_state(bearer, require_bearer));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Sessions
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/change_password", post(change_password))
        // Placement
        .route("/launch", post(launch))
        .route("/api/agents", get(agents))
        .merge(agent_facing)
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
