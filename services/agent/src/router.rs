use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use deskpool_core::auth::{BearerToken, require_bearer};
use deskpool_core::health::{healthz, readyz};
use deskpool_core::middleware::request_id_layer;

use crate::handlers::{containers::containers, execute::execute, info::info, info::ping};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let bearer = BearerToken::new(state.config.api_token.clone());

    // /ping stays open: it is a liveness probe, not part of the
    // controller-facing surface.
    let guarded = Router::new()
        .route("/info", get(info))
        .route("/execute", post(execute))
        .route("/containers", get(containers))
        .route_layer(middleware::from_fn_with_state(bearer, require_bearer));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Liveness
        .route("/ping", get(ping))
        .merge(guarded)
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
