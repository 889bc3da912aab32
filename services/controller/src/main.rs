use std::sync::Arc;

use tracing::info;

use deskpool_controller::config::ControllerConfig;
use deskpool_controller::infra::http::HttpAgentCaller;
use deskpool_controller::infra::users::FileUserStore;
use deskpool_controller::router::build_router;
use deskpool_controller::state::{AppState, Fleet, prune_loop};
use deskpool_controller::usecase::session::Sessions;

#[tokio::main]
async fn main() {
    deskpool_core::tracing::init_tracing();

    let config = ControllerConfig::from_env();

    let caller = HttpAgentCaller::new(config.dispatch_timeout, config.api_token.clone())
        .expect("failed to build dispatch client");

    let allowed_images = deskpool_core::listfile::load_lines(&config.allowed_images_file)
        .await
        .expect("failed to read allowed images file");

    let state = AppState {
        fleet: Fleet::new(),
        sessions: Sessions::new(config.session_lifetime),
        users: FileUserStore::new(config.user_file.clone()),
        caller,
        allowed_images: Arc::new(allowed_images),
        config: Arc::new(config),
    };

    // Dead-agent pruner
    tokio::spawn(prune_loop(
        state.fleet.clone(),
        state.config.agent_online_window,
    ));

    let addr = format!("0.0.0.0:{}", state.config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("controller listening on {addr}");
    let router = build_router(state);
    axum::serve(listener, router).await.expect("server error");
}
