use std::sync::Arc;

use tracing::info;

use deskpool_agent::config::AgentConfig;
use deskpool_agent::infra::docker::DockerStore;
use deskpool_agent::infra::heartbeat;
use deskpool_agent::infra::host::{HostStats, gpu_tooling_present};
use deskpool_agent::infra::launcher::ShellLauncher;
use deskpool_agent::router::build_router;
use deskpool_agent::state::AppState;
use deskpool_agent::usecase::reclaim::{ReclaimIdleUseCase, run_loop};

#[tokio::main]
async fn main() {
    deskpool_core::tracing::init_tracing();

    let config = AgentConfig::from_env();

    let store = DockerStore::connect()
        .await
        .expect("failed to reach container engine");

    let allowed_images = deskpool_core::listfile::load_lines(&config.allowed_images_file)
        .await
        .expect("failed to read allowed images file");

    let gpu_capable = config.gpu_enabled && gpu_tooling_present();

    let state = AppState {
        launcher: ShellLauncher::new(
            config.launch_script.clone(),
            config.agent_id.clone(),
            config.pull_always,
        ),
        host: Arc::new(HostStats::new()),
        store: store.clone(),
        gpu_capable,
        allowed_images: Arc::new(allowed_images),
        config: Arc::new(config),
    };

    // Idle reclamation
    let reclaim = ReclaimIdleUseCase {
        store: store.clone(),
        idle_timeout: state.config.container_idle_timeout,
    };
    tokio::spawn(run_loop(reclaim, state.config.cleanup_interval));

    // Push-mode fleet membership
    tokio::spawn(heartbeat::run_loop(state.clone()));

    let addr = format!("0.0.0.0:{}", state.config.agent_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!(
        agent_id = %state.config.agent_id,
        gpu_capable,
        "agent listening on {addr}"
    );
    let router = build_router(state);
    axum::serve(listener, router).await.expect("server error");
}
