//! Push-mode fleet membership: the agent periodically posts its capacity
//! snapshot to the controller. A missed beat only matters once the
//! controller's online window elapses, so failures are logged and retried
//! on the next tick rather than escalated.

use tracing::{debug, warn};

use crate::state::AppState;

pub async fn run_loop(state: AppState) {
    let client = match reqwest::Client::builder()
        .timeout(state.config.heartbeat_interval)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "heartbeat client could not be built, heartbeats disabled");
            return;
        }
    };
    let endpoint = format!("{}/heartbeat", state.config.server_url);

    let mut ticker = tokio::time::interval(state.config.heartbeat_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(e) = beat(&state, &client, &endpoint).await {
            warn!(error = %e, endpoint = %endpoint, "heartbeat failed");
        }
    }
}

async fn beat(state: &AppState, client: &reqwest::Client, endpoint: &str) -> anyhow::Result<()> {
    let info = state.info_response().await?;
    let mut request = client.post(endpoint).json(&info.heartbeat);
    if let Some(token) = &state.config.api_token {
        request = request.bearer_auth(token);
    }
    let response = request.send().await?;
    anyhow::ensure!(
        response.status().is_success(),
        "controller answered {}",
        response.status()
    );
    debug!(running = info.heartbeat.capacity.running_containers, "heartbeat accepted");
    Ok(())
}
