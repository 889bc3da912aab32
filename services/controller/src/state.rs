use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use deskpool_wire::fleet::HeartbeatBody;

use crate::config::ControllerConfig;
use crate::domain::types::{AgentRecord, AgentView};
use crate::infra::http::HttpAgentCaller;
use crate::infra::users::FileUserStore;
use crate::usecase::session::Sessions;

/// The controller's live fleet view: `agent_id -> record` behind a single
/// read/write lock. Readers take snapshots so placement operates on a
/// consistent view without holding the lock across network I/O.
#[derive(Clone, Default)]
pub struct Fleet {
    inner: Arc<RwLock<HashMap<String, AgentRecord>>>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb a heartbeat: insert or refresh the record, stamping
    /// `last_seen` now.
    pub async fn absorb(&self, heartbeat: HeartbeatBody) {
        let record = AgentRecord {
            agent_id: heartbeat.agent_id,
            url: heartbeat.url.trim_end_matches('/').to_owned(),
            capacity: heartbeat.capacity,
            last_seen: Instant::now(),
        };
        self.inner.write().await.insert(record.agent_id.clone(), record);
    }

    /// Consistent copy of the fleet with each agent's online verdict.
    pub async fn snapshot(&self, online_window: Duration) -> Vec<AgentView> {
        self.inner
            .read()
            .await
            .values()
            .map(|r| AgentView {
                agent_id: r.agent_id.clone(),
                url: r.url.clone(),
                capacity: r.capacity.clone(),
                online: r.online(online_window),
            })
            .collect()
    }

    /// Drop records not heard from for `max_age`. Run by the dead-agent
    /// pruner so the map does not grow with every agent that ever lived.
    pub async fn prune(&self, max_age: Duration) -> usize {
        let mut fleet = self.inner.write().await;
        let before = fleet.len();
        fleet.retain(|_, r| r.last_seen.elapsed() <= max_age);
        before - fleet.len()
    }
}

/// Background task dropping long-dead agents from the fleet map.
pub async fn prune_loop(fleet: Fleet, online_window: Duration) {
    // Records stay visible (as offline) for a few windows before removal.
    let max_age = online_window * 3;
    let mut ticker = tokio::time::interval(online_window.max(Duration::from_secs(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let dropped = fleet.prune(max_age).await;
        if dropped > 0 {
            debug!(dropped, "pruned dead agents from fleet");
        }
    }
}

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ControllerConfig>,
    pub fleet: Fleet,
    pub sessions: Sessions,
    pub users: FileUserStore,
    pub caller: HttpAgentCaller,
    pub allowed_images: Arc<Vec<String>>,
}
