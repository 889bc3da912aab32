//! Idle-session reclamation.
//!
//! A managed container is idle iff no peer holds an ESTABLISHED TCP
//! connection to its internal RDP port and it has been up longer than the
//! idle timeout. Every probe error fails safe: the container stays.

use std::time::Duration;

use tracing::{info, warn};

use crate::domain::repository::ContainerStore;

pub struct ReclaimIdleUseCase<S: ContainerStore> {
    pub store: S,
    pub idle_timeout: Duration,
}

impl<S: ContainerStore> ReclaimIdleUseCase<S> {
    /// One reclamation pass. Returns the ids of reclaimed containers.
    pub async fn run_once(&self) -> Vec<String> {
        if let Err(e) = self.store.prune_stopped().await {
            warn!(error = %e, "pruning stopped containers failed");
        }

        let containers = match self.store.list_managed(true).await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "listing managed containers failed, skipping pass");
                return Vec::new();
            }
        };

        let mut reclaimed = Vec::new();
        for container in containers {
            match self.store.has_established_rdp(&container.id).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!(id = %container.id, error = %e, "rdp probe failed, treating as active");
                    continue;
                }
            }

            let uptime = match self.store.uptime(&container.id).await {
                Ok(u) => u,
                Err(e) => {
                    warn!(id = %container.id, error = %e, "uptime lookup failed, treating as active");
                    continue;
                }
            };
            if uptime <= self.idle_timeout {
                continue;
            }

            match self.store.stop_and_remove(&container.id).await {
                Ok(()) => {
                    info!(id = %container.id, uptime_secs = uptime.as_secs(), "reclaimed idle session");
                    reclaimed.push(container.id);
                }
                Err(e) => warn!(id = %container.id, error = %e, "stop/remove failed"),
            }
        }
        reclaimed
    }
}

/// Background loop driving [`ReclaimIdleUseCase::run_once`] forever.
pub async fn run_loop<S: ContainerStore>(usecase: ReclaimIdleUseCase<S>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; skip it so a crash-looping agent
    // does not hammer the engine.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let reclaimed = usecase.run_once().await;
        if !reclaimed.is_empty() {
            info!(count = reclaimed.len(), "reclamation pass removed idle sessions");
        }
    }
}
