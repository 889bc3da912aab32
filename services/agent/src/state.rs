use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use deskpool_domain::capacity::CapacitySnapshot;
use deskpool_wire::fleet::{HeartbeatBody, InfoResponse};

use crate::config::AgentConfig;
use crate::domain::repository::ContainerStore;
use crate::infra::docker::DockerStore;
use crate::infra::host::{HostStats, local_ip_probe};
use crate::infra::launcher::ShellLauncher;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AgentConfig>,
    pub host: Arc<HostStats>,
    pub store: DockerStore,
    pub launcher: ShellLauncher,
    /// Decided once at startup: `GPU_ENABLED` and the tooling is present.
    pub gpu_capable: bool,
    pub allowed_images: Arc<Vec<String>>,
}

impl AppState {
    /// Host users should connect to: the configured override, else the
    /// probed local IP.
    pub fn advertised_host(&self) -> String {
        if self.config.public_host.is_empty() {
            local_ip_probe()
        } else {
            self.config.public_host.clone()
        }
    }

    /// Base URL the controller dials back on.
    pub fn public_url(&self) -> String {
        format!("http://{}:{}", self.advertised_host(), self.config.agent_port)
    }

    /// Assemble the full capacity snapshot: OS sample plus the engine's
    /// label-filtered running count.
    pub async fn capacity_snapshot(&self) -> anyhow::Result<CapacitySnapshot> {
        let sample = self.host.sample();
        let running_containers = self.store.running_count().await?;
        Ok(CapacitySnapshot {
            total_cpu: sample.total_cpu,
            used_cpu: sample.used_cpu,
            total_mem_mb: sample.total_mem_mb,
            used_mem_mb: sample.used_mem_mb,
            running_containers,
            gpu_capable: self.gpu_capable,
        })
    }

    pub async fn info_response(&self) -> anyhow::Result<InfoResponse> {
        let capacity = self.capacity_snapshot().await?;
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Ok(InfoResponse {
            heartbeat: HeartbeatBody {
                agent_id: self.config.agent_id.clone(),
                url: self.public_url(),
                capacity,
            },
            ts,
        })
    }
}
