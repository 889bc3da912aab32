#![allow(async_fn_in_trait)]

//! Ports between the launch/reclaim use cases and the host environment.

use std::time::Duration;

use crate::domain::types::{LaunchSpec, ManagedContainer};

/// Probes whether a host port is free. A port is free iff a TCP connect
/// attempt to `127.0.0.1:port` fails within the probe deadline.
pub trait PortScanner: Send + Sync {
    async fn is_free(&self, port: u16) -> bool;
}

/// Starts one container through the runtime helper.
///
/// The helper is authoritative: the chosen host port is only reserved by
/// the bind it performs, and a lost port race surfaces as `Failed`.
pub trait ContainerLauncher: Send + Sync {
    async fn launch(&self, spec: &LaunchSpec) -> Result<String, LaunchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The helper exceeded its deadline. Distinct from `Failed` so the
    /// caller can report it as such; the container is considered not to
    /// exist either way.
    #[error("container launch timed out after {0} seconds")]
    Timeout(u64),
    /// The helper exited non-zero; carries its trimmed stderr.
    #[error("container launch failed: {0}")]
    Failed(String),
    #[error("failed to run launch helper: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Label-filtered view of the engine's managed containers.
///
/// Errors are deliberately untyped (`anyhow`): every caller treats a
/// failing engine query the same way — log and fail safe.
pub trait ContainerStore: Send + Sync {
    /// Containers carrying the management label. `running_only` restricts
    /// to state "running".
    async fn list_managed(&self, running_only: bool) -> anyhow::Result<Vec<ManagedContainer>>;

    async fn running_count(&self) -> anyhow::Result<u32> {
        Ok(self.list_managed(true).await?.len() as u32)
    }

    /// Remove stopped managed containers via the engine's native prune.
    async fn prune_stopped(&self) -> anyhow::Result<()>;

    /// Exec inside the container and report whether any peer holds an
    /// ESTABLISHED TCP connection to the internal RDP port.
    async fn has_established_rdp(&self, id: &str) -> anyhow::Result<bool>;

    /// Time since the engine started the container.
    async fn uptime(&self, id: &str) -> anyhow::Result<Duration>;

    async fn stop_and_remove(&self, id: &str) -> anyhow::Result<()>;
}
