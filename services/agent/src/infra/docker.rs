//! Engine-backed [`ContainerStore`] for managed session containers.
//!
//! Everything here is scoped by the management label; the agent never acts
//! on a container the engine does not report as ours.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use bollard::Docker;
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::query_parameters::{
    InspectContainerOptions, ListContainersOptionsBuilder, PruneContainersOptionsBuilder,
    RemoveContainerOptionsBuilder, StopContainerOptionsBuilder,
};
use chrono::{DateTime, Utc};
use futures::StreamExt;

use crate::domain::repository::ContainerStore;
use crate::domain::types::{MANAGED_LABEL, ManagedContainer, RDP_INTERNAL_PORT};

/// Deadline for the in-container socket probe.
const EXEC_PROBE_DEADLINE: Duration = Duration::from_secs(5);

/// Stopped containers younger than this survive the prune, so a session
/// that just exited can still be inspected by an operator.
const PRUNE_UNTIL_BUFFER: &str = "1h";

#[derive(Clone)]
pub struct DockerStore {
    client: Docker,
}

impl DockerStore {
    /// Connect to the local engine socket and verify it responds.
    pub async fn connect() -> Result<Self> {
        let client = Docker::connect_with_local_defaults()
            .context("failed to connect to container engine socket")?;
        client
            .ping()
            .await
            .context("container engine did not respond to ping")?;
        Ok(Self { client })
    }

    /// Wrap an existing client without pinging. Used where the engine may
    /// not be reachable yet (tests, delayed startup).
    pub fn from_client(client: Docker) -> Self {
        Self { client }
    }

    fn label_filters(extra: Option<(&str, Vec<String>)>) -> HashMap<String, Vec<String>> {
        let mut filters = HashMap::new();
        filters.insert("label".to_owned(), vec![MANAGED_LABEL.to_owned()]);
        if let Some((key, values)) = extra {
            filters.insert(key.to_owned(), values);
        }
        filters
    }
}

impl ContainerStore for DockerStore {
    async fn list_managed(&self, running_only: bool) -> Result<Vec<ManagedContainer>> {
        let status = running_only.then(|| ("status", vec!["running".to_owned()]));
        let options = ListContainersOptionsBuilder::new()
            .all(!running_only)
            .filters(&Self::label_filters(status))
            .build();

        let summaries = self
            .client
            .list_containers(Some(options))
            .await
            .context("failed to list managed containers")?;

        Ok(summaries
            .into_iter()
            .filter_map(|c| {
                Some(ManagedContainer {
                    id: c.id?,
                    image: c.image.unwrap_or_default(),
                    names: c
                        .names
                        .unwrap_or_default()
                        .into_iter()
                        .map(|n| n.trim_start_matches('/').to_owned())
                        .collect(),
                })
            })
            .collect())
    }

    async fn prune_stopped(&self) -> Result<()> {
        let filters = Self::label_filters(Some(("until", vec![PRUNE_UNTIL_BUFFER.to_owned()])));
        let options = PruneContainersOptionsBuilder::new().filters(&filters).build();
        self.client
            .prune_containers(Some(options))
            .await
            .context("container prune failed")?;
        Ok(())
    }

    async fn has_established_rdp(&self, id: &str) -> Result<bool> {
        let exec = self
            .client
            .create_exec(
                id,
                CreateExecOptions {
                    cmd: Some(vec![
                        "cat".to_owned(),
                        "/proc/net/tcp".to_owned(),
                        "/proc/net/tcp6".to_owned(),
                    ]),
                    attach_stdout: Some(true),
                    attach_stderr: Some(false),
                    ..Default::default()
                },
            )
            .await
            .context("failed to create socket probe exec")?;

        let probe = async {
            match self
                .client
                .start_exec(&exec.id, None)
                .await
                .context("failed to start socket probe exec")?
            {
                StartExecResults::Attached { mut output, .. } => {
                    let mut collected = Vec::new();
                    while let Some(chunk) = output.next().await {
                        collected.extend_from_slice(&chunk?.into_bytes());
                    }
                    Ok::<_, anyhow::Error>(String::from_utf8_lossy(&collected).into_owned())
                }
                StartExecResults::Detached => Err(anyhow!("socket probe exec detached")),
            }
        };

        let output = tokio::time::timeout(EXEC_PROBE_DEADLINE, probe)
            .await
            .context("socket probe timed out")??;
        Ok(has_established_on_port(&output, RDP_INTERNAL_PORT))
    }

    async fn uptime(&self, id: &str) -> Result<Duration> {
        let inspect = self
            .client
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .context("container inspect failed")?;
        let started_at = inspect
            .state
            .and_then(|s| s.started_at)
            .ok_or_else(|| anyhow!("inspect reported no StartedAt"))?;
        let started: DateTime<Utc> = started_at
            .parse()
            .with_context(|| format!("unparseable StartedAt {started_at:?}"))?;
        let uptime = Utc::now().signed_duration_since(started);
        uptime
            .to_std()
            .map_err(|_| anyhow!("container started in the future ({started_at})"))
    }

    async fn stop_and_remove(&self, id: &str) -> Result<()> {
        self.client
            .stop_container(id, Some(StopContainerOptionsBuilder::new().t(10).build()))
            .await
            .context("container stop failed")?;
        self.client
            .remove_container(id, Some(RemoveContainerOptionsBuilder::new().build()))
            .await
            .context("container remove failed")?;
        Ok(())
    }
}

/// Scan `/proc/net/tcp`-format output for an ESTABLISHED (state 01) socket
/// whose local port matches. Works identically for the v6 table; malformed
/// lines are skipped.
fn has_established_on_port(proc_net_tcp: &str, port: u16) -> bool {
    proc_net_tcp.lines().any(|line| {
        let mut fields = line.split_whitespace();
        let (Some(_sl), Some(local), Some(_remote), Some(state)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return false;
        };
        if state != "01" {
            return false;
        }
        local
            .rsplit_once(':')
            .and_then(|(_, hex_port)| u16::from_str_radix(hex_port, 16).ok())
            .is_some_and(|p| p == port)
    })
}
