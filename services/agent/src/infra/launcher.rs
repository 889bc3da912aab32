//! Runtime shell-helper invocation.
//!
//! The helper owns pulling, creation, labeling, port publishing, limits,
//! GPU attachment and credential injection; its contract is positional:
//! `image container_name host_port cpu_limit memory_limit_mb gpu_flag
//! username password`, container id on the last stdout line, non-zero exit
//! on failure. The agent never retries it.

use std::path::PathBuf;
use std::time::Duration;

use tokio::process::Command;

use crate::domain::repository::{ContainerLauncher, LaunchError};
use crate::domain::types::LaunchSpec;

/// Hard deadline for one helper run, pull included.
pub const LAUNCH_DEADLINE: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct ShellLauncher {
    script: PathBuf,
    agent_id: String,
    pull_always: bool,
}

impl ShellLauncher {
    pub fn new(script: PathBuf, agent_id: String, pull_always: bool) -> Self {
        Self {
            script,
            agent_id,
            pull_always,
        }
    }
}

impl ContainerLauncher for ShellLauncher {
    async fn launch(&self, spec: &LaunchSpec) -> Result<String, LaunchError> {
        let mut cmd = Command::new(&self.script);
        cmd.arg(&spec.image)
            .arg(&spec.container_name)
            .arg(spec.host_port.to_string())
            .arg(spec.cpu_limit.to_string())
            .arg(spec.memory_limit_mb.to_string())
            .arg(if spec.gpu { "true" } else { "false" })
            .arg(&spec.username)
            .arg(&spec.password)
            .env("AGENT_ID", &self.agent_id)
            .env("PULL_ALWAYS", if self.pull_always { "true" } else { "false" })
            .kill_on_drop(true);

        let output = tokio::time::timeout(LAUNCH_DEADLINE, cmd.output())
            .await
            .map_err(|_| LaunchError::Timeout(LAUNCH_DEADLINE.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            let detail = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_owned()
            } else {
                stderr
            };
            return Err(LaunchError::Failed(detail));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| LaunchError::Failed("helper printed no container id".to_owned()))
    }
}
