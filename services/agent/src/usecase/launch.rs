//! The launch pipeline: validate, sanitize, allocate a port, invoke the
//! runtime helper, resolve the advertised host.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use deskpool_domain::image::{image_allowed, sanitize_image};
use deskpool_wire::execute::ExecuteRequest;

use crate::domain::repository::{ContainerLauncher, LaunchError, PortScanner};
use crate::domain::types::{LaunchSpec, LaunchedSession};
use crate::error::AgentError;

/// Host-side launch parameters that do not vary per request.
#[derive(Debug, Clone)]
pub struct LaunchParams {
    pub port_start: u16,
    pub port_end: u16,
    pub gpu_capable: bool,
    pub allowed_images: Vec<String>,
    /// Host advertised back to the user for the RDP endpoint.
    pub advertised_host: String,
}

pub struct LaunchSessionUseCase<L: ContainerLauncher, P: PortScanner> {
    pub launcher: L,
    pub scanner: P,
    pub params: LaunchParams,
}

impl<L: ContainerLauncher, P: PortScanner> LaunchSessionUseCase<L, P> {
    pub async fn execute(&self, req: ExecuteRequest) -> Result<LaunchedSession, AgentError> {
        let username = req.username.trim().to_owned();
        let password = req.password.trim().to_owned();
        if username.is_empty() || password.is_empty() {
            return Err(AgentError::InvalidRequest(
                "username and password must be non-empty".to_owned(),
            ));
        }
        if req.cpu_limit < 1 {
            return Err(AgentError::InvalidRequest(
                "cpu_limit must be at least 1".to_owned(),
            ));
        }
        if req.memory_limit_mb < 256 {
            return Err(AgentError::InvalidRequest(
                "memory_limit_mb must be at least 256".to_owned(),
            ));
        }

        let image = sanitize_image(&req.image);
        if image.is_empty() {
            return Err(AgentError::InvalidRequest(
                "image must be non-empty".to_owned(),
            ));
        }
        if !image_allowed(&self.params.allowed_images, &image) {
            return Err(AgentError::ImageNotAllowed(image));
        }

        if req.gpu && !self.params.gpu_capable {
            return Err(AgentError::GpuUnavailable);
        }

        let host_port =
            super::ports::pick_free_port(&self.scanner, self.params.port_start, self.params.port_end)
                .await
                .ok_or(AgentError::NoFreePort)?;

        let unix_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let spec = LaunchSpec {
            image,
            container_name: format!("rdp_{username}_{unix_now}"),
            host_port,
            cpu_limit: req.cpu_limit,
            memory_limit_mb: req.memory_limit_mb,
            gpu: req.gpu,
            username,
            password,
        };

        tracing::info!(
            container = %spec.container_name,
            image = %spec.image,
            port = spec.host_port,
            gpu = spec.gpu,
            "launching session container"
        );

        let started = Instant::now();
        let container_id = self.launcher.launch(&spec).await.map_err(|e| match e {
            LaunchError::Timeout(secs) => AgentError::LaunchTimeout(secs),
            LaunchError::Failed(stderr) => AgentError::LaunchFailed(stderr),
            LaunchError::Spawn(io) => AgentError::Internal(io.into()),
        })?;

        Ok(LaunchedSession {
            rdp_host: self.params.advertised_host.clone(),
            rdp_port: host_port,
            container_id,
            startup_seconds: started.elapsed().as_secs_f64(),
        })
    }
}
