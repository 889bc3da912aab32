use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use deskpool_wire::execute::ExecuteResponse;

/// Agent service error variants.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("image not allowed: {0}")]
    ImageNotAllowed(String),
    #[error("gpu requested but this agent is not gpu-capable")]
    GpuUnavailable,
    #[error("no rdp port available")]
    NoFreePort,
    #[error("container launch failed: {0}")]
    LaunchFailed(String),
    #[error("container launch timed out after {0} seconds")]
    LaunchTimeout(u64),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AgentError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::ImageNotAllowed(_) => "IMAGE_NOT_ALLOWED",
            Self::GpuUnavailable => "GPU_UNAVAILABLE",
            Self::NoFreePort => "NO_FREE_PORT",
            Self::LaunchFailed(_) => "LAUNCH_FAILED",
            Self::LaunchTimeout(_) => "LAUNCH_TIMEOUT",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AgentError {
    /// Every error leaves as the `{status:"error", error}` wire envelope so
    /// the controller has a single parsing path. Runtime business failures
    /// (`LaunchFailed`, `LaunchTimeout`) deliberately ride HTTP 200; only
    /// transport-level problems use their natural status.
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingField(_)
            | Self::InvalidRequest(_)
            | Self::ImageNotAllowed(_)
            | Self::GpuUnavailable => StatusCode::BAD_REQUEST,
            Self::NoFreePort => StatusCode::SERVICE_UNAVAILABLE,
            Self::LaunchFailed(_) | Self::LaunchTimeout(_) => StatusCode::OK,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = ExecuteResponse::Error {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
