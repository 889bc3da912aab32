use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::repository::UserStoreError;

/// Controller service error variants.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("missing or invalid credentials")]
    Unauthorized,
    #[error("{0}")]
    Validation(String),
    #[error("request exceeds role limits: {0}")]
    QuotaExceeded(String),
    #[error("image not allowed: {0}")]
    ImageNotAllowed(String),
    #[error("no agent can satisfy this request")]
    NoCandidate,
    #[error("all candidate agents failed: {}", .0.join("; "))]
    DispatchFailed(Vec<String>),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ControllerError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION",
            Self::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            Self::ImageNotAllowed(_) => "IMAGE_NOT_ALLOWED",
            Self::NoCandidate => "NO_CANDIDATE",
            Self::DispatchFailed(_) => "DISPATCH_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<UserStoreError> for ControllerError {
    fn from(e: UserStoreError) -> Self {
        match e {
            // Do not tell a caller whether the user exists.
            UserStoreError::UnknownUser | UserStoreError::BadCredentials => Self::Unauthorized,
            UserStoreError::Io(io) => Self::Internal(io.into()),
        }
    }
}

impl IntoResponse for ControllerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::ImageNotAllowed(_) => StatusCode::BAD_REQUEST,
            Self::QuotaExceeded(_) => StatusCode::FORBIDDEN,
            Self::NoCandidate => StatusCode::SERVICE_UNAVAILABLE,
            Self::DispatchFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records
        // method/uri/status for all requests. 4xx are expected client
        // errors; logging them here would be noise.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
