use axum::http::StatusCode;

/// Handler for `GET /healthz` — liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz` — readiness check. Both services are ready as
/// soon as they are serving; startup dependencies are checked in `main`.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
