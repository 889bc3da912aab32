//! Shared-secret bearer guard for the controller <-> agent surface.

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Expected `Authorization: Bearer` value, if any.
///
/// Built from the `API_TOKEN` env var; an empty or unset token disables the
/// guard entirely, matching the optional-auth wire contract.
#[derive(Clone)]
pub struct BearerToken(Option<String>);

impl BearerToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.is_empty()))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// The raw token, for clients that must attach it to outbound calls.
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn accepts(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.0 else {
            return true;
        };
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|got| got == expected)
    }
}

/// Middleware rejecting requests without the shared secret. Apply with
/// `axum::middleware::from_fn_with_state(bearer, require_bearer)`.
pub async fn require_bearer(
    State(expected): State<BearerToken>,
    request: Request,
    next: Next,
) -> Response {
    if expected.accepts(request.headers()) {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "kind": "UNAUTHORIZED",
                "message": "missing or invalid bearer token",
            })),
        )
            .into_response()
    }
}
