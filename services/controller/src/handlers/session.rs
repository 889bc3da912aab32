use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use deskpool_domain::role::UserRole;

use crate::domain::repository::UserStore;
use crate::error::ControllerError;
use crate::state::AppState;
use crate::usecase::session::{
    SESSION_COOKIE, SessionRecord, sign_session_id, verify_cookie_value,
};

/// A verified, live session extracted from the signed cookie.
///
/// Rejects with 401 when the cookie is absent, tampered with, or the
/// session has expired server-side.
#[derive(Debug, Clone)]
pub struct AuthSession(pub SessionRecord);

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ControllerError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let cookie_value = CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned());
        let state = state.clone();
        async move {
            let value = cookie_value.ok_or(ControllerError::Unauthorized)?;
            let id = verify_cookie_value(&state.config.secret_key, &value)
                .ok_or(ControllerError::Unauthorized)?;
            let record = state
                .sessions
                .get(id)
                .await
                .ok_or(ControllerError::Unauthorized)?;
            Ok(AuthSession(record))
        }
    }
}

fn session_cookie(value: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

// ── POST /login ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub status: String,
    pub username: String,
    pub role: UserRole,
    /// The UI forces a password change when this is set.
    pub first_login: bool,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ControllerError> {
    let entry = state
        .users
        .verify(&body.username, &body.password)
        .await?
        .ok_or(ControllerError::Unauthorized)?;

    let id = state
        .sessions
        .create(&entry.username, entry.role, entry.first_login)
        .await;
    let signed = sign_session_id(&state.config.secret_key, &id);
    let jar = jar.add(session_cookie(
        signed,
        state.config.session_lifetime.as_secs() as i64,
    ));

    Ok((
        jar,
        Json(LoginResponse {
            status: "ok".to_owned(),
            username: entry.username,
            role: entry.role,
            first_login: entry.first_login,
        }),
    ))
}

// ── GET /logout ──────────────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(id) = verify_cookie_value(&state.config.secret_key, cookie.value()) {
            state.sessions.remove(id).await;
        }
    }
    let jar = jar.add(session_cookie(String::new(), 0));
    (jar, Json(serde_json::json!({"status": "ok"})))
}

// ── POST /change_password ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub username: String,
    pub old_password: String,
    pub new_password: String,
}

/// Requires the current password; there is no old-password-less form on
/// this surface. Operators reset accounts through the store directly.
pub async fn change_password(
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ControllerError> {
    if body.new_password.trim().is_empty() {
        return Err(ControllerError::Validation(
            "new_password must be non-empty".to_owned(),
        ));
    }
    state
        .users
        .change_password(&body.username, &body.old_password, &body.new_password)
        .await?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}
