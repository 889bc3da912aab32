#![allow(async_fn_in_trait)]

//! Ports between the controller's use cases and the outside world.

use deskpool_wire::execute::{ExecuteRequest, ExecuteResponse};

use crate::domain::types::UserEntry;

/// One dispatch attempt against one agent.
///
/// `Ok` only means the envelope came back parseable; the caller still has
/// to look at its `status`. Transport failures, non-2xx answers and
/// unparseable bodies come back as [`DispatchError`].
pub trait AgentCaller: Send + Sync {
    async fn execute(
        &self,
        base_url: &str,
        request: &ExecuteRequest,
    ) -> Result<ExecuteResponse, DispatchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("http {code}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status { code: u16, detail: Option<String> },
    #[error("unparseable agent response: {0}")]
    Decode(String),
}

/// Flat-file user records.
pub trait UserStore: Send + Sync {
    /// Check credentials. `Ok(None)` covers both unknown user and wrong
    /// password so the caller cannot tell them apart.
    async fn verify(&self, username: &str, password: &str)
    -> Result<Option<UserEntry>, UserStoreError>;

    /// User-initiated change: requires the current password.
    async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), UserStoreError>;

    /// Administrative reset: no old-password check, re-arms `first_login`
    /// so the user must pick their own password on next login.
    async fn reset_password(&self, username: &str, new_password: &str)
    -> Result<(), UserStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("unknown user")]
    UnknownUser,
    #[error("wrong password")]
    BadCredentials,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
