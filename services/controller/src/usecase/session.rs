//! Server-side sessions with HMAC-signed cookie values.
//!
//! The session map only stores who is logged in and until when; the user's
//! password is never stashed here — `/launch` carries its own credentials,
//! which must flow to the agent anyway.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::RwLock;
use uuid::Uuid;

use deskpool_domain::role::UserRole;

/// Cookie carrying the signed session id.
pub const SESSION_COOKIE: &str = "deskpool_session";

type HmacSha256 = Hmac<Sha256>;

/// `<id>.<hex hmac>` — opaque to the client, verifiable without a lookup.
pub fn sign_session_id(secret: &str, id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(id.as_bytes());
    format!("{id}.{}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a cookie value and return the embedded session id.
pub fn verify_cookie_value<'a>(secret: &str, value: &'a str) -> Option<&'a str> {
    let (id, sig_hex) = value.split_once('.')?;
    let sig = hex::decode(sig_hex).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(id.as_bytes());
    mac.verify_slice(&sig).ok().map(|()| id)
}

#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub username: String,
    pub role: UserRole,
    pub first_login: bool,
    expires_at: Instant,
}

/// In-memory session map. Sessions do not survive a restart; users just
/// log in again.
#[derive(Clone)]
pub struct Sessions {
    inner: Arc<RwLock<HashMap<String, SessionRecord>>>,
    lifetime: Duration,
}

impl Sessions {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            lifetime,
        }
    }

    /// Create a session and return its (unsigned) id.
    pub async fn create(&self, username: &str, role: UserRole, first_login: bool) -> String {
        let id = Uuid::new_v4().to_string();
        let record = SessionRecord {
            username: username.to_owned(),
            role,
            first_login,
            expires_at: Instant::now() + self.lifetime,
        };
        self.inner.write().await.insert(id.clone(), record);
        id
    }

    /// Look up a live session; expired entries are dropped on access.
    pub async fn get(&self, id: &str) -> Option<SessionRecord> {
        {
            let sessions = self.inner.read().await;
            match sessions.get(id) {
                Some(record) if record.expires_at > Instant::now() => return Some(record.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.inner.write().await.remove(id);
        None
    }

    pub async fn remove(&self, id: &str) {
        self.inner.write().await.remove(id);
    }
}
