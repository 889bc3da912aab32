//! Flat-file [`UserStore`]: one `username:sha256hex:first_login:role` line
//! per user, `#` comments ignored. The format is fixed for compatibility
//! with the legacy tooling that provisions accounts.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use deskpool_domain::role::UserRole;

use crate::domain::repository::{UserStore, UserStoreError};
use crate::domain::types::UserEntry;

/// Hex SHA-256 of the UTF-8 password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredUser {
    password_hash: String,
    first_login: bool,
    role: UserRole,
}

#[derive(Clone)]
pub struct FileUserStore {
    path: Arc<PathBuf>,
    /// Serializes read-modify-write cycles; reads alone go lock-free.
    write_lock: Arc<Mutex<()>>,
}

impl FileUserStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Arc::new(path),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, StoredUser>, UserStoreError> {
        let content = match tokio::fs::read_to_string(self.path.as_ref()).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(content.lines().filter_map(parse_line).collect())
    }

    async fn save(&self, users: &BTreeMap<String, StoredUser>) -> Result<(), UserStoreError> {
        let mut out = String::from("# Format: username:password_hash:first_login:role\n");
        for (username, user) in users {
            out.push_str(&format!(
                "{username}:{}:{}:{}\n",
                user.password_hash,
                user.first_login,
                user.role.as_str()
            ));
        }
        tokio::fs::write(self.path.as_ref(), out).await?;
        Ok(())
    }
}

/// Missing trailing fields default to `first_login=false`, `role=standard`.
fn parse_line(line: &str) -> Option<(String, StoredUser)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut parts = line.split(':');
    let username = parts.next()?.to_owned();
    let password_hash = parts.next()?.to_owned();
    if username.is_empty() || password_hash.is_empty() {
        return None;
    }
    let first_login = parts.next().is_some_and(|p| p.eq_ignore_ascii_case("true"));
    let role = parts.next().map(UserRole::parse).unwrap_or_default();
    Some((
        username,
        StoredUser {
            password_hash,
            first_login,
            role,
        },
    ))
}

impl UserStore for FileUserStore {
    async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserEntry>, UserStoreError> {
        let users = self.load().await?;
        let Some(user) = users.get(username) else {
            return Ok(None);
        };
        if user.password_hash != hash_password(password) {
            return Ok(None);
        }
        Ok(Some(UserEntry {
            username: username.to_owned(),
            first_login: user.first_login,
            role: user.role,
        }))
    }

    async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), UserStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.load().await?;
        let user = users.get_mut(username).ok_or(UserStoreError::UnknownUser)?;
        if user.password_hash != hash_password(old_password) {
            return Err(UserStoreError::BadCredentials);
        }
        user.password_hash = hash_password(new_password);
        user.first_login = false;
        self.save(&users).await
    }

    async fn reset_password(
        &self,
        username: &str,
        new_password: &str,
    ) -> Result<(), UserStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.load().await?;
        let user = users.get_mut(username).ok_or(UserStoreError::UnknownUser)?;
        user.password_hash = hash_password(new_password);
        user.first_login = true;
        self.save(&users).await
    }
}
