//! In-memory [`UserDirectory`] backed by a shared `RwLock`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::{NewUser, User};
use crate::query::{TokenSwap, UserDirectory};
use crate::{DirectoryError, DirectoryResult, TRACING_TARGET_QUERY};

/// Cloneable handle to an in-memory user directory.
///
/// All clones share the same records. Every mutation happens under a single
/// write lock, which makes refresh token swaps atomic with respect to each
/// other and to lookups.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    inner: Arc<RwLock<DirectoryInner>>,
}

/// Records plus secondary indexes on username and refresh token.
#[derive(Default)]
struct DirectoryInner {
    users: HashMap<Uuid, User>,
    usernames: HashMap<String, Uuid>,
    refresh_tokens: HashMap<String, Uuid>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// Returns whether the directory holds no users.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl fmt::Debug for MemoryDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDirectory").finish_non_exhaustive()
    }
}

impl UserDirectory for MemoryDirectory {
    async fn find_by_username(&self, username: &str) -> DirectoryResult<Option<User>> {
        let inner = self.inner.read().await;
        let user = inner
            .usernames
            .get(username)
            .and_then(|id| inner.users.get(id))
            .cloned();

        Ok(user)
    }

    async fn find_by_refresh_token(&self, refresh_token: &str) -> DirectoryResult<Option<User>> {
        let inner = self.inner.read().await;
        let user = inner
            .refresh_tokens
            .get(refresh_token)
            .and_then(|id| inner.users.get(id))
            .filter(|user| user.refresh_token.as_deref() == Some(refresh_token))
            .cloned();

        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> DirectoryResult<User> {
        let mut inner = self.inner.write().await;

        if inner.usernames.contains_key(&new_user.username) {
            tracing::debug!(
                target: TRACING_TARGET_QUERY,
                username = %new_user.username,
                "rejected duplicate username"
            );

            return Err(DirectoryError::Conflict(new_user.username));
        }

        let user = User {
            id: Uuid::now_v7(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            email: new_user.email,
            refresh_token: None,
            refresh_token_expires_at: None,
            created_at: Timestamp::now(),
        };

        inner.usernames.insert(user.username.clone(), user.id);
        inner.users.insert(user.id, user.clone());

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            user_id = %user.id,
            username = %user.username,
            "user created"
        );

        Ok(user)
    }

    async fn exists_username(&self, username: &str) -> DirectoryResult<bool> {
        Ok(self.inner.read().await.usernames.contains_key(username))
    }

    async fn update_refresh_token(
        &self,
        user_id: Uuid,
        swap: TokenSwap,
        new_token: String,
        new_expiry: Timestamp,
    ) -> DirectoryResult<bool> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let Some(user) = inner.users.get_mut(&user_id) else {
            return Err(DirectoryError::NotFound(user_id));
        };

        if !swap.matches(user.refresh_token.as_deref()) {
            tracing::debug!(
                target: TRACING_TARGET_QUERY,
                user_id = %user_id,
                "refresh token swap precondition failed"
            );

            return Ok(false);
        }

        if let Some(previous) = user.refresh_token.take() {
            inner.refresh_tokens.remove(&previous);
        }

        inner.refresh_tokens.insert(new_token.clone(), user_id);
        user.refresh_token = Some(new_token);
        user.refresh_token_expires_at = Some(new_expiry);

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            user_id = %user_id,
            expires_at = %new_expiry,
            "refresh token replaced"
        );

        Ok(true)
    }
}
