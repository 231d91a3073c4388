//! User repository for credential lookups and refresh token rotation.

use std::future::Future;

use jiff::Timestamp;
use uuid::Uuid;

use crate::DirectoryResult;
use crate::model::{NewUser, User};

/// Precondition for replacing the refresh token of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSwap {
    /// Overwrite whatever token is currently stored.
    ///
    /// Used on login, where issuing a new token always replaces the old one.
    Unconditional,
    /// Replace the token only if the stored value still equals this one.
    ///
    /// Used on refresh, so that only one of several concurrent rotations of
    /// the same token can succeed.
    Expected(String),
}

impl TokenSwap {
    /// Returns whether the precondition holds for the currently stored token.
    #[must_use]
    pub fn matches(&self, current: Option<&str>) -> bool {
        match self {
            Self::Unconditional => true,
            Self::Expected(expected) => current == Some(expected.as_str()),
        }
    }
}

/// Repository for user directory operations.
///
/// Implementations must keep usernames unique and must perform
/// [`update_refresh_token`](Self::update_refresh_token) as a single atomic
/// read-compare-write.
pub trait UserDirectory: Send + Sync {
    /// Finds a user by exact username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = DirectoryResult<Option<User>>> + Send;

    /// Finds the user whose stored refresh token equals `refresh_token`.
    ///
    /// Expiry is not checked here; callers decide what an expired match means.
    fn find_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = DirectoryResult<Option<User>>> + Send;

    /// Creates a new user record without a refresh token.
    ///
    /// Fails with [`DirectoryError::Conflict`] if the username is taken.
    ///
    /// [`DirectoryError::Conflict`]: crate::DirectoryError::Conflict
    fn create(&self, new_user: NewUser) -> impl Future<Output = DirectoryResult<User>> + Send;

    /// Checks whether a username is already registered.
    fn exists_username(&self, username: &str)
    -> impl Future<Output = DirectoryResult<bool>> + Send;

    /// Atomically replaces the refresh token and its expiry.
    ///
    /// Returns `Ok(false)` without writing anything when `swap` does not hold
    /// for the stored token, and `Ok(true)` once the new token is installed.
    fn update_refresh_token(
        &self,
        user_id: Uuid,
        swap: TokenSwap,
        new_token: String,
        new_expiry: Timestamp,
    ) -> impl Future<Output = DirectoryResult<bool>> + Send;
}
