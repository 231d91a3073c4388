use std::fmt;

use jiff::Timestamp;
use uuid::Uuid;

/// User identity record.
///
/// At most one refresh token is associated with a record. Storing a new one
/// overwrites the previous value, which makes the old token unusable even
/// before its nominal expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// PHC string produced by the password hasher.
    pub password_hash: String,
    /// Contact email, embedded into access tokens.
    pub email: String,
    /// Currently associated refresh token, if any.
    pub refresh_token: Option<String>,
    /// Absolute expiry of [`refresh_token`](Self::refresh_token).
    pub refresh_token_expires_at: Option<Timestamp>,
    /// Timestamp when the record was created.
    pub created_at: Timestamp,
}

impl User {
    /// Returns whether the stored refresh token has expired at `now`.
    ///
    /// A record without an expiry is treated as expired.
    #[must_use]
    pub fn refresh_token_expired_at(&self, now: Timestamp) -> bool {
        self.refresh_token_expires_at
            .is_none_or(|expires_at| expires_at <= now)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("refresh_token_expires_at", &self.refresh_token_expires_at)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Data for creating a new user.
#[derive(Clone, Default)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// PHC string produced by the password hasher.
    pub password_hash: String,
    /// Contact email.
    pub email: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;

    fn user(expires_at: Option<Timestamp>) -> User {
        User {
            id: Uuid::now_v7(),
            username: "alice".to_owned(),
            password_hash: "$argon2id$hash".to_owned(),
            email: "alice@example.com".to_owned(),
            refresh_token: Some("token".to_owned()),
            refresh_token_expires_at: expires_at,
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn refresh_token_expiry_is_inclusive() -> anyhow::Result<()> {
        let now = Timestamp::now();
        let later = now.checked_add(SignedDuration::from_secs(1))?;

        assert!(user(Some(now)).refresh_token_expired_at(now));
        assert!(!user(Some(later)).refresh_token_expired_at(now));
        assert!(user(None).refresh_token_expired_at(now));

        Ok(())
    }

    #[test]
    fn debug_output_omits_secrets() {
        let debug = format!("{:?}", user(None));
        assert!(!debug.contains("argon2id"));
        assert!(!debug.contains("\"token\""));
        assert!(debug.contains("alice"));
    }
}
