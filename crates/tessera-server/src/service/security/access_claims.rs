//! Claims embedded in access tokens.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tessera_directory::model::User;
use uuid::Uuid;

/// Token type claim carried by every access token.
pub const TOKEN_TYPE_BEARER: &str = "bearer";

/// JWT claims for access tokens.
///
/// Registered claims use their RFC 7519 names on the wire. Timestamps are
/// NumericDate values with second precision, so a decoded token compares
/// equal to the claims it was built from.
#[derive(Debug, Clone, Deserialize, Serialize, Hash, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (identifier of the user the token was issued to).
    #[serde(rename = "sub")]
    pub user_id: Uuid,
    /// Audience (who the token is intended for).
    #[serde(rename = "aud")]
    pub audience: String,
    /// Issuer (who created the token).
    #[serde(rename = "iss")]
    pub issuer: String,

    /// Username of the subject.
    pub name: String,
    /// Email address of the subject.
    pub email: String,

    /// Issued at.
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    /// Not before.
    #[serde(rename = "nbf", with = "jiff::fmt::serde::timestamp::second::required")]
    pub not_before: Timestamp,
    /// Expiration time.
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,

    /// Token type, always [`TOKEN_TYPE_BEARER`].
    #[serde(rename = "typ")]
    pub token_type: String,
}

impl AccessClaims {
    /// Builds claims for `user`, valid from `issued_at` until `expires_at`.
    pub fn new(
        user: &User,
        audience: &str,
        issuer: &str,
        issued_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            user_id: user.id,
            audience: audience.to_owned(),
            issuer: issuer.to_owned(),
            name: user.username.clone(),
            email: user.email.clone(),
            issued_at,
            not_before: issued_at,
            expires_at,
            token_type: TOKEN_TYPE_BEARER.to_owned(),
        }
    }

    /// Returns whether the token has expired at `now`, allowing `skew_secs`
    /// of clock drift.
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp, skew_secs: i64) -> bool {
        now.as_second() >= self.expires_at.as_second().saturating_add(skew_secs)
    }

    /// Returns whether the token is not yet valid at `now`, allowing
    /// `skew_secs` of clock drift.
    #[must_use]
    pub fn is_premature_at(&self, now: Timestamp, skew_secs: i64) -> bool {
        now.as_second() < self.not_before.as_second().saturating_sub(skew_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(issued_at: i64, expires_at: i64) -> anyhow::Result<AccessClaims> {
        let user = User {
            id: Uuid::now_v7(),
            username: "alice".to_owned(),
            password_hash: String::new(),
            email: "alice@example.com".to_owned(),
            refresh_token: None,
            refresh_token_expires_at: None,
            created_at: Timestamp::now(),
        };

        Ok(AccessClaims::new(
            &user,
            "tessera:api",
            "https://localhost:7277/",
            Timestamp::from_second(issued_at)?,
            Timestamp::from_second(expires_at)?,
        ))
    }

    #[test]
    fn serializes_registered_claim_names() -> anyhow::Result<()> {
        let claims = claims(1_700_000_000, 1_700_000_600)?;
        let value = serde_json::to_value(&claims)?;

        assert_eq!(value["iat"], 1_700_000_000);
        assert_eq!(value["nbf"], 1_700_000_000);
        assert_eq!(value["exp"], 1_700_000_600);
        assert_eq!(value["typ"], "bearer");
        assert_eq!(value["aud"], "tessera:api");
        assert_eq!(value["name"], "alice");
        assert_eq!(value["sub"], claims.user_id.to_string());

        Ok(())
    }

    #[test]
    fn expiry_window_respects_skew() -> anyhow::Result<()> {
        let claims = claims(1_000, 1_600)?;

        assert!(!claims.is_expired_at(Timestamp::from_second(1_599)?, 0));
        assert!(claims.is_expired_at(Timestamp::from_second(1_600)?, 0));
        assert!(!claims.is_expired_at(Timestamp::from_second(1_600)?, 30));

        assert!(claims.is_premature_at(Timestamp::from_second(999)?, 0));
        assert!(!claims.is_premature_at(Timestamp::from_second(1_000)?, 0));
        assert!(!claims.is_premature_at(Timestamp::from_second(990)?, 10));

        Ok(())
    }
}
