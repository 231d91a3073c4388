//! Access token signing and validation with HMAC-SHA256.

use std::fmt;
use std::sync::Arc;

use jiff::Timestamp;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tessera_directory::model::User;

use super::access_claims::{AccessClaims, TOKEN_TYPE_BEARER};
use crate::service::AuthConfig;
use crate::service::config::MIN_SECRET_BYTES;
use crate::utility::tracing_targets::TRACING_TARGET_TOKEN_SIGNER as TRACING_TARGET;
use crate::{Error, Result};

/// Reasons an access token is rejected.
///
/// Every variant is an authentication failure; the distinction exists for
/// logging and is not meant to be shown to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token is not a well-formed JWT or carries unexpected claims.
    #[error("access token is malformed")]
    Malformed,
    /// The signature does not match the configured secret.
    #[error("access token signature is invalid")]
    InvalidSignature,
    /// The audience claim does not match the configured audience.
    #[error("access token audience is invalid")]
    InvalidAudience,
    /// The issuer claim does not match the configured issuer.
    #[error("access token issuer is invalid")]
    InvalidIssuer,
    /// The current time is past the expiry claim.
    #[error("access token has expired")]
    Expired,
    /// The current time is before the not-before claim.
    #[error("access token is not yet valid")]
    NotYetValid,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            JwtErrorKind::InvalidSignature => Self::InvalidSignature,
            JwtErrorKind::InvalidAudience => Self::InvalidAudience,
            JwtErrorKind::InvalidIssuer => Self::InvalidIssuer,
            JwtErrorKind::ExpiredSignature => Self::Expired,
            JwtErrorKind::ImmatureSignature => Self::NotYetValid,
            _ => Self::Malformed,
        }
    }
}

/// A freshly signed access token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Compact JWS serialization.
    pub token: String,
    /// Claims embedded in [`token`](Self::token).
    pub claims: AccessClaims,
}

/// Builds, signs and validates access tokens.
///
/// Cheap to clone; keys and validation rules are shared.
#[derive(Clone)]
pub struct TokenSigner {
    inner: Arc<TokenSignerInner>,
}

struct TokenSignerInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    audience: String,
    issuer: String,
    lifespan_secs: i64,
    clock_skew_secs: i64,
}

impl TokenSigner {
    /// Creates a signer from validated configuration.
    ///
    /// Performs a sign-then-verify round trip before returning, so a broken
    /// key fails here rather than on the first request.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Config`] error if the secret is shorter than
    /// 32 bytes or any other value is invalid.
    ///
    /// [`ErrorKind::Config`]: crate::ErrorKind::Config
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        config.validate()?;

        let secret = config.jwt_secret.as_bytes();
        if secret.len() < MIN_SECRET_BYTES {
            return Err(Error::config("JWT secret is too short"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = true;
        validation.set_audience(&[config.jwt_audience.as_str()]);
        validation.set_issuer(&[config.jwt_issuer.as_str()]);
        validation.set_required_spec_claims(&["sub", "aud", "iss", "iat", "nbf", "exp"]);

        let inner = TokenSignerInner {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            audience: config.jwt_audience.clone(),
            issuer: config.jwt_issuer.clone(),
            lifespan_secs: config.access_token_lifespan().as_secs(),
            clock_skew_secs: config.clock_skew_secs(),
        };

        let signer = Self {
            inner: Arc::new(inner),
        };
        signer.validate_keys()?;

        tracing::info!(
            target: TRACING_TARGET,
            audience = %signer.inner.audience,
            issuer = %signer.inner.issuer,
            lifespan_secs = signer.inner.lifespan_secs,
            clock_skew_secs = signer.inner.clock_skew_secs,
            "access token signer initialized"
        );

        Ok(signer)
    }

    /// Returns the configured audience.
    #[inline]
    pub fn audience(&self) -> &str {
        &self.inner.audience
    }

    /// Returns the configured issuer.
    #[inline]
    pub fn issuer(&self) -> &str {
        &self.inner.issuer
    }

    /// Issues an access token for `user`, valid from now.
    pub fn issue(&self, user: &User) -> Result<AccessToken> {
        self.issue_at(user, Timestamp::now())
    }

    /// Issues an access token for `user` as if the current time were `now`.
    ///
    /// Issued-at and not-before are `now` truncated to whole seconds; expiry
    /// is issued-at plus the configured lifespan.
    pub fn issue_at(&self, user: &User, now: Timestamp) -> Result<AccessToken> {
        let issued_secs = now.as_second();
        let expires_secs = issued_secs.saturating_add(self.inner.lifespan_secs);

        let issued_at = Timestamp::from_second(issued_secs)
            .map_err(|e| Error::internal("token_signer", "invalid issue time").with_source(e))?;
        let expires_at = Timestamp::from_second(expires_secs)
            .map_err(|e| Error::internal("token_signer", "invalid expiry time").with_source(e))?;

        let claims = AccessClaims::new(
            user,
            &self.inner.audience,
            &self.inner.issuer,
            issued_at,
            expires_at,
        );
        let token = self.sign(&claims)?;

        tracing::debug!(
            target: TRACING_TARGET,
            user_id = %claims.user_id,
            expires_at = %claims.expires_at,
            "access token issued"
        );

        Ok(AccessToken { token, claims })
    }

    /// Validates a token against the current time.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.validate_at(token, Timestamp::now())
    }

    /// Validates a token as if the current time were `now`.
    ///
    /// Checks the signature, audience, issuer, token type and the
    /// `[not-before, expiry)` window widened by the configured clock skew.
    pub fn validate_at(&self, token: &str, now: Timestamp) -> Result<AccessClaims, TokenError> {
        let claims = decode::<AccessClaims>(token, &self.inner.decoding_key, &self.inner.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let error = TokenError::from(e);
                tracing::debug!(
                    target: TRACING_TARGET,
                    reason = %error,
                    "access token rejected"
                );
                error
            })?;

        let skew = self.inner.clock_skew_secs;
        let outcome = if claims.token_type != TOKEN_TYPE_BEARER {
            Err(TokenError::Malformed)
        } else if claims.is_expired_at(now, skew) {
            Err(TokenError::Expired)
        } else if claims.is_premature_at(now, skew) {
            Err(TokenError::NotYetValid)
        } else {
            Ok(claims)
        };

        if let Err(error) = &outcome {
            tracing::debug!(
                target: TRACING_TARGET,
                reason = %error,
                "access token rejected"
            );
        }

        outcome
    }

    /// Performs a sign-then-verify round trip with throwaway claims.
    pub fn validate_keys(&self) -> Result<()> {
        let now = Timestamp::now();
        let probe = User {
            id: uuid::Uuid::nil(),
            username: "probe".to_owned(),
            password_hash: String::new(),
            email: String::new(),
            refresh_token: None,
            refresh_token_expires_at: None,
            created_at: now,
        };

        let issued = self.issue_at(&probe, now)?;
        self.validate_at(&issued.token, now).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "key validation failed during decoding"
            );

            Error::config("signing key round trip failed").with_source(e)
        })?;

        Ok(())
    }

    fn sign(&self, claims: &AccessClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.inner.encoding_key).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                user_id = %claims.user_id,
                "failed to encode access token"
            );

            Error::auth("access token signing failed").with_source(e)
        })
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &Algorithm::HS256)
            .field("audience", &self.inner.audience)
            .field("issuer", &self.inner.issuer)
            .field("lifespan_secs", &self.inner.lifespan_secs)
            .field("clock_skew_secs", &self.inner.clock_skew_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use uuid::Uuid;

    use super::*;
    use crate::ErrorKind;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn config(secret: &str, skew: u32) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_owned(),
            jwt_lifespan: 15,
            jwt_audience: "tessera:api".to_owned(),
            jwt_issuer: "https://localhost:7277/".to_owned(),
            jwt_clock_skew: skew,
            refresh_token_lifetime: 24,
        }
    }

    fn user() -> User {
        User {
            id: Uuid::now_v7(),
            username: "alice".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            email: "alice@example.com".to_owned(),
            refresh_token: None,
            refresh_token_expires_at: None,
            created_at: Timestamp::now(),
        }
    }

    fn shift(ts: Timestamp, secs: i64) -> anyhow::Result<Timestamp> {
        Ok(ts.checked_add(SignedDuration::from_secs(secs))?)
    }

    #[test]
    fn short_secret_fails_at_construction() {
        let result = TokenSigner::from_config(&config("short-secret", 0));
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Config));
    }

    #[test]
    fn issued_token_round_trips() -> anyhow::Result<()> {
        let signer = TokenSigner::from_config(&config(SECRET, 0))?;
        let user = user();

        let issued = signer.issue(&user)?;
        assert_eq!(issued.token.split('.').count(), 3);

        let claims = signer.validate(&issued.token)?;
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.audience, "tessera:api");
        assert_eq!(claims.issuer, "https://localhost:7277/");
        assert_eq!(claims.token_type, "bearer");
        assert_eq!(claims.not_before, claims.issued_at);
        assert_eq!(
            claims.expires_at.as_second() - claims.issued_at.as_second(),
            15 * 60
        );

        Ok(())
    }

    #[test]
    fn rejects_token_after_expiry() -> anyhow::Result<()> {
        let signer = TokenSigner::from_config(&config(SECRET, 0))?;
        let issued_at = Timestamp::now();
        let issued = signer.issue_at(&user(), issued_at)?;

        let before_expiry = shift(issued_at, 15 * 60 - 1)?;
        assert!(signer.validate_at(&issued.token, before_expiry).is_ok());

        let after_expiry = shift(issued_at, 15 * 60 + 1)?;
        assert_eq!(
            signer.validate_at(&issued.token, after_expiry),
            Err(TokenError::Expired)
        );

        Ok(())
    }

    #[test]
    fn rejects_token_before_not_before() -> anyhow::Result<()> {
        let signer = TokenSigner::from_config(&config(SECRET, 0))?;
        let issued_at = Timestamp::now();
        let issued = signer.issue_at(&user(), issued_at)?;

        let too_early = shift(issued_at, -5)?;
        assert_eq!(
            signer.validate_at(&issued.token, too_early),
            Err(TokenError::NotYetValid)
        );

        Ok(())
    }

    #[test]
    fn clock_skew_widens_window() -> anyhow::Result<()> {
        let signer = TokenSigner::from_config(&config(SECRET, 30))?;
        let issued_at = Timestamp::now();
        let issued = signer.issue_at(&user(), issued_at)?;

        assert!(signer.validate_at(&issued.token, shift(issued_at, -10)?).is_ok());
        assert!(
            signer
                .validate_at(&issued.token, shift(issued_at, 15 * 60 + 10)?)
                .is_ok()
        );
        assert_eq!(
            signer.validate_at(&issued.token, shift(issued_at, 15 * 60 + 31)?),
            Err(TokenError::Expired)
        );

        Ok(())
    }

    #[test]
    fn rejects_token_signed_with_other_secret() -> anyhow::Result<()> {
        let signer = TokenSigner::from_config(&config(SECRET, 0))?;
        let other = TokenSigner::from_config(&config("fedcba9876543210fedcba9876543210", 0))?;

        let issued = other.issue(&user())?;
        assert_eq!(
            signer.validate(&issued.token),
            Err(TokenError::InvalidSignature)
        );

        Ok(())
    }

    #[test]
    fn rejects_audience_and_issuer_mismatch() -> anyhow::Result<()> {
        let signer = TokenSigner::from_config(&config(SECRET, 0))?;

        let mut other_audience = config(SECRET, 0);
        other_audience.jwt_audience = "someone-else".to_owned();
        let issued = TokenSigner::from_config(&other_audience)?.issue(&user())?;
        assert_eq!(
            signer.validate(&issued.token),
            Err(TokenError::InvalidAudience)
        );

        let mut other_issuer = config(SECRET, 0);
        other_issuer.jwt_issuer = "https://elsewhere/".to_owned();
        let issued = TokenSigner::from_config(&other_issuer)?.issue(&user())?;
        assert_eq!(
            signer.validate(&issued.token),
            Err(TokenError::InvalidIssuer)
        );

        Ok(())
    }

    #[test]
    fn rejects_garbage_and_tampered_tokens() -> anyhow::Result<()> {
        let signer = TokenSigner::from_config(&config(SECRET, 0))?;

        assert_eq!(signer.validate("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(signer.validate(""), Err(TokenError::Malformed));

        let issued = signer.issue(&user())?;
        let mut segments: Vec<&str> = issued.token.split('.').collect();
        let forged_payload = signer.issue(&User {
            username: "mallory".to_owned(),
            ..user()
        })?;
        let forged_segments: Vec<&str> = forged_payload.token.split('.').collect();
        segments[1] = forged_segments[1];
        let tampered = segments.join(".");

        assert_eq!(
            signer.validate(&tampered),
            Err(TokenError::InvalidSignature)
        );

        Ok(())
    }

    #[test]
    fn debug_output_hides_keys() -> anyhow::Result<()> {
        let signer = TokenSigner::from_config(&config(SECRET, 0))?;
        let debug = format!("{signer:?}");

        assert!(debug.contains("HS256"));
        assert!(!debug.contains(SECRET));

        Ok(())
    }
}
