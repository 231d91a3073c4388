use std::fmt;

#[cfg(any(test, feature = "config"))]
use clap::Args;
use derive_builder::Builder;
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::service::{PasswordHasher, RefreshTokenGenerator, TokenSigner};
use crate::utility::tracing_targets::TRACING_TARGET_CONFIG;
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    /// Issuer used when none is configured.
    pub const JWT_ISSUER: &str = "https://localhost:7277/";

    /// Default clock skew tolerance in seconds.
    pub const JWT_CLOCK_SKEW: u32 = 0;

    /// Default refresh token lifetime in hours.
    pub const REFRESH_TOKEN_LIFETIME: u32 = 24;

    pub fn jwt_issuer() -> String {
        JWT_ISSUER.to_owned()
    }

    pub fn refresh_token_lifetime() -> u32 {
        REFRESH_TOKEN_LIFETIME
    }
}

/// Minimum signing secret length in bytes (256 bits).
pub const MIN_SECRET_BYTES: usize = 32;

/// Authentication [`state`] configuration.
///
/// Every value is checked by [`AuthConfig::validate`] before the service
/// starts; an invalid configuration never reaches request handling.
///
/// [`state`]: crate::service::ServiceState
#[derive(Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct AuthConfig {
    /// Secret used to sign access tokens with HMAC-SHA256.
    ///
    /// Must be at least 32 bytes long.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "JWT_SECRET", hide_env_values = true)
    )]
    pub jwt_secret: String,

    /// Access token lifespan in minutes.
    #[cfg_attr(any(test, feature = "config"), arg(long, env = "JWT_LIFESPAN"))]
    pub jwt_lifespan: u32,

    /// Audience embedded into and required from access tokens.
    #[cfg_attr(any(test, feature = "config"), arg(long, env = "JWT_AUDIENCE"))]
    pub jwt_audience: String,

    /// Issuer embedded into and required from access tokens.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "JWT_ISSUER", default_value = defaults::JWT_ISSUER)
    )]
    #[serde(default = "defaults::jwt_issuer")]
    #[builder(default = "defaults::jwt_issuer()")]
    pub jwt_issuer: String,

    /// Tolerated clock skew in seconds for not-before and expiry checks.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "JWT_CLOCK_SKEW", default_value_t = defaults::JWT_CLOCK_SKEW)
    )]
    #[serde(default)]
    #[builder(default = "defaults::JWT_CLOCK_SKEW")]
    pub jwt_clock_skew: u32,

    /// Refresh token lifetime in hours.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long,
            env = "REFRESH_TOKEN_LIFETIME",
            default_value_t = defaults::REFRESH_TOKEN_LIFETIME
        )
    )]
    #[serde(default = "defaults::refresh_token_lifetime")]
    #[builder(default = "defaults::REFRESH_TOKEN_LIFETIME")]
    pub refresh_token_lifetime: u32,
}

impl AuthConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::default()
    }

    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Config`] error describing the first invalid
    /// value.
    ///
    /// [`ErrorKind::Config`]: crate::ErrorKind::Config
    pub fn validate(&self) -> Result<()> {
        let checks = [
            check_secret(&self.jwt_secret),
            check_lifespan(self.jwt_lifespan),
            check_non_empty("audience", &self.jwt_audience),
            check_non_empty("issuer", &self.jwt_issuer),
            check_refresh_lifetime(self.refresh_token_lifetime),
        ];

        for check in checks {
            if let Err(message) = check {
                tracing::error!(
                    target: TRACING_TARGET_CONFIG,
                    error = %message,
                    "invalid authentication configuration"
                );

                return Err(Error::config(message));
            }
        }

        Ok(())
    }

    /// Returns the access token lifespan.
    #[must_use]
    pub fn access_token_lifespan(&self) -> SignedDuration {
        SignedDuration::from_mins(i64::from(self.jwt_lifespan))
    }

    /// Returns the refresh token lifetime.
    #[must_use]
    pub fn refresh_token_lifetime(&self) -> SignedDuration {
        SignedDuration::from_hours(i64::from(self.refresh_token_lifetime))
    }

    /// Returns the tolerated clock skew in seconds.
    #[must_use]
    pub fn clock_skew_secs(&self) -> i64 {
        i64::from(self.jwt_clock_skew)
    }

    /// Creates the access token signer.
    pub fn create_token_signer(&self) -> Result<TokenSigner> {
        TokenSigner::from_config(self)
    }

    /// Creates the password hasher.
    pub fn create_password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new()
    }

    /// Creates the refresh token generator.
    pub fn create_refresh_token_generator(&self) -> RefreshTokenGenerator {
        RefreshTokenGenerator::new()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_lifespan", &self.jwt_lifespan)
            .field("jwt_audience", &self.jwt_audience)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_clock_skew", &self.jwt_clock_skew)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .finish()
    }
}

impl AuthConfigBuilder {
    /// Wrapper for builder validation that returns String errors.
    fn validate(builder: &AuthConfigBuilder) -> Result<(), String> {
        if let Some(secret) = &builder.jwt_secret {
            check_secret(secret)?;
        }

        if let Some(lifespan) = builder.jwt_lifespan {
            check_lifespan(lifespan)?;
        }

        if let Some(audience) = &builder.jwt_audience {
            check_non_empty("audience", audience)?;
        }

        if let Some(issuer) = &builder.jwt_issuer {
            check_non_empty("issuer", issuer)?;
        }

        if let Some(lifetime) = builder.refresh_token_lifetime {
            check_refresh_lifetime(lifetime)?;
        }

        Ok(())
    }
}

fn check_secret(secret: &str) -> Result<(), String> {
    if secret.len() < MIN_SECRET_BYTES {
        return Err(format!(
            "JWT secret must be at least {MIN_SECRET_BYTES} bytes, got {}",
            secret.len()
        ));
    }

    Ok(())
}

fn check_lifespan(minutes: u32) -> Result<(), String> {
    if minutes == 0 {
        return Err("JWT lifespan must be at least one minute".to_owned());
    }

    Ok(())
}

fn check_non_empty(name: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("JWT {name} must not be empty"));
    }

    Ok(())
}

fn check_refresh_lifetime(hours: u32) -> Result<(), String> {
    if hours == 0 {
        return Err("Refresh token lifetime must be at least one hour".to_owned());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::ErrorKind;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[derive(Debug, Parser)]
    struct TestCli {
        #[clap(flatten)]
        auth: AuthConfig,
    }

    #[test]
    fn builder_applies_defaults() -> anyhow::Result<()> {
        let config = AuthConfig::builder()
            .with_jwt_secret(SECRET)
            .with_jwt_lifespan(15u32)
            .with_jwt_audience("tessera:api")
            .build()?;

        assert_eq!(config.jwt_issuer, "https://localhost:7277/");
        assert_eq!(config.clock_skew_secs(), 0);
        assert_eq!(config.refresh_token_lifetime(), SignedDuration::from_hours(24));
        assert_eq!(config.access_token_lifespan(), SignedDuration::from_mins(15));
        config.validate()?;

        Ok(())
    }

    #[test]
    fn builder_rejects_short_secret() {
        let result = AuthConfig::builder()
            .with_jwt_secret("too-short")
            .with_jwt_lifespan(15u32)
            .with_jwt_audience("tessera:api")
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn builder_rejects_missing_audience() {
        let result = AuthConfig::builder()
            .with_jwt_secret(SECRET)
            .with_jwt_lifespan(15u32)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_zero_lifespan() {
        let config = AuthConfig {
            jwt_secret: SECRET.to_owned(),
            jwt_lifespan: 0,
            jwt_audience: "tessera:api".to_owned(),
            jwt_issuer: defaults::jwt_issuer(),
            jwt_clock_skew: 0,
            refresh_token_lifetime: 24,
        };

        let error = config.validate().err();
        assert_eq!(error.map(|e| e.kind()), Some(ErrorKind::Config));
    }

    #[test]
    fn parses_from_command_line() -> anyhow::Result<()> {
        let cli = TestCli::try_parse_from([
            "tessera",
            "--jwt-secret",
            SECRET,
            "--jwt-lifespan",
            "30",
            "--jwt-audience",
            "tessera:api",
            "--jwt-clock-skew",
            "5",
        ])?;

        assert_eq!(cli.auth.jwt_lifespan, 30);
        assert_eq!(cli.auth.clock_skew_secs(), 5);
        assert_eq!(cli.auth.refresh_token_lifetime, 24);
        cli.auth.validate()?;

        Ok(())
    }

    #[test]
    fn debug_output_redacts_secret() -> anyhow::Result<()> {
        let config = AuthConfig::builder()
            .with_jwt_secret(SECRET)
            .with_jwt_lifespan(15u32)
            .with_jwt_audience("tessera:api")
            .build()?;

        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(SECRET));

        Ok(())
    }
}
