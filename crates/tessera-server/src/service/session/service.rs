use std::fmt;

use jiff::{SignedDuration, Timestamp};
use tessera_directory::model::{NewUser, User};
use tessera_directory::query::{TokenSwap, UserDirectory};

use super::AuthError;
use crate::service::{AccessToken, PasswordHasher, RefreshTokenGenerator, TokenSigner};
use crate::utility::tracing_targets::TRACING_TARGET_SESSION as TRACING_TARGET;
use crate::{Error, Result};

/// Access token and refresh token issued together by login or refresh.
#[derive(Clone)]
pub struct TokenPair {
    /// Signed access token and its claims.
    pub access_token: AccessToken,
    /// Opaque refresh token, now the only live one for the user.
    pub refresh_token: String,
    /// Absolute expiry of [`refresh_token`](Self::refresh_token).
    pub refresh_token_expires_at: Timestamp,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("user_id", &self.access_token.claims.user_id)
            .field("expires_at", &self.access_token.claims.expires_at)
            .field("refresh_token_expires_at", &self.refresh_token_expires_at)
            .finish_non_exhaustive()
    }
}

/// Orchestrates login, refresh token rotation and registration.
///
/// Holds no session state of its own; every durable fact lives in the
/// directory `D`.
#[derive(Clone)]
pub struct AuthSessionService<D> {
    directory: D,
    password_hasher: PasswordHasher,
    token_signer: TokenSigner,
    refresh_tokens: RefreshTokenGenerator,
    refresh_lifetime: SignedDuration,
}

impl<D> AuthSessionService<D>
where
    D: UserDirectory,
{
    /// Creates a new session service over `directory`.
    pub fn new(
        directory: D,
        password_hasher: PasswordHasher,
        token_signer: TokenSigner,
        refresh_tokens: RefreshTokenGenerator,
        refresh_lifetime: SignedDuration,
    ) -> Self {
        Self {
            directory,
            password_hasher,
            token_signer,
            refresh_tokens,
            refresh_lifetime,
        }
    }

    /// Returns the underlying directory.
    #[inline]
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Returns the access token signer.
    #[inline]
    pub fn token_signer(&self) -> &TokenSigner {
        &self.token_signer
    }

    /// Authenticates `username` with `password` and issues a token pair.
    ///
    /// Any previously stored refresh token of the user is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user and for
    /// a wrong password alike.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = self.directory.find_by_username(username).await?;

        let password_valid = match &user {
            Some(user) => self
                .password_hasher
                .verify_password(password, &user.password_hash),
            None => self.password_hasher.verify_dummy_password(password),
        };

        let user = match user {
            Some(user) if password_valid => user,
            user => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    username = %username,
                    user_exists = user.is_some(),
                    "login rejected"
                );

                return Err(AuthError::InvalidCredentials);
            }
        };

        let pair = self.issue_pair(&user)?;
        let stored = self
            .directory
            .update_refresh_token(
                user.id,
                TokenSwap::Unconditional,
                pair.refresh_token.clone(),
                pair.refresh_token_expires_at,
            )
            .await?;

        if !stored {
            return Err(Error::internal("session", "unconditional token swap was refused").into());
        }

        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user.id,
            username = %user.username,
            "login successful"
        );

        Ok(pair)
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// The presented token is invalidated whether or not it had expired.
    /// When several requests present the same token concurrently, exactly
    /// one of them succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidRefreshToken`] if the token is unknown or
    /// was rotated in the meantime, and [`AuthError::ExpiredRefreshToken`] if
    /// it matched but is past its expiry.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let Some(user) = self.directory.find_by_refresh_token(refresh_token).await? else {
            tracing::warn!(
                target: TRACING_TARGET,
                reason = "unknown",
                "refresh token rejected"
            );

            return Err(AuthError::InvalidRefreshToken);
        };

        if user.refresh_token_expired_at(Timestamp::now()) {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %user.id,
                reason = "expired",
                "refresh token rejected"
            );

            return Err(AuthError::ExpiredRefreshToken);
        }

        let pair = self.issue_pair(&user)?;
        let swapped = self
            .directory
            .update_refresh_token(
                user.id,
                TokenSwap::Expected(refresh_token.to_owned()),
                pair.refresh_token.clone(),
                pair.refresh_token_expires_at,
            )
            .await?;

        if !swapped {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %user.id,
                reason = "rotated",
                "refresh token rejected"
            );

            return Err(AuthError::InvalidRefreshToken);
        }

        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user.id,
            "refresh token rotated"
        );

        Ok(pair)
    }

    /// Registers a new user with a hashed password and no refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UsernameTaken`] if the username is held, including
    /// when a concurrent registration claims it first.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<User, AuthError> {
        if self.directory.exists_username(username).await? {
            tracing::warn!(
                target: TRACING_TARGET,
                username = %username,
                "registration rejected: username taken"
            );

            return Err(AuthError::UsernameTaken);
        }

        let new_user = NewUser {
            username: username.to_owned(),
            password_hash: self.password_hasher.hash_password(password)?,
            email: email.to_owned(),
        };

        let user = self.directory.create(new_user).await.map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET,
                username = %username,
                error = %e,
                "registration rejected"
            );

            AuthError::from(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user.id,
            username = %user.username,
            "user registered"
        );

        Ok(user)
    }

    fn issue_pair(&self, user: &User) -> Result<TokenPair> {
        let now = Timestamp::now();
        let access_token = self.token_signer.issue_at(user, now)?;
        let refresh_token_expires_at = now
            .checked_add(self.refresh_lifetime)
            .map_err(|e| Error::internal("session", "invalid refresh expiry").with_source(e))?;

        Ok(TokenPair {
            access_token,
            refresh_token: self.refresh_tokens.generate(),
            refresh_token_expires_at,
        })
    }
}

impl<D> fmt::Debug for AuthSessionService<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSessionService")
            .field("token_signer", &self.token_signer)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish_non_exhaustive()
    }
}
