//! Bearer token authentication extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use derive_more::Deref;

use crate::handler::{Error, ErrorKind, Result};
use crate::service::{AccessClaims, TokenSigner};
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION;

/// Caller authenticated by a valid access token.
///
/// Extraction reads `Authorization: Bearer <token>` and validates the token
/// with the configured [`TokenSigner`]: signature, audience, issuer and the
/// not-before/expiry window. The result is cached in the request extensions.
///
/// Dereferences to the validated [`AccessClaims`].
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct AuthState {
    token: String,
    #[deref]
    claims: AccessClaims,
}

impl AuthState {
    /// Validates a raw bearer token.
    pub fn from_token(token: &str, token_signer: &TokenSigner) -> Result<Self> {
        let claims = token_signer.validate(token)?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            user_id = %claims.user_id,
            "access token accepted"
        );

        Ok(Self {
            token: token.to_owned(),
            claims,
        })
    }

    /// Returns the raw access token.
    #[inline]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the validated claims.
    #[inline]
    pub fn claims(&self) -> &AccessClaims {
        &self.claims
    }

    /// Consumes the state and returns the raw token and its claims.
    #[inline]
    pub fn into_parts(self) -> (String, AccessClaims) {
        (self.token, self.claims)
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send,
    TokenSigner: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;

        let bearer = match AuthBearerHeader::from_request_parts(parts, state).await {
            Ok(bearer) => bearer,
            Err(rejection) => {
                let error = match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                        .with_message("Authentication required")
                        .with_context("Missing Authorization header with Bearer token")
                        .with_resource("authentication"),
                    _ => ErrorKind::MalformedAuthToken
                        .with_message("Invalid token format")
                        .with_context("Authorization header must contain a valid Bearer token")
                        .with_resource("authentication"),
                };

                tracing::debug!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    reason = %rejection,
                    "bearer token extraction failed"
                );

                return Err(error);
            }
        };

        let token_signer = TokenSigner::from_ref(state);
        let auth_state = Self::from_token(bearer.token(), &token_signer)?;
        parts.extensions.insert(auth_state.clone());

        Ok(auth_state)
    }
}
