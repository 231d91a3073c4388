//! Conversions from service layer outcomes into HTTP errors.

use crate::handler::{Error, ErrorKind};
use crate::service::{AuthError, TokenError};
use crate::utility::tracing_targets::{
    TRACING_TARGET_AUTHENTICATION, TRACING_TARGET_RECOVERY_ERROR,
};

impl From<crate::Error> for Error<'static> {
    fn from(error: crate::Error) -> Self {
        tracing::error!(
            target: TRACING_TARGET_RECOVERY_ERROR,
            kind = %error.kind(),
            error = %error,
            "service error"
        );

        ErrorKind::InternalServerError.with_context(error.kind().as_str())
    }
}

impl From<AuthError> for Error<'static> {
    fn from(error: AuthError) -> Self {
        match error {
            // Unknown, rotated and expired tokens share one public response.
            error if error.is_refresh_rejection() => ErrorKind::InvalidRefreshToken
                .with_resource("refresh_token")
                .with_context(error.to_string()),
            AuthError::UsernameTaken => ErrorKind::Conflict
                .with_message("Username is already taken")
                .with_resource("user"),
            AuthError::Unavailable(error) => error.into(),
            _ => ErrorKind::Unauthorized
                .with_message("Invalid username or password")
                .with_resource("authentication"),
        }
    }
}

impl From<TokenError> for Error<'static> {
    fn from(error: TokenError) -> Self {
        tracing::warn!(
            target: TRACING_TARGET_AUTHENTICATION,
            reason = %error,
            "access token rejected"
        );

        ErrorKind::MalformedAuthToken
            .with_message("Invalid or expired access token")
            .with_resource("authentication")
            .with_context(error.to_string())
    }
}
