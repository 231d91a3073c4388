use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::utility::tracing_targets::TRACING_TARGET_RECOVERY_ERROR;

/// JSON body of every error response: `{name, message, resource?}`.
///
/// `context` and `status` are not serialized; the context is logged when
/// the response is produced.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse<'a> {
    /// Stable machine-readable error name.
    pub name: Cow<'a, str>,
    /// Message safe to show to the caller.
    pub message: Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,

    #[serde(skip)]
    pub context: Option<Cow<'a, str>>,
    #[serde(skip)]
    pub status: StatusCode,
}

macro_rules! error_responses {
    ($($(#[$meta:meta])* $konst:ident => ($name:literal, $message:literal, $status:ident);)+) => {
        impl ErrorResponse<'static> {
            $(
                $(#[$meta])*
                pub const $konst: Self = Self::new($name, $message, StatusCode::$status);
            )+
        }
    };
}

error_responses! {
    BAD_REQUEST => ("bad_request", "Invalid request data", BAD_REQUEST);
    /// Bearer header absent.
    MISSING_AUTH_TOKEN => ("missing_auth_token", "Authentication required", UNAUTHORIZED);
    /// Bearer token present but failed validation.
    MALFORMED_AUTH_TOKEN => ("malformed_auth_token", "Invalid or expired access token", UNAUTHORIZED);
    /// Login rejected. Unknown users and wrong passwords share this body.
    UNAUTHORIZED => ("unauthorized", "Invalid credentials", UNAUTHORIZED);
    /// Refresh rejected. Unknown, rotated and expired tokens share this body.
    INVALID_REFRESH_TOKEN => ("invalid_refresh_token", "Invalid or expired refresh token", UNAUTHORIZED);
    NOT_FOUND => ("not_found", "Resource not found", NOT_FOUND);
    CONFLICT => ("conflict", "Resource already exists", CONFLICT);
    INTERNAL_SERVER_ERROR => ("internal_server_error", "Internal server error", INTERNAL_SERVER_ERROR);
}

impl<'a> ErrorResponse<'a> {
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            context: None,
            status,
        }
    }

    /// Replaces the default message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Appends diagnostic context, separated by `; `.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let context = context.into();
        self.context = Some(match self.context.take() {
            Some(existing) => Cow::Owned(format!("{existing}; {context}")),
            None => context,
        });
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        ErrorResponse::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        tracing::debug!(
            target: TRACING_TARGET_RECOVERY_ERROR,
            status = self.status.as_u16(),
            name = %self.name,
            resource = self.resource.as_deref(),
            context = self.context.as_deref(),
            "http error response"
        );

        (self.status, Json(self)).into_response()
    }
}
