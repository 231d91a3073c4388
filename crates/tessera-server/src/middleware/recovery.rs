//! Converts handler panics, timeouts and middleware failures into JSON errors.

use std::any::Any;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower::{BoxError, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;

use crate::handler::ErrorKind;
use crate::utility::tracing_targets::{
    TRACING_TARGET_RECOVERY_ERROR, TRACING_TARGET_RECOVERY_PANIC,
};

/// Extension trait for `axum::`[`Router`] to apply recovery middleware.
pub trait RouterRecoveryExt<S> {
    /// Bounds every request by `request_timeout` and answers panics,
    /// timeouts and service errors with a JSON `500`.
    fn with_recovery(self, request_timeout: Duration) -> Self;
}

impl<S> RouterRecoveryExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, request_timeout: Duration) -> Self {
        let middlewares = ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .layer(CatchPanicLayer::custom(catch_panic))
            .layer(TimeoutLayer::new(request_timeout));

        self.layer(middlewares)
    }
}

async fn handle_error(err: BoxError) -> Response {
    let error = if err.is::<Elapsed>() {
        tracing::warn!(target: TRACING_TARGET_RECOVERY_ERROR, "request timed out");
        ErrorKind::InternalServerError
            .with_message("Request timeout")
            .with_context("request exceeded the configured timeout")
    } else {
        tracing::error!(
            target: TRACING_TARGET_RECOVERY_ERROR,
            error = %err,
            "middleware error"
        );
        ErrorKind::InternalServerError.with_context(err.to_string())
    };

    error.into_response()
}

fn catch_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!(
        target: TRACING_TARGET_RECOVERY_PANIC,
        message = panic_message(panic.as_ref()),
        "handler panicked"
    );

    ErrorKind::InternalServerError.into_response()
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = panic.downcast_ref::<&'static str>() {
        *message
    } else {
        "non-string panic payload"
    }
}
