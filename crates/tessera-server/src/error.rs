//! Fault type of the service layer.
//!
//! An [`Error`] means something is broken: bad configuration at startup, or
//! an unexpected failure of the directory, the password hasher or the token
//! signer. Expected per-request outcomes such as bad credentials are
//! [`AuthError`](crate::service::AuthError) values instead.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Boxed `Send + Sync` error used as an [`Error`] source.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for service layer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What part of the service failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid configuration. Fatal at startup.
    Config,
    /// The user directory failed.
    External,
    /// Password hashing or token signing failed.
    Auth,
    /// A broken invariant inside the service.
    Internal,
}

impl ErrorKind {
    /// Returns the stable label used in logs and error contexts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::External => "external_service",
            Self::Auth => "auth",
            Self::Internal => "internal_service",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service layer fault.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Invalid configuration value.
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Failure reported by an external collaborator such as the directory.
    pub fn external(component: &str, message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::External, format!("{component}: {message}"))
    }

    /// Failure of a cryptographic primitive.
    pub fn auth(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    /// Broken invariant inside `component`.
    pub fn internal(component: &str, message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Internal, format!("{component}: {message}"))
    }

    /// Attaches the underlying cause.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<tessera_directory::DirectoryError> for Error {
    fn from(error: tessera_directory::DirectoryError) -> Self {
        Self::external("directory", &error).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use tessera_directory::DirectoryError;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn config_error_keeps_message() {
        let error = Error::config("invalid configuration");
        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(error.message(), "invalid configuration");
        assert_eq!(error.to_string(), "config: invalid configuration");
    }

    #[test]
    fn source_is_exposed() {
        let source = std::io::Error::other("entropy source unavailable");
        let error = Error::auth("cannot hash password").with_source(source);

        assert_eq!(error.kind(), ErrorKind::Auth);
        assert!(StdError::source(&error).is_some());
    }

    #[test]
    fn directory_errors_are_external() {
        let id = Uuid::nil();
        let error = Error::from(DirectoryError::NotFound(id));

        assert_eq!(error.kind(), ErrorKind::External);
        assert!(error.message().starts_with("directory: "));
        assert!(error.message().contains(&id.to_string()));
    }
}
