use crate::Error;

/// Outcome of a rejected login, refresh or registration.
///
/// The first four variants are expected per-request outcomes. Only
/// [`Unavailable`](Self::Unavailable) indicates a fault.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password. The two cases are not
    /// distinguishable by the caller.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The refresh token is unknown or has already been rotated.
    #[error("refresh token is not recognized")]
    InvalidRefreshToken,

    /// The refresh token matched a record but its expiry has passed.
    #[error("refresh token has expired")]
    ExpiredRefreshToken,

    /// Registration attempted with a username that is already held.
    #[error("username is already taken")]
    UsernameTaken,

    /// The directory, hasher or signer failed unexpectedly.
    #[error(transparent)]
    Unavailable(#[from] Error),
}

impl AuthError {
    /// Returns whether this outcome is a refresh token rejection.
    #[must_use]
    pub fn is_refresh_rejection(&self) -> bool {
        matches!(self, Self::InvalidRefreshToken | Self::ExpiredRefreshToken)
    }
}

impl From<tessera_directory::DirectoryError> for AuthError {
    fn from(error: tessera_directory::DirectoryError) -> Self {
        match error {
            tessera_directory::DirectoryError::Conflict(_) => Self::UsernameTaken,
            other => Self::Unavailable(other.into()),
        }
    }
}
