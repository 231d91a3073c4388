#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for directory query operations.
///
/// Use this target for logging lookups, inserts and refresh token swaps.
pub const TRACING_TARGET_QUERY: &str = "tessera_directory::queries";

mod memory;
pub mod model;
pub mod query;

use uuid::Uuid;

pub use crate::memory::MemoryDirectory;

/// Error type for all user directory operations.
///
/// A failed precondition on a refresh token swap is not an error; it is
/// reported as `Ok(false)` by [`UserDirectory::update_refresh_token`].
///
/// [`UserDirectory::update_refresh_token`]: crate::query::UserDirectory::update_refresh_token
#[derive(Debug, thiserror::Error)]
#[must_use = "directory errors should be handled appropriately"]
pub enum DirectoryError {
    /// The username is already held by another record.
    ///
    /// Returned by `create` when the uniqueness invariant would be violated,
    /// including when a concurrent registration won the race.
    #[error("Username '{0}' is already taken")]
    Conflict(String),

    /// No record exists for the given identifier.
    #[error("User {0} not found")]
    NotFound(Uuid),
}

/// Specialized [`Result`] type for directory operations.
pub type DirectoryResult<T, E = DirectoryError> = Result<T, E>;
