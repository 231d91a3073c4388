//! Centralized tracing target constants for structured logging.
//!
//! Using consistent targets enables fine-grained control over log output
//! via tracing subscriber filters, e.g. `RUST_LOG=tessera_server::session=debug`.

/// Bearer token extraction and access token validation at the HTTP boundary.
pub const TRACING_TARGET_AUTHENTICATION: &str = "tessera_server::authentication";

/// Login, refresh and registration orchestration.
pub const TRACING_TARGET_SESSION: &str = "tessera_server::session";

/// Password hashing and verification operations.
pub const TRACING_TARGET_PASSWORD_HASHER: &str = "tessera_server::password_hasher";

/// Access token signing and validation.
pub const TRACING_TARGET_TOKEN_SIGNER: &str = "tessera_server::token_signer";

/// Startup configuration validation.
pub const TRACING_TARGET_CONFIG: &str = "tessera_server::config";

/// Error recovery including middleware errors and request failures.
pub const TRACING_TARGET_RECOVERY_ERROR: &str = "tessera_server::recovery::error";

/// Panic recovery including handler panics and service failures.
pub const TRACING_TARGET_RECOVERY_PANIC: &str = "tessera_server::recovery::panic";
