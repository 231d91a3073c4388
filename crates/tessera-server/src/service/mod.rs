//! Token lifecycle core: configuration, cryptographic primitives, session
//! orchestration and application state.

mod config;
mod security;
mod session;
mod state;

pub use crate::service::config::{AuthConfig, AuthConfigBuilder, AuthConfigBuilderError};
pub use crate::service::security::{
    AccessClaims, AccessToken, PasswordHasher, REFRESH_TOKEN_BYTES, RefreshTokenGenerator,
    TOKEN_TYPE_BEARER, TokenError, TokenSigner,
};
pub use crate::service::session::{AuthError, AuthSessionService, TokenPair};
pub use crate::service::state::{ServiceState, SessionService};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};
