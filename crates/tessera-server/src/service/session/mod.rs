//! Login, refresh token rotation and registration.

mod error;
mod service;

pub use error::AuthError;
pub use service::{AuthSessionService, TokenPair};
