//! Request extractors with API error responses.
//!
//! - [`AuthState`] - Bearer access token extraction and validation
//! - [`Json`] - JSON deserialization with API error rejections
//! - [`ValidateJson`] - JSON extraction with automatic validation

pub mod auth;
pub mod reject;

pub use crate::extract::auth::AuthState;
pub use crate::extract::reject::{Json, ValidateJson};
