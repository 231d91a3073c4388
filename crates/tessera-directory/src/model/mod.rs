//! User records held by the directory.
//!
//! ## Models
//!
//! - [`User`] - Stored identity record with credentials and refresh token state
//! - [`NewUser`] - Data required to create a record

mod user;

pub use user::{NewUser, User};
