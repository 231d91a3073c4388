//! Request types for HTTP handlers.

mod authentications;

pub use authentications::*;
