//! Response types for HTTP handlers.

mod authentications;
mod errors;

pub use authentications::*;
pub use errors::*;
