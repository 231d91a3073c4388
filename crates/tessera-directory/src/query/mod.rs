//! Repository contract for user records.

mod user;

pub use user::{TokenSwap, UserDirectory};
