//! Middleware for `axum::Router` and HTTP request processing.
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use axum::Router;
//! use tessera_server::middleware::{RouterObservabilityExt, RouterRecoveryExt};
//!
//! let app: Router = Router::new()
//!     .with_observability()
//!     .with_recovery(Duration::from_secs(30));
//! ```

mod observability;
mod recovery;

pub use observability::{REQUEST_ID_HEADER, RouterObservabilityExt};
pub use recovery::RouterRecoveryExt;
