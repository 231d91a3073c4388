//! Shared utilities.

pub mod tracing_targets;
