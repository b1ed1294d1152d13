//! Application orchestration.
//!
//! Runtime wiring and lifecycle management for the settlement daemon.

pub mod runtime;

pub use runtime::{run, run_with_shutdown};
