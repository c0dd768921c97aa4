//! Domain types for Autocoder
//!
//! This module contains all core domain types:
//! - Intent: what a generation call is asked to do
//! - IterationRecord / RunState: the append-only version history of a run
//! - RunConfig: explicit per-run configuration
//! - Termination / RunReport: why and where a run stopped

pub mod intent;
pub mod iteration;
pub mod outcome;
pub mod run_config;

pub use intent::Intent;
pub use iteration::{IterationRecord, RunState, code_digest};
pub use outcome::{RunReport, Termination};
pub use run_config::RunConfig;
