//! Execution shim - run generated programs and classify the result
//!
//! This module provides:
//! - Classification policy (success / error / timeout)
//! - ExecutionOutcome with the feedback text used for fix prompts
//! - Executor trait and the ProcessExecutor implementation

pub mod outcome;
pub mod shim;

pub use outcome::{Classification, ExecutionOutcome, classify};
pub use shim::{ExecutionConfig, Executor, ProcessExecutor};
