//! Autocoder - iterative code generation against a live interpreter
//!
//! A prompt is turned into a program by a language model, the program is run,
//! and the result decides the next request: errors are sent back to be fixed,
//! clean runs (and timeouts) are sent back to be improved. Every version is
//! persisted, and the loop stops when the model stops making progress or the
//! iteration budget runs out.

pub mod artifact;
pub mod controller;
pub mod domain;
pub mod error;
pub mod execution;
pub mod generation;
pub mod llm;
pub mod prompt;

pub use error::{AutocoderError, Result};
