//! Code generation - model calls for generate / fix / improve and code extraction

pub mod client;
pub mod extract;

pub use client::{GenerationClient, GenerationError, GenerationOutcome, GenerationRequest, GenerationResult};
pub use extract::extract_code;
