//! Prompt System - default prompt text and template rendering
//!
//! This module holds the per-intent system instructions and renders the user
//! messages with Handlebars.

mod prompts;
mod render;

pub use prompts::{CLOSE_SENTINEL, OPEN_SENTINEL, PromptSet};
pub use render::{PromptContext, PromptRenderer};
