//! LLM Client Layer - OpenRouter chat completions with streaming
//!
//! This module provides:
//! - Message types for LLM communication
//! - LlmClient trait for API abstraction
//! - OpenRouterClient implementation
//! - Token stream draining with observers

pub mod client;
pub mod openrouter;
pub mod streaming;
pub mod types;

pub use client::{LlmClient, LlmError, MockLlmClient, MockReply};
pub use openrouter::{OpenRouterClient, OpenRouterConfig};
pub use streaming::{SseData, StreamObserver, TokenStream, collect_stream, parse_sse_data, stream_from_fragments};
pub use types::{ChatRequest, Message, Role};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let _role = Role::System;
        let _request = ChatRequest::new(openrouter::DEFAULT_MODEL);
    }
}
