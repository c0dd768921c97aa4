//! Core LLM client types and trait definitions

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::streaming::{TokenStream, stream_from_fragments};
use super::types::ChatRequest;

/// Stateless LLM client - each call is independent (fresh context)
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Start a streamed completion. The returned stream must be drained by the caller.
    async fn stream_chat(&self, request: ChatRequest) -> Result<TokenStream, LlmError>;
}

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },

    #[error("Event source error: {0}")]
    EventSource(String),
}

/// Scripted reply for [`MockLlmClient`]
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Stream these fragments, in order
    Fragments(Vec<String>),
    /// Fail the call before any fragment is produced
    Fail(String),
}

impl MockReply {
    /// Reply with a single fragment of text
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Fragments(vec![text.into()])
    }

    /// Reply with `code` wrapped in the code sentinels
    pub fn code(code: impl AsRef<str>) -> Self {
        MockReply::Fragments(vec![
            "Here you go:\n<code>\n".to_string(),
            code.as_ref().to_string(),
            "\n</code>\n".to_string(),
        ])
    }
}

/// In-memory client that replays scripted replies and records requests
pub struct MockLlmClient {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockLlmClient {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of scripted replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn stream_chat(&self, request: ChatRequest) -> Result<TokenStream, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let reply = self
            .replies
            .lock()
            .map_err(|_| LlmError::InvalidResponse("mock state poisoned".to_string()))?
            .pop_front();

        match reply {
            Some(MockReply::Fragments(fragments)) => Ok(stream_from_fragments(fragments)),
            Some(MockReply::Fail(message)) => Err(LlmError::InvalidResponse(message)),
            None => Err(LlmError::InvalidResponse("no scripted reply left".to_string())),
        }
    }
}
