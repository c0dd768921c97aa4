//! Streaming support for LLM responses.
//!
//! A response arrives as a pull-based, ordered sequence of text fragments.
//! Consumers drain it completely before acting on the text; console echo is
//! a separate observer fed from the same sequence.

use std::pin::Pin;

use futures::{Stream, StreamExt};
use serde_json::Value;

use super::client::LlmError;

/// Ordered sequence of content fragments from the backend.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Receives fragments as they are drained from a [`TokenStream`].
pub trait StreamObserver: Send + Sync {
    /// Called once per fragment, in stream order.
    fn on_fragment(&self, fragment: &str);

    /// Called after the stream ends, whether or not it failed.
    fn on_end(&self) {}
}

/// Drain the stream, concatenating fragments and forwarding each to `observer`.
///
/// Stops at the first error and returns it; text received before the error is
/// discarded.
pub async fn collect_stream(
    mut stream: TokenStream,
    observer: Option<&dyn StreamObserver>,
) -> Result<String, LlmError> {
    let mut text = String::new();
    let mut failure = None;

    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => {
                if let Some(obs) = observer {
                    obs.on_fragment(&fragment);
                }
                text.push_str(&fragment);
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    if let Some(obs) = observer {
        obs.on_end();
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(text),
    }
}

/// Build a stream from already-known fragments.
pub fn stream_from_fragments(fragments: Vec<String>) -> TokenStream {
    Box::pin(futures::stream::iter(fragments.into_iter().map(Ok)))
}

/// Outcome of parsing one SSE `data:` payload from a chat completion stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseData {
    /// A content fragment
    Delta(String),
    /// A chunk carrying no content (role header, usage, keep-alive)
    Empty,
    /// The `[DONE]` terminator
    Done,
}

/// Parse an OpenAI-style chat completion chunk.
///
/// ```text
/// data: {"choices":[{"delta":{"content":"Hel"}}]}
/// data: [DONE]
/// ```
pub fn parse_sse_data(data: &str) -> Result<SseData, LlmError> {
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseData::Done);
    }
    if data.is_empty() {
        return Ok(SseData::Empty);
    }

    let parsed: Value = serde_json::from_str(data)?;

    if let Some(message) = parsed["error"]["message"].as_str() {
        return Err(LlmError::InvalidResponse(message.to_string()));
    }

    match parsed["choices"][0]["delta"]["content"].as_str() {
        Some(content) if !content.is_empty() => Ok(SseData::Delta(content.to_string())),
        _ => Ok(SseData::Empty),
    }
}
