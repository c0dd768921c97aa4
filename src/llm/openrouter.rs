//! OpenRouter API client implementation
//!
//! OpenRouter exposes an OpenAI-compatible `/chat/completions` endpoint. This
//! client always requests a streamed response and surfaces it as a
//! [`TokenStream`] of content fragments.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::{Value, json};

use crate::llm::client::{LlmClient, LlmError};
use crate::llm::streaming::{SseData, TokenStream, parse_sse_data};
use crate::llm::types::{ChatRequest, Role};

/// OpenRouter API base URL
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Environment variable holding the OpenRouter credential
pub const OPENROUTER_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Default model to use
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat";

/// Configuration for the OpenRouter client
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub model: String,
    pub base_url: String,
    pub max_tokens: Option<u32>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            max_tokens: None,
        }
    }
}

/// Resolve the credential held in `env_var`, reading variables through
/// `lookup`. A blank value counts as missing.
pub fn resolve_api_key(env_var: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String, LlmError> {
    lookup(env_var)
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| LlmError::MissingApiKey {
            env_var: env_var.to_string(),
        })
}

/// OpenRouter API client
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    /// Create a client with an explicit API key
    ///
    /// No request timeout is set: a streamed generation can legitimately run
    /// for minutes and there is no cancellation path above this client.
    pub fn with_api_key(api_key: String, config: OpenRouterConfig) -> Result<Self, LlmError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Build the request body for the chat completions API
    fn build_request(&self, request: &ChatRequest) -> Value {
        let model = if request.model.is_empty() {
            self.config.model.clone()
        } else {
            request.model.clone()
        };

        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| {
                json!({
                    "role": match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    "content": m.content
                })
            })
            .collect();

        let mut body = json!({
            "model": model,
            "messages": messages,
            "stream": true
        });

        if let Some(max_tokens) = request.max_tokens.or(self.config.max_tokens) {
            body["max_tokens"] = json!(max_tokens);
        }

        body
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn stream_chat(&self, request: ChatRequest) -> Result<TokenStream, LlmError> {
        let body = self.build_request(&request);
        log::debug!("Streaming chat completion from {} with model {}", self.endpoint(), body["model"]);

        let mut es = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .eventsource()
            .map_err(|e| LlmError::EventSource(e.to_string()))?;

        let stream = async_stream::stream! {
            while let Some(event) = es.next().await {
                match event {
                    Ok(Event::Open) => {}
                    Ok(Event::Message(msg)) => match parse_sse_data(&msg.data) {
                        Ok(SseData::Delta(fragment)) => yield Ok(fragment),
                        Ok(SseData::Empty) => {}
                        Ok(SseData::Done) => break,
                        Err(e) => {
                            yield Err(e);
                            break;
                        }
                    },
                    Err(reqwest_eventsource::Error::StreamEnded) => break,
                    Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                        let message = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        yield Err(LlmError::ApiError {
                            status: status.as_u16(),
                            message,
                        });
                        break;
                    }
                    Err(e) => {
                        yield Err(LlmError::EventSource(e.to_string()));
                        break;
                    }
                }
            }
            es.close();
        };

        Ok(Box::pin(stream))
    }
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenRouterClient {
        OpenRouterClient::with_api_key("test-key".to_string(), OpenRouterConfig::default()).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = OpenRouterConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, OPENROUTER_BASE_URL);
        assert!(config.max_tokens.is_none());
    }

    #[test]
    fn test_resolve_api_key() {
        let key = resolve_api_key("MY_KEY", |name| (name == "MY_KEY").then(|| "sk-or-1".to_string()));
        assert_eq!(key.unwrap(), "sk-or-1");
    }

    #[test]
    fn test_resolve_api_key_missing_or_blank() {
        let missing = resolve_api_key("MY_KEY", |_| None);
        assert!(matches!(missing, Err(LlmError::MissingApiKey { ref env_var }) if env_var == "MY_KEY"));

        let blank = resolve_api_key("MY_KEY", |_| Some("  ".to_string()));
        assert!(matches!(blank, Err(LlmError::MissingApiKey { .. })));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = OpenRouterConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..Default::default()
        };
        let client = OpenRouterClient::with_api_key("k".to_string(), config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_build_request_basic() {
        let request = ChatRequest::new("")
            .with_system_message("You are a generator")
            .with_user_message("a calculator");

        let body = client().build_request(&request);

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are a generator");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "a calculator");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_build_request_custom_model_and_tokens() {
        let request = ChatRequest::new("anthropic/claude-3.5-sonnet")
            .with_user_message("hi")
            .with_max_tokens(Some(2048));

        let body = client().build_request(&request);

        assert_eq!(body["model"], "anthropic/claude-3.5-sonnet");
        assert_eq!(body["max_tokens"], 2048);
    }

    #[test]
    fn test_debug_impl_hides_key() {
        let debug_str = format!("{:?}", client());
        assert!(debug_str.contains("OpenRouterClient"));
        assert!(debug_str.contains(DEFAULT_MODEL));
        assert!(!debug_str.contains("test-key"));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OpenRouterClient>();
    }
}
