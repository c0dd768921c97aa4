//! Generation client - one stateless model call per operation
//!
//! Every call sends a fresh system + user message pair; nothing is carried
//! between calls. The streamed reply is drained in full before the code is
//! extracted.

use std::sync::Arc;

use crate::domain::Intent;
use crate::error::Result;
use crate::generation::extract::extract_code;
use crate::llm::{ChatRequest, LlmClient, LlmError, StreamObserver, collect_stream};
use crate::prompt::{PromptContext, PromptRenderer, PromptSet};

/// What to ask the model for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub intent: Intent,
    /// User prompt for `Generate`, current code for `Fix` and `Improve`
    pub input: String,
    /// Execution feedback, for `Fix`
    pub error_output: Option<String>,
}

impl GenerationRequest {
    pub fn generate(prompt: impl Into<String>) -> Self {
        Self {
            intent: Intent::Generate,
            input: prompt.into(),
            error_output: None,
        }
    }

    pub fn fix(code: impl Into<String>, error_output: impl Into<String>) -> Self {
        Self {
            intent: Intent::Fix,
            input: code.into(),
            error_output: Some(error_output.into()),
        }
    }

    pub fn improve(code: impl Into<String>) -> Self {
        Self {
            intent: Intent::Improve,
            input: code.into(),
            error_output: None,
        }
    }

    fn context(&self) -> PromptContext<'_> {
        match self.intent {
            Intent::Generate => PromptContext {
                prompt: Some(&self.input),
                ..Default::default()
            },
            Intent::Fix | Intent::Improve => PromptContext {
                code: Some(&self.input),
                error_output: self.error_output.as_deref(),
                ..Default::default()
            },
        }
    }
}

/// Code produced by a successful generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub code: String,
    /// Full response text the code was extracted from
    pub raw_response: String,
}

/// Why a generation call produced no usable code
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The reply had no (or an empty) code block
    #[error("response contained no code")]
    NoCode { raw_response: String },

    /// The backend call failed
    #[error(transparent)]
    Backend(#[from] LlmError),

    /// The user message could not be rendered
    #[error("prompt rendering failed: {0}")]
    Prompt(String),
}

pub type GenerationOutcome = std::result::Result<GenerationResult, GenerationError>;

/// Issues generate / fix / improve calls against an [`LlmClient`]
pub struct GenerationClient<L: LlmClient> {
    llm: Arc<L>,
    model: String,
    max_tokens: Option<u32>,
    prompts: PromptSet,
    renderer: PromptRenderer,
    observer: Option<Arc<dyn StreamObserver>>,
}

impl<L: LlmClient> GenerationClient<L> {
    /// Create a client; fails if a user template does not parse
    pub fn new(llm: Arc<L>, model: impl Into<String>, prompts: PromptSet) -> Result<Self> {
        let renderer = PromptRenderer::new(&prompts)?;
        Ok(Self {
            llm,
            model: model.into(),
            max_tokens: None,
            prompts,
            renderer,
            observer: None,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Forward streamed fragments to `observer` as they arrive
    pub fn with_observer(mut self, observer: Arc<dyn StreamObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub async fn generate_initial(&self, prompt: &str) -> GenerationOutcome {
        self.request(&GenerationRequest::generate(prompt)).await
    }

    pub async fn fix(&self, code: &str, error_output: &str) -> GenerationOutcome {
        self.request(&GenerationRequest::fix(code, error_output)).await
    }

    pub async fn improve(&self, code: &str) -> GenerationOutcome {
        self.request(&GenerationRequest::improve(code)).await
    }

    /// Run one model call for `request` and extract the code from the reply
    pub async fn request(&self, request: &GenerationRequest) -> GenerationOutcome {
        let user = self
            .renderer
            .render_user(request.intent, &request.context())
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;

        let chat = ChatRequest::new(self.model.clone())
            .with_system_message(self.prompts.system(request.intent))
            .with_user_message(user)
            .with_max_tokens(self.max_tokens);

        log::debug!("{} request to {} ({} messages)", request.intent, self.model, chat.messages.len());

        let stream = self.llm.stream_chat(chat).await?;
        let raw_response = collect_stream(stream, self.observer.as_deref()).await?;

        match extract_code(&raw_response) {
            Ok(code) if !code.is_empty() => Ok(GenerationResult { code, raw_response }),
            Ok(_) => {
                log::warn!("{} response had an empty code block", request.intent);
                Err(GenerationError::NoCode { raw_response })
            }
            Err(e) => {
                log::warn!("{} response: {}", request.intent, e);
                Err(GenerationError::NoCode { raw_response })
            }
        }
    }
}
