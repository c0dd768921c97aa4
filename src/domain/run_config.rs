//! Explicit configuration for a single run.
//!
//! Everything the controller and its collaborators need is carried here and
//! passed in at construction; there is no process-wide client or constant.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AutocoderError, Result};
use crate::llm::openrouter::{DEFAULT_MODEL, OPENROUTER_BASE_URL};
use crate::prompt::PromptSet;

pub const DEFAULT_MAX_ITERATIONS: u32 = 5;
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_OUTPUT_DIR: &str = "generated_code";
pub const DEFAULT_INTERPRETER: &str = "python";
pub const DEFAULT_ARTIFACT_PREFIX: &str = "generated_code";
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "py";

#[derive(Clone)]
pub struct RunConfig {
    //=== Backend ===
    pub model: String,
    pub base_url: String,
    /// Credential for the model backend
    pub api_key: String,
    pub max_tokens: Option<u32>,

    //=== Loop ===
    /// Maximum number of rounds (the budget)
    pub max_iterations: u32,
    /// Wall-clock limit for one execution of the generated program
    pub execution_timeout: Duration,

    //=== Artifacts ===
    pub output_dir: PathBuf,
    /// Program used to launch an artifact; `None` runs the artifact directly
    pub interpreter: Option<String>,
    pub artifact_prefix: String,
    pub artifact_extension: String,

    pub prompts: PromptSet,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            api_key: String::new(),
            max_tokens: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            execution_timeout: DEFAULT_EXECUTION_TIMEOUT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            interpreter: Some(DEFAULT_INTERPRETER.to_string()),
            artifact_prefix: DEFAULT_ARTIFACT_PREFIX.to_string(),
            artifact_extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
            prompts: PromptSet::default(),
        }
    }
}

impl RunConfig {
    /// Reject settings the controller cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(AutocoderError::Config("max_iterations must be > 0".to_string()));
        }
        if self.execution_timeout.is_zero() {
            return Err(AutocoderError::Config("execution timeout must be > 0".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(AutocoderError::Config("model must not be empty".to_string()));
        }
        if self.artifact_prefix.trim().is_empty() {
            return Err(AutocoderError::Config("artifact prefix must not be empty".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("max_tokens", &self.max_tokens)
            .field("max_iterations", &self.max_iterations)
            .field("execution_timeout", &self.execution_timeout)
            .field("output_dir", &self.output_dir)
            .field("interpreter", &self.interpreter)
            .field("artifact_prefix", &self.artifact_prefix)
            .field("artifact_extension", &self.artifact_extension)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.model, "deepseek/deepseek-chat");
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.execution_timeout, Duration::from_secs(5));
        assert_eq!(config.output_dir, PathBuf::from("generated_code"));
        assert_eq!(config.interpreter.as_deref(), Some("python"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let config = RunConfig {
            max_iterations: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_iterations"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = RunConfig {
            execution_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let config = RunConfig {
            model: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = RunConfig {
            api_key: "sk-or-secret".to_string(),
            ..Default::default()
        };
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("<redacted>"));
        assert!(!debug_str.contains("sk-or-secret"));
    }
}
