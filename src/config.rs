use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use autocoder::domain::RunConfig;
use autocoder::domain::run_config::{
    DEFAULT_ARTIFACT_EXTENSION, DEFAULT_ARTIFACT_PREFIX, DEFAULT_INTERPRETER, DEFAULT_MAX_ITERATIONS, DEFAULT_OUTPUT_DIR,
};
use autocoder::llm::openrouter::{DEFAULT_MODEL, OPENROUTER_API_KEY_ENV, OPENROUTER_BASE_URL, resolve_api_key};
use autocoder::prompt::PromptSet;

use crate::cli::Cli;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    pub run: LoopConfig,
    pub output: OutputConfig,
    pub prompts: PromptSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable holding the credential
    pub api_key_env: String,
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            api_key_env: OPENROUTER_API_KEY_ENV.to_string(),
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub prompt: Option<String>,
    pub max_iterations: u32,
    pub timeout_secs: u64,
    /// Empty means run the artifact directly
    pub interpreter: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            prompt: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            timeout_secs: 5,
            interpreter: DEFAULT_INTERPRETER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub prefix: String,
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            prefix: DEFAULT_ARTIFACT_PREFIX.to_string(),
            extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");
        let mut candidates = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(project_name).join(format!("{}.yml", project_name)));
        }
        candidates.push(PathBuf::from(format!("{}.yml", project_name)));

        for candidate in candidates.iter().filter(|c| c.exists()) {
            match Self::load_from_file(candidate) {
                Ok(config) => return Ok(config),
                Err(e) => log::warn!("Failed to load config from {}: {:#}", candidate.display(), e),
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Prompt from the command line, else from the config file
    pub fn prompt(&self, cli: &Cli) -> Result<String> {
        cli.prompt
            .clone()
            .or_else(|| self.run.prompt.clone())
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| eyre!("No prompt given: pass one as an argument or set run.prompt in the config file"))
    }

    /// Merge CLI overrides and the environment credential into a [`RunConfig`]
    pub fn to_run_config(&self, cli: &Cli) -> Result<RunConfig> {
        self.to_run_config_with(cli, |name| std::env::var(name).ok())
    }

    fn to_run_config_with(&self, cli: &Cli, lookup: impl Fn(&str) -> Option<String>) -> Result<RunConfig> {
        let api_key = resolve_api_key(&self.llm.api_key_env, lookup)?;

        let interpreter = cli
            .interpreter
            .clone()
            .unwrap_or_else(|| self.run.interpreter.clone());

        let config = RunConfig {
            model: cli.model.clone().unwrap_or_else(|| self.llm.model.clone()),
            base_url: self.llm.base_url.clone(),
            api_key,
            max_tokens: self.llm.max_tokens,
            max_iterations: cli.max_iterations.unwrap_or(self.run.max_iterations),
            execution_timeout: Duration::from_secs(cli.timeout_secs.unwrap_or(self.run.timeout_secs)),
            output_dir: cli.output_dir.clone().unwrap_or_else(|| self.output.dir.clone()),
            interpreter: Some(interpreter).filter(|i| !i.trim().is_empty()),
            artifact_prefix: self.output.prefix.clone(),
            artifact_extension: self.output.extension.clone(),
            prompts: self.prompts.clone(),
        };

        config.validate().context("Invalid run configuration")?;
        Ok(config)
    }
}
