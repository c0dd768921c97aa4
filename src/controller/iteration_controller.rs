//! Iteration controller - drives generate, execute, fix / improve rounds.
//!
//! The controller is an explicit state machine:
//!
//! ```text
//! Init -> Generated -> Executed -> {Fixing | Improving} -> Generated -> ... -> Terminated
//! ```
//!
//! Every new version of the code is persisted before it is executed, and the
//! run stops as soon as a generation call yields no code, yields the code it
//! was given, or the iteration counter passes the budget. A failed save aborts
//! the run with an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::artifact::{ArtifactStore, FileArtifactStore};
use crate::controller::observer::RunObserver;
use crate::domain::{Intent, RunConfig, RunReport, RunState, Termination};
use crate::error::{AutocoderError, Result};
use crate::execution::{Classification, ExecutionConfig, ExecutionOutcome, Executor, ProcessExecutor};
use crate::generation::{GenerationClient, GenerationRequest};
use crate::llm::{LlmClient, OpenRouterClient, OpenRouterConfig, StreamObserver};

/// Controller wired to OpenRouter, child processes and the filesystem
pub type OpenRouterController = IterationController<OpenRouterClient, ProcessExecutor, FileArtifactStore>;

/// Controller state between steps
#[derive(Debug)]
enum Phase {
    Init,
    /// Iteration `index` is persisted at `artifact` and waiting to run
    Generated { index: u32, artifact: PathBuf },
    Executed(ExecutionOutcome),
    Fixing { code: String, feedback: String },
    Improving { code: String },
    Terminated(Termination),
}

/// Runs one prompt through the generate / execute / refine loop
pub struct IterationController<L, E, S>
where
    L: LlmClient,
    E: Executor,
    S: ArtifactStore,
{
    generation: GenerationClient<L>,
    executor: Arc<E>,
    store: Arc<S>,
    state: RunState,
    observer: Option<Arc<dyn RunObserver>>,
}

impl<L, E, S> IterationController<L, E, S>
where
    L: LlmClient,
    E: Executor,
    S: ArtifactStore,
{
    /// Create a controller with a budget of `max_iterations` rounds
    pub fn new(generation: GenerationClient<L>, executor: Arc<E>, store: Arc<S>, max_iterations: u32) -> Self {
        Self {
            generation,
            executor,
            store,
            state: RunState::new(max_iterations),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Echo streamed model output to `observer`
    pub fn with_stream_observer(mut self, observer: Arc<dyn StreamObserver>) -> Self {
        self.generation = self.generation.with_observer(observer);
        self
    }

    /// State of the current (or last) run
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Run `prompt` to a terminal state.
    ///
    /// Only a persistence failure is returned as `Err`; every other failure
    /// ends the run with a [`Termination`].
    pub async fn run(&mut self, prompt: &str) -> Result<RunReport> {
        self.state = RunState::new(self.state.budget());
        self.store.begin_run();
        let mut phase = Phase::Init;

        loop {
            phase = match phase {
                Phase::Init => self.initial(prompt).await?,
                Phase::Generated { index, artifact } => {
                    let outcome = self.execute(index, &artifact).await;
                    Phase::Executed(outcome)
                }
                Phase::Executed(outcome) => {
                    let code = self.current_code();
                    match outcome.classification {
                        Classification::Error => Phase::Fixing {
                            code,
                            feedback: outcome.feedback(),
                        },
                        // A timeout is a performance problem, not a correctness one
                        Classification::Success | Classification::Timeout => Phase::Improving { code },
                    }
                }
                Phase::Fixing { code, feedback } => self.refine(GenerationRequest::fix(code, feedback)).await?,
                Phase::Improving { code } => self.refine(GenerationRequest::improve(code)).await?,
                Phase::Terminated(termination) => return Ok(self.finish(termination)),
            };
        }
    }

    async fn initial(&mut self, prompt: &str) -> Result<Phase> {
        self.notify(|o| o.on_request(Intent::Generate));
        match self.generation.generate_initial(prompt).await {
            Ok(result) => self.commit(result.code),
            Err(e) => {
                log::warn!("Initial generation failed: {}", e);
                Ok(Phase::Terminated(Termination::NoInitialCode { reason: e.to_string() }))
            }
        }
    }

    async fn execute(&mut self, index: u32, artifact: &Path) -> ExecutionOutcome {
        log::info!("Iteration {}: executing {}", index, artifact.display());
        self.notify(|o| o.on_execute(index));

        let outcome = self.executor.execute(artifact).await;

        log::info!("Iteration {}: {}", index, outcome.classification);
        self.notify(|o| o.on_executed(index, &outcome));
        self.state.record_outcome(outcome.clone());
        outcome
    }

    /// Ask for a fix or an improvement and decide where the run goes next
    async fn refine(&mut self, request: GenerationRequest) -> Result<Phase> {
        let intent = request.intent;
        self.notify(|o| o.on_request(intent));

        match self.generation.request(&request).await {
            Err(e) => {
                log::warn!("{} produced no code: {}", intent, e);
                Ok(Phase::Terminated(Termination::NoCode {
                    intent,
                    reason: e.to_string(),
                }))
            }
            Ok(result) if result.code == request.input => {
                log::info!("{} returned unchanged code", intent);
                Ok(Phase::Terminated(Termination::NoProgress { intent }))
            }
            Ok(result) => self.commit(result.code),
        }
    }

    /// Persist `code` as the next iteration, then check the budget
    fn commit(&mut self, code: String) -> Result<Phase> {
        let index = self.state.next_index();
        let artifact = self.store.save(&code, index).map_err(|e| match e {
            AutocoderError::Persistence(_) => e,
            other => AutocoderError::Persistence(other.to_string()),
        })?;

        let record = self.state.advance(code, artifact.clone());
        if let Some(observer) = &self.observer {
            observer.on_saved(record);
        }

        if self.state.budget_exhausted() {
            log::info!("Budget of {} rounds used", self.state.budget());
            return Ok(Phase::Terminated(Termination::BudgetExhausted));
        }
        Ok(Phase::Generated { index, artifact })
    }

    fn current_code(&self) -> String {
        self.state.current().map(|r| r.code.clone()).unwrap_or_default()
    }

    fn finish(&self, termination: Termination) -> RunReport {
        let last_iteration = self.state.iteration_count();
        log::info!("Run finished at iteration {}: {}", last_iteration, termination);
        self.notify(|o| o.on_terminated(&termination, last_iteration));

        RunReport {
            termination,
            last_iteration,
            rounds: self.state.rounds(),
            artifacts: self.state.history().iter().map(|r| r.file.clone()).collect(),
        }
    }

    fn notify(&self, event: impl FnOnce(&dyn RunObserver)) {
        if let Some(observer) = &self.observer {
            event(observer.as_ref());
        }
    }
}

impl OpenRouterController {
    /// Build a controller backed by OpenRouter, child processes and the filesystem
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        config.validate()?;
        if config.api_key.trim().is_empty() {
            return Err(AutocoderError::Config("no API key configured".to_string()));
        }

        let llm = OpenRouterClient::with_api_key(
            config.api_key.clone(),
            OpenRouterConfig {
                model: config.model.clone(),
                base_url: config.base_url.clone(),
                max_tokens: config.max_tokens,
            },
        )
        .map_err(|e| AutocoderError::Generation(e.to_string()))?;

        let generation = GenerationClient::new(Arc::new(llm), config.model.clone(), config.prompts.clone())?
            .with_max_tokens(config.max_tokens);

        let executor = ProcessExecutor::new(
            ExecutionConfig::new(config.execution_timeout).interpreter(config.interpreter.clone()),
        );
        let store = FileArtifactStore::new(&config.output_dir, &config.artifact_prefix, &config.artifact_extension);

        Ok(Self::new(generation, Arc::new(executor), Arc::new(store), config.max_iterations))
    }
}
