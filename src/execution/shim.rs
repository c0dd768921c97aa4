//! Process executor - runs a generated artifact as a child process
//!
//! The child is given a wall-clock limit that also bounds reading its output.
//! Output on both streams is captured in full, and a child that overruns is
//! killed with its whole process group and reaped before `execute` returns.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::error::{AutocoderError, Result};
use crate::execution::outcome::ExecutionOutcome;

/// How long to wait for pipe readers after a kill before giving up on them
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Runs an artifact and reports what happened
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute `artifact`. Never fails: shim problems become an `Error` outcome.
    async fn execute(&self, artifact: &Path) -> ExecutionOutcome;
}

/// Configuration for the process executor
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Wall-clock limit per run
    pub timeout: Duration,
    /// Launcher for the artifact (e.g. `python`); `None` runs the artifact itself
    pub interpreter: Option<String>,
    /// Working directory for the child; inherits ours when `None`
    pub working_dir: Option<PathBuf>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            interpreter: Some("python".to_string()),
            working_dir: None,
        }
    }
}

impl ExecutionConfig {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// Set the interpreter; an empty string means run the artifact directly
    pub fn interpreter(mut self, interpreter: Option<String>) -> Self {
        self.interpreter = interpreter.filter(|i| !i.trim().is_empty());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Executor backed by real child processes
pub struct ProcessExecutor {
    config: ExecutionConfig,
}

impl ProcessExecutor {
    pub fn new(config: ExecutionConfig) -> Self {
        Self { config }
    }

    fn command(&self, artifact: &Path) -> Command {
        let mut cmd = match &self.config.interpreter {
            Some(interpreter) => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(artifact);
                cmd
            }
            None => Command::new(artifact),
        };

        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a timeout can take down everything the artifact started
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }

    /// Spawn, wait with the limit, and classify
    ///
    /// One deadline covers both the exit and the pipes: a background process
    /// the child leaves behind can hold stdout open after the child exits.
    async fn run(&self, artifact: &Path) -> Result<ExecutionOutcome> {
        let start = Instant::now();
        let deadline = tokio::time::Instant::now() + self.config.timeout;

        let mut child = self
            .command(artifact)
            .spawn()
            .map_err(|e| AutocoderError::Execution(e.to_string()))?;
        let pid = child.id();

        let mut stdout_task = tokio::spawn(read_to_string(child.stdout.take()));
        let mut stderr_task = tokio::spawn(read_to_string(child.stderr.take()));

        match tokio::time::timeout_at(deadline, child.wait()).await {
            Ok(Ok(status)) => {
                let pipes = async { tokio::join!(&mut stdout_task, &mut stderr_task) };
                if let Ok((stdout, stderr)) = tokio::time::timeout_at(deadline, pipes).await {
                    let outcome = ExecutionOutcome::completed(
                        stdout.unwrap_or_default(),
                        stderr.unwrap_or_default(),
                        status.code(),
                        start.elapsed(),
                    );
                    return Ok(outcome.with_pid(pid));
                }
                log::info!("Pid {:?} exited but its output is still open after {:?}", pid, self.config.timeout);
                kill_group(pid).await;
            }
            Ok(Err(e)) => {
                // wait() failed; make sure the child does not outlive us
                kill_group(pid).await;
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(AutocoderError::Execution(format!("failed to wait for child: {}", e)));
            }
            Err(_) => {
                log::info!("Killing pid {:?} after {:?}", pid, self.config.timeout);
                kill_group(pid).await;
                // kill() also reaps, so the pid is gone once this returns
                child
                    .kill()
                    .await
                    .map_err(|e| AutocoderError::Execution(format!("failed to kill child: {}", e)))?;
            }
        }

        let stdout = drain(stdout_task).await;
        let stderr = drain(stderr_task).await;
        Ok(ExecutionOutcome::timed_out(stdout, stderr, self.config.timeout, start.elapsed()).with_pid(pid))
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(&self, artifact: &Path) -> ExecutionOutcome {
        match self.run(artifact).await {
            Ok(outcome) => {
                log::debug!(
                    "{} finished as {} in {:?} (exit {:?})",
                    artifact.display(),
                    outcome.classification,
                    outcome.elapsed,
                    outcome.exit_code
                );
                outcome
            }
            Err(e) => {
                log::warn!("Could not execute {}: {}", artifact.display(), e);
                ExecutionOutcome::spawn_failure(e)
            }
        }
    }
}

async fn read_to_string<R: AsyncRead + Unpin>(reader: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        // Keep whatever arrived before a read error
        let _ = reader.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Kill the process group led by `pid`.
///
/// The group outlives its leader while any member is alive, so this still
/// reaches a background process after the child itself has exited.
#[cfg(unix)]
async fn kill_group(pid: Option<u32>) {
    let Some(pid) = pid else { return };
    let group = format!("-{}", pid);
    let status = Command::new("kill")
        .args(["-KILL", "--", group.as_str()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    match status {
        Ok(status) if status.success() => log::debug!("Killed process group {}", pid),
        // nothing left in the group
        Ok(_) => {}
        Err(e) => log::warn!("Could not kill process group {}: {}", pid, e),
    }
}

#[cfg(not(unix))]
async fn kill_group(_pid: Option<u32>) {}

/// Collect a reader task after a kill. A grandchild may still hold the pipe
/// open, so stop waiting after a short grace period.
async fn drain(task: JoinHandle<String>) -> String {
    let abort = task.abort_handle();
    match tokio::time::timeout(DRAIN_GRACE, task).await {
        Ok(joined) => joined.unwrap_or_default(),
        Err(_) => {
            abort.abort();
            String::new()
        }
    }
}
