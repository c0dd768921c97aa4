//! Execution outcome and the success/error/timeout classification policy.

use std::fmt;
use std::time::Duration;

/// Three-way result of one execution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Success,
    Error,
    /// Killed for exceeding the wall-clock limit. Not an error for the controller.
    Timeout,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Success => "success",
            Classification::Error => "error",
            Classification::Timeout => "timeout",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a finished (or killed) run from its captured output.
///
/// Text heuristic, not a structural check: any non-blank stderr, or stdout
/// containing "error" or "exception" in any case, counts as an error. Stderr
/// that is empty or only whitespace (spaces, tabs, newlines) does not count.
/// A program that merely prints the word "error" is misclassified, and the
/// exit code is ignored.
pub fn classify(timed_out: bool, stdout: &str, stderr: &str) -> Classification {
    if timed_out {
        return Classification::Timeout;
    }

    let stdout = stdout.to_lowercase();
    if !stderr.trim().is_empty() || stdout.contains("error") || stdout.contains("exception") {
        Classification::Error
    } else {
        Classification::Success
    }
}

const RULE_WIDTH: usize = 50;

/// Captured result of running one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    pub classification: Classification,
    /// `None` when the process was killed or never started
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
    pub pid: Option<u32>,
    /// Limit that was exceeded, for timeouts
    pub timed_out_after: Option<Duration>,
}

impl ExecutionOutcome {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, classification: Classification) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            classification,
            exit_code: None,
            elapsed: Duration::ZERO,
            pid: None,
            timed_out_after: None,
        }
    }

    /// Outcome of a process that ran to completion, classified from its output
    pub fn completed(stdout: String, stderr: String, exit_code: Option<i32>, elapsed: Duration) -> Self {
        let classification = classify(false, &stdout, &stderr);
        Self {
            exit_code,
            elapsed,
            ..Self::new(stdout, stderr, classification)
        }
    }

    /// Outcome of a process killed at `limit`
    pub fn timed_out(stdout: String, stderr: String, limit: Duration, elapsed: Duration) -> Self {
        Self {
            elapsed,
            timed_out_after: Some(limit),
            ..Self::new(stdout, stderr, Classification::Timeout)
        }
    }

    /// The shim itself failed; reported as an error so the controller attempts a fix
    pub fn spawn_failure(reason: impl fmt::Display) -> Self {
        Self::new(String::new(), format!("Error executing code: {}", reason), Classification::Error)
    }

    pub fn with_pid(mut self, pid: Option<u32>) -> Self {
        self.pid = pid;
        self
    }

    pub fn is_error(&self) -> bool {
        self.classification == Classification::Error
    }

    /// Text handed to the model when asking for a fix
    pub fn feedback(&self) -> String {
        if let Some(limit) = self.timed_out_after {
            return format!(
                "Code execution timed out after {} seconds (this is not considered an error)",
                limit.as_secs_f64()
            );
        }

        let rule = "=".repeat(RULE_WIDTH);
        let mut out = format!("{}\n", rule);
        if !self.stdout.trim().is_empty() {
            out.push_str(&format!("STDOUT:\n{}\n", self.stdout));
        }
        if !self.stderr.trim().is_empty() {
            out.push_str(&format!("STDERR:\n{}\n", self.stderr));
        }
        out.push_str(&rule);
        out
    }
}
