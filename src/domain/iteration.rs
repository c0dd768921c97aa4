//! Iteration records and run state
//!
//! A run is an append-only sequence of iterations. Each iteration holds one
//! version of the generated program, the artifact it was persisted to, and the
//! outcome of executing it (once it has been executed).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::execution::ExecutionOutcome;

/// One version of the generated program
#[derive(Debug, Clone)]
pub struct IterationRecord {
    //=== Identity ===
    /// 1-based, strictly increasing within a run
    pub index: u32,

    /// SHA-256 of `code`, hex encoded
    pub digest: String,

    //=== Content ===
    /// Program text as extracted from the model response
    pub code: String,

    /// Artifact the code was persisted to
    pub file: PathBuf,

    //=== Runtime State ===
    /// Execution result, once this iteration has been run
    pub outcome: Option<ExecutionOutcome>,

    pub created_at: DateTime<Utc>,
}

impl IterationRecord {
    pub fn new(index: u32, code: impl Into<String>, file: PathBuf) -> Self {
        let code = code.into();
        Self {
            index,
            digest: code_digest(&code),
            code,
            file,
            outcome: None,
            created_at: Utc::now(),
        }
    }

    /// Whether this iteration has been executed
    pub fn is_executed(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Hex-encoded SHA-256 of a program's text
pub fn code_digest(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

/// Mutable state of one run, owned by the controller
#[derive(Debug, Clone)]
pub struct RunState {
    iteration_count: u32,
    budget: u32,
    history: Vec<IterationRecord>,
}

impl RunState {
    pub fn new(budget: u32) -> Self {
        Self {
            iteration_count: 0,
            budget,
            history: Vec::new(),
        }
    }

    /// Index the next persisted iteration will receive
    pub fn next_index(&self) -> u32 {
        self.iteration_count + 1
    }

    /// Append a new iteration whose code has already been persisted to `file`.
    ///
    /// The index is assigned here, so the counter can only move forward by one.
    pub fn advance(&mut self, code: impl Into<String>, file: PathBuf) -> &IterationRecord {
        self.iteration_count += 1;
        self.history.push(IterationRecord::new(self.iteration_count, code, file));
        &self.history[self.history.len() - 1]
    }

    /// Attach an execution outcome to the current iteration
    pub fn record_outcome(&mut self, outcome: ExecutionOutcome) {
        if let Some(current) = self.history.last_mut() {
            current.outcome = Some(outcome);
        }
    }

    pub fn current(&self) -> Option<&IterationRecord> {
        self.history.last()
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    /// Number of rounds run so far (iterations that were executed)
    pub fn rounds(&self) -> u32 {
        self.history.iter().filter(|r| r.is_executed()).count() as u32
    }

    /// True once the counter has moved past the budget
    pub fn budget_exhausted(&self) -> bool {
        self.iteration_count > self.budget
    }
}
