//! Console reporter - coloured status lines and streamed model output.

use std::io::Write;

use colored::*;

use autocoder::controller::RunObserver;
use autocoder::domain::{Intent, IterationRecord, RunReport, Termination};
use autocoder::execution::{Classification, ExecutionOutcome};
use autocoder::llm::StreamObserver;

pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Final summary after a run that reached a terminal state
    pub fn summary(&self, report: &RunReport) {
        println!();
        println!("{} {}", "Finished:".green().bold(), report.termination);
        println!(
            "  last iteration: {}, rounds executed: {}",
            report.last_iteration, report.rounds
        );
        if let Some(path) = report.last_artifact() {
            println!("  latest code: {}", path.display().to_string().cyan());
        }
    }

    /// A run that stopped on a persistence failure
    pub fn aborted(&self, error: &dyn std::fmt::Display, last_iteration: u32) {
        println!();
        println!("{} {}", "Aborted:".red().bold(), error);
        println!("  last saved iteration: {}", last_iteration);
    }
}

impl RunObserver for ConsoleReporter {
    fn on_request(&self, intent: Intent) {
        let line = match intent {
            Intent::Generate => "Generating initial code...",
            Intent::Fix => "Errors detected. Attempting to fix...",
            Intent::Improve => "Attempting to improve code...",
        };
        println!("\n{}", line.yellow());
    }

    fn on_saved(&self, record: &IterationRecord) {
        println!("{} {}", "Saved code to".green(), record.file.display());
        if self.verbose {
            println!("  sha256 {}", record.digest.get(..12).unwrap_or(&record.digest));
        }
    }

    fn on_execute(&self, index: u32) {
        println!("\n{}", format!("Iteration {}", index).bold());
        println!("{}", "Executing code...".cyan());
    }

    fn on_executed(&self, _index: u32, outcome: &ExecutionOutcome) {
        println!("{}", outcome.feedback());
        let status = match outcome.classification {
            Classification::Success => "Code executed successfully".green(),
            Classification::Timeout => "Execution timed out (not treated as an error)".yellow(),
            Classification::Error => "Execution reported errors".red(),
        };
        println!("{}", status);
        if self.verbose {
            println!("  exit code: {:?}, elapsed: {:?}", outcome.exit_code, outcome.elapsed);
        }
    }

    fn on_terminated(&self, termination: &Termination, _last_iteration: u32) {
        let line = match termination {
            Termination::BudgetExhausted => "Reached maximum iterations".to_string(),
            Termination::NoProgress { .. } => "No changes in code. Stopping iterations.".to_string(),
            Termination::NoCode { intent, .. } => format!("Failed to {} the code. Stopping iterations.", intent),
            Termination::NoInitialCode { .. } => "Failed to generate initial code".to_string(),
        };
        println!("\n{}", line.magenta());
    }
}

impl StreamObserver for ConsoleReporter {
    fn on_fragment(&self, fragment: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "{}", fragment);
        let _ = stdout.flush();
    }

    fn on_end(&self) {
        println!();
    }
}
