//! CLI definition using clap.
//!
//! Every flag is optional; anything not given falls back to the config file
//! and then to the built-in defaults.

use clap::Parser;
use std::path::PathBuf;

/// Autocoder - generate a program with an LLM, run it, and keep fixing or improving it
#[derive(Parser, Debug)]
#[command(name = "autocoder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// What the program should do (defaults to run.prompt from the config file)
    pub prompt: Option<String>,

    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Model identifier, e.g. deepseek/deepseek-chat
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum number of rounds
    #[arg(short = 'n', long)]
    pub max_iterations: Option<u32>,

    /// Wall-clock limit for each execution, in seconds
    #[arg(short, long)]
    pub timeout_secs: Option<u64>,

    /// Directory the generated programs are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Program used to run each artifact; pass "" to run artifacts directly
    #[arg(short, long)]
    pub interpreter: Option<String>,

    /// Do not echo model output while it streams
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}
