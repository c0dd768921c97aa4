use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;
mod config;

use autocoder::controller::OpenRouterController;
use cli::{Cli, ConsoleReporter};
use config::Config;

fn setup_logging(level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autocoder")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("autocoder.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("info"));
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    let prompt = config.prompt(cli)?;
    let run_config = config.to_run_config(cli).context("Failed to initialize")?;
    info!("Run configuration: {:?}", run_config);

    let reporter = Arc::new(ConsoleReporter::new(cli.is_verbose()));
    let mut controller = OpenRouterController::from_config(&run_config)
        .context("Failed to initialize controller")?
        .with_observer(reporter.clone());
    if !cli.quiet {
        controller = controller.with_stream_observer(reporter.clone());
    }

    if cli.is_verbose() {
        println!(
            "{} {} (budget {}, timeout {:?})",
            "Model:".cyan(),
            run_config.model,
            run_config.max_iterations,
            run_config.execution_timeout
        );
    }

    match controller.run(&prompt).await {
        Ok(report) => {
            reporter.summary(&report);
            Ok(())
        }
        Err(e) => {
            let last_iteration = controller.state().iteration_count();
            reporter.aborted(&e, last_iteration);
            Err(e).context("Run aborted")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let level = if cli.is_verbose() {
        Some("debug")
    } else {
        config.log_level.as_deref()
    };
    setup_logging(level).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).await
}
