mod cli;
mod handlers;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, RunMode};
use loom_dl::batch::BatchReport;
use loom_dl::{ConfigManager, LoomError};
use std::process;
use tracing_subscriber::EnvFilter;

/// Exit code for a batch in which at least one item failed.
const EXIT_BATCH_FAILURES: i32 = 1;
/// Exit code for invalid command-line usage, matching clap.
const EXIT_USAGE: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Validate CLI arguments first
    let mode = match args.validate() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run 'loom-dl --help' for usage");
            process::exit(EXIT_USAGE);
        }
    };

    init_logging(args.verbose);

    let config_manager = match load_config(&args) {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(e.exit_code());
        }
    };

    let exit_code = match mode {
        RunMode::Single { url, out } => {
            match handlers::handle_single(&config_manager, &url, &out).await {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit_code_for(&e)
                }
            }
        }
        RunMode::Batch { list, prefix, out } => {
            match handlers::handle_batch(
                &config_manager,
                &list,
                &prefix,
                &out,
                args.timeout,
                args.force,
            )
            .await
            {
                Ok(report) => batch_exit_code(&report),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit_code_for(&e)
                }
            }
        }
    };

    if exit_code != 0 {
        process::exit(exit_code);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,loom_dl={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &Cli) -> Result<ConfigManager, LoomError> {
    let manager = ConfigManager::load(args.config.as_deref())?;
    manager.validate()?;
    tracing::debug!("Using configuration from {:?}", manager.config_file());
    Ok(manager)
}

fn batch_exit_code(report: &BatchReport) -> i32 {
    if report.has_failures() {
        EXIT_BATCH_FAILURES
    } else {
        0
    }
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<LoomError>()
        .map(LoomError::exit_code)
        .unwrap_or(EXIT_BATCH_FAILURES)
}
