//! regren - bulk regex rename
//!
//! Entry point for the CLI application.

use anyhow::{bail, Context, Result};
use clap::Parser;
use regren::config::{normalize_args, CliArgs, RenameConfig};
use regren::GlobSource;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse_from(normalize_args(std::env::args_os()));

    setup_logging(args.verbose);

    let config = RenameConfig::from_args(args).context("Invalid configuration")?;
    let cwd = std::env::current_dir().context("Failed to read working directory")?;

    if config.dry_run {
        info!("Dry run: no files will be renamed");
    }

    let results = regren::renamer()
        .source(GlobSource::new(config.paths))
        .rule(config.rule)
        .type_filter(config.type_filter)
        .workers(config.workers)
        .queue_capacity(config.queue_capacity)
        .dry_run(config.dry_run)
        .print_to(std::io::stdout())
        .relative_to(cwd)
        .run()
        .context("Rename failed")?;

    if results.has_failures() {
        bail!("{} of {} renames failed", results.failed, results.matches);
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("regren=debug,warn")
        } else {
            EnvFilter::new("regren=warn")
        }
    });

    // stdout carries the rename lines; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(verbose)
        .init();
}
