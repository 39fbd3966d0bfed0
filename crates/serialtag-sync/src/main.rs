//! serialtagsync entry point.
//!
//! Parses flags, initializes logging, logs in to the controller and runs a
//! single synchronization pass over all elements.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use serialtag_sync::{
    authenticate, Args, HttpController, RunConfig, SerialTagSync, Settings, SyncReport,
    TerminalPrompt,
};

/// Initialize tracing/logging.
///
/// Logs go to stderr; stdout carries the per-element progress lines.
/// `RUST_LOG` overrides the level chosen with `--sdkdebug`.
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Process exit status for a completed run.
const EXIT_OK: u8 = 0;

/// Process exit status when the run could not complete.
const EXIT_FAILED: u8 = 1;

/// Maps the outcome of a run to the process exit status.
///
/// Per-element skips and write failures are reported on the progress lines
/// and leave the status at [`EXIT_OK`]. Only errors that ended the run
/// (settings, login, element listing, progress output) fail the process.
fn exit_status(result: &anyhow::Result<SyncReport>) -> u8 {
    match result {
        Ok(_) => EXIT_OK,
        Err(_) => EXIT_FAILED,
    }
}

async fn run(config: RunConfig) -> anyhow::Result<SyncReport> {
    let mut controller =
        HttpController::new(config.http.clone()).context("Unable to create API client")?;

    let tenant = authenticate(&mut controller, &config.credentials, &mut TerminalPrompt).await?;
    info!(tenant = %tenant, controller = %controller.controller(), "Session established");

    let mut sync = SerialTagSync::new(controller, config.mode);
    Ok(sync.run().await?)
}

async fn start(args: &Args) -> anyhow::Result<SyncReport> {
    let settings = Settings::load(&args.settings)?;
    let config = RunConfig::resolve(args, &settings, |var| std::env::var(var).ok());

    init_logging(config.log_filter);
    info!("--- Starting serialtagsync (mode {:?}) ---", config.mode);

    run(config).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let result = start(&args).await;
    match &result {
        Ok(report) => {
            info!(
                "serialtagsync finished: {} elements, {} updated, {} failed",
                report.processed, report.updated, report.failed
            );
        }
        Err(e) => {
            error!("serialtagsync error: {:#}", e);
            println!("ERROR: {:#}", e);
        }
    }

    ExitCode::from(exit_status(&result))
}
