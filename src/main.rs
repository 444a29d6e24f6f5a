// src/main.rs

//! replaycli
//!
//! Entry point for the replaycli CLI.
//!
//! This binary talks to the stormreplay service, which replays historical
//! storm advisories on a configurable cadence. It delegates all real work
//! to the `runner` module.
//!
//! Responsibilities of this file:
//! - Parse CLI arguments
//! - Initialise logging and the async runtime
//! - Map the outcome to an exit status (0 success, 255 failure)

mod api;
mod auth;
mod cli;
mod config;
mod format;
mod model;
mod runner;
mod validate;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is normal
    let _ = dotenvy::dotenv();

    // Usage errors exit 255 like every other precondition failure
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(runner::FAILURE_STATUS)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logging(cli.verbose);

    let result = runner::run(cli).await;
    match &result {
        Ok(out) if !out.text.is_empty() => println!("{}", out.text),
        Ok(_) => {}
        Err(e) => eprintln!("Error: {:#}", e),
    }

    ExitCode::from(runner::exit_status(&result))
}

/// Logs go to stderr so stdout stays parseable (`--as json`, `--as config`).
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("replaycli={}", level))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
