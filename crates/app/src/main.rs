//! Fyxed - commission ledger command line
//!
//! Run with: `fyxed <command>` (see `fyxed help`)
//!
//! Command results are printed to stdout as JSON. Logs go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use anyhow::Context;
use fyxed_domain::Config;
use fyxed_lib::cli::{self, Command, USAGE};
use fyxed_lib::utils::logging::init_tracing;
use fyxed_lib::AppContext;

#[tokio::main]
async fn main() -> ExitCode {
    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}");
            eprintln!();
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    if command == Command::Help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    match run(command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<bool> {
    let dotenv = dotenvy::dotenv();

    let config = fyxed_infra::config::load().unwrap_or_else(|e| {
        eprintln!("No configuration found ({e}), using defaults");
        Config::default()
    });
    init_tracing(&config.logging);

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }

    let ctx = AppContext::new(config).context("failed to initialize Fyxed")?;
    let output = cli::dispatch(&ctx, command).await?;

    let rendered = serde_json::to_string_pretty(&output.body).context("failed to render output")?;
    println!("{rendered}");

    Ok(output.ok)
}
