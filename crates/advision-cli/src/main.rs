//! AdVision CLI - a command line client for the AdVision marketing
//! analytics API.
//!
//! Manages campaigns, creatives and knowledge-base documents, shows
//! dashboards and talks to the AI assistant.

mod app;
mod cli;
mod output;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use advision_core::Config;
use app::{App, SignInRequired};
use cli::Cli;

/// Exit status when there is no usable session and the user must sign in
const EXIT_SESSION_EXPIRED: u8 = 2;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load()?;
    config.api_url_override = cli.api_url;
    debug!(api_url = %config.api_url(), "Configuration loaded");

    let mut app = App::new(config)?;
    let result = app.run(cli.command).await;

    if let Some(event) = app.take_invalidation() {
        info!(method = %event.method, path = %event.path, "Session invalidated");
        eprintln!(
            "Your session has expired or was rejected. Sign in again with `advision login` ({}).",
            event.redirect_to
        );
        return Ok(ExitCode::from(EXIT_SESSION_EXPIRED));
    }

    match result {
        Err(e) if e.is::<SignInRequired>() => {
            eprintln!("Not signed in. Sign in with `advision login` first.");
            Ok(ExitCode::from(EXIT_SESSION_EXPIRED))
        }
        result => result.map(|()| ExitCode::SUCCESS),
    }
}
