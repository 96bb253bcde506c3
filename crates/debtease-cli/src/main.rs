//! DebtEase CLI - Household savings estimator
//!
//! Usage:
//!   debtease check                      Verify model artifacts
//!   debtease analyze --input me.toml    Estimate savings and get advice
//!   debtease batch --file data.csv      Score a CSV as JSON Lines
//!   debtease serve --port 3000          Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.artifacts.as_deref())?;

    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
            allowed_origins,
        } => {
            commands::cmd_serve(&config, &host, port, static_dir.as_deref(), allowed_origins)
                .await
        }
        Commands::Analyze {
            input,
            no_advice,
            json,
        } => commands::cmd_analyze(&config, &input, no_advice, json).await,
        Commands::Prompt { input } => commands::cmd_prompt(&config, &input),
        Commands::Batch { file, output } => commands::cmd_batch(&config, &file, output.as_deref()),
        Commands::Options => commands::cmd_options(&config),
        Commands::Check => commands::cmd_check(&config),
    }
}
