//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// DebtEase - Find where your monthly budget can save more
#[derive(Parser)]
#[command(name = "debtease")]
#[command(about = "Household savings estimator and financial advisor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.local/share/debtease/config.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Model artifact directory (overrides config and DEBTEASE_ARTIFACTS_DIR)
    #[arg(long, global = true)]
    pub artifacts: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allow-origin")]
        allowed_origins: Vec<String>,
    },

    /// Analyze one submission and print savings potential
    Analyze {
        /// Submission file (.toml or .json) with [profile] and [expenses]
        #[arg(short, long)]
        input: PathBuf,

        /// Skip the financial advice request
        #[arg(long)]
        no_advice: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the advice prompt for a submission without sending it
    Prompt {
        /// Submission file (.toml or .json)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Score every row of a CSV file (training column names) as JSON Lines
    Batch {
        /// CSV file to score
        #[arg(short, long)]
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List valid occupations and city tiers
    Options,

    /// Verify model artifacts and show configuration
    Check,
}
