//! Cuenta CLI - Transaction auto-categorization
//!
//! Usage:
//!   cuenta learn --file CSV                 Learn from a corpus
//!   cuenta suggest --file CSV               List suggestions for uncategorized rows
//!   cuenta apply --file CSV --output OUT    Fill uncategorized rows
//!   cuenta validate --file CSV --edits CSV  Check and commit manual edits

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
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

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Learn { file } => commands::cmd_learn(config, &file),
        Commands::Suggest { file, json } => commands::cmd_suggest(config, &file, json),
        Commands::Apply { file, output } => commands::cmd_apply(config, &file, &output),
        Commands::Hierarchy { file, options } => {
            commands::cmd_hierarchy(config, &file, options)
        }
        Commands::Merchants { file } => commands::cmd_merchants(config, &file),
        Commands::Validate {
            file,
            edits,
            output,
        } => commands::cmd_validate(config, &file, &edits, output.as_deref()),
        Commands::Test {
            description,
            merchant,
            amount,
            file,
        } => commands::cmd_test(
            config,
            file.as_deref(),
            &description,
            merchant.as_deref(),
            amount,
        ),
    }
}
