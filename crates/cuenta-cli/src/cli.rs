//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cuenta - Categorize ledger transactions from their own history
#[derive(Parser)]
#[command(name = "cuenta")]
#[command(about = "Transaction auto-categorization for personal ledgers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine config file (defaults to the data dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Learn from a corpus and show what was learned
    Learn {
        /// Corpus CSV file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List suggestions for uncategorized rows
    Suggest {
        /// Corpus CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fill uncategorized rows and write the result
    Apply {
        /// Corpus CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show the category → subcategory hierarchy
    Hierarchy {
        /// Corpus CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Print the flat category and subcategory lists offered when editing
        #[arg(long)]
        options: bool,
    },

    /// Show default categories per merchant
    Merchants {
        /// Corpus CSV file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Validate a batch of manual edits and commit it if every edit is valid
    Validate {
        /// Corpus CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Edits CSV file (id,category,subcategory)
        #[arg(short, long)]
        edits: PathBuf,

        /// Write the edited corpus here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show what a description would be categorized as
    Test {
        /// Transaction description
        #[arg(short, long)]
        description: String,

        /// Merchant name
        #[arg(short, long)]
        merchant: Option<String>,

        /// Amount (negative = expense)
        #[arg(short, long, allow_negative_numbers = true)]
        amount: Option<f64>,

        /// Corpus CSV file to learn from (rules only when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
