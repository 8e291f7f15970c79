//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Walk paginated record sources from either end
#[derive(Parser, Debug)]
#[command(name = "pagewalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Walk definition file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the retry budget from the walk definition
    #[arg(short, long, global = true)]
    pub retries: Option<u32>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show total records and pages
    Count,

    /// Stream records, one per line
    Read {
        /// Start from the last record and walk towards the first
        #[arg(long)]
        reverse: bool,

        /// Maximum records to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Fetch a single page (0-based index)
    Page {
        /// Page index
        index: usize,
    },

    /// Validate the walk definition
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    Json,
    /// Human-readable output
    Pretty,
}
