//! Command-line argument definitions for the lineage CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the roster format,
//! configuration file selection, the family shuffle seed and logging verbosity.

use clap::{Parser, ValueEnum};

use lineage::SourceFormat;

/// Roster format accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Csv,
    Json,
}

impl From<Format> for SourceFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => SourceFormat::Csv,
            Format::Json => SourceFormat::Json,
        }
    }
}

/// Command-line arguments for the lineage tree tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the roster file
    #[arg(help = "Path to the roster file (CSV or JSON)")]
    pub input: String,

    /// Path to the output DOT file
    #[arg(short, long, default_value = "out.dot")]
    pub output: String,

    /// Roster format; inferred from the input extension when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Also render the tree to this PDF file
    #[arg(long)]
    pub pdf: Option<String>,

    /// Overrides the family shuffle seed of the configuration
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
