//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - top-level arguments with the global verbosity flag
//! - [`Command`] - the `channels`, `view` and `repair` subcommands
//! - [`OutputFormat`] - export format selector
//!
//! # Example
//!
//! ```rust
//! use chatlens::cli::{Args, Command};
//! use clap::Parser;
//!
//! let args = Args::parse_from(["chatlens", "view", "chat.csv", "--search", "hello"]);
//! match args.command {
//!     Command::View(view) => assert_eq!(view.search.as_deref(), Some("hello")),
//!     _ => unreachable!(),
//! }
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::core::models::OutputConfig;

/// Browse, search and export streaming chat logs (CSV, TXT, XLSX).
#[derive(Parser, Debug, Clone)]
#[command(name = "chatlens")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatlens channels chat_messages.csv
    chatlens channels export.xlsx --filter games
    chatlens view chat_messages.csv --channel general --search gg
    chatlens view log.txt --from 2024-01-01 --to 2024-01-31 -o jan.jsonl -f jsonl -t
    chatlens repair broken.csv fixed.csv")]
pub struct Args {
    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List channels with message counts, largest first
    Channels(ChannelsArgs),

    /// Show or export the messages of one channel
    View(ViewArgs),

    /// Rewrite a CSV export whose message text spilled into extra columns
    Repair(RepairArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChannelsArgs {
    /// Path to input file (.csv, .txt, .xlsx, .xls, .xlsm, .xlsb, .ods)
    pub input: String,

    /// Only list channels whose name contains this text
    #[arg(long, value_name = "TERM")]
    pub filter: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ViewArgs {
    /// Path to input file (.csv, .txt, .xlsx, .xls, .xlsm, .xlsb, .ods)
    pub input: String,

    /// Channel to show (default: first channel in the file)
    #[arg(short, long)]
    pub channel: Option<String>,

    /// Case-insensitive text to find in message or username
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only messages on or after this local date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Only messages on or before this local date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Write results to this file instead of printing them
    #[arg(short, long)]
    pub output: Option<String>,

    /// Export format (default: inferred from --output, else csv)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Include timestamps in output
    #[arg(short = 't', long)]
    pub timestamps: bool,

    /// Include message and user IDs in output
    #[arg(long)]
    pub ids: bool,

    /// Include location and reply/mention flags in output
    #[arg(long)]
    pub meta: bool,
}

impl ViewArgs {
    /// Export columns selected by the flags.
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            include_timestamps: self.timestamps,
            include_ids: self.ids,
            include_metadata: self.meta,
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct RepairArgs {
    /// Malformed CSV export
    pub input: String,

    /// Where to write the repaired CSV
    pub output: String,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CSV with semicolon delimiter
    #[default]
    Csv,

    /// JSON array of messages
    Json,

    /// JSON Lines - one JSON object per line
    #[value(alias = "ndjson")]
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::format::OutputFormat::from(*self))
    }
}

// Conversion to library format type
impl From<OutputFormat> for crate::format::OutputFormat {
    fn from(format: OutputFormat) -> crate::format::OutputFormat {
        match format {
            OutputFormat::Csv => crate::format::OutputFormat::Csv,
            OutputFormat::Json => crate::format::OutputFormat::Json,
            OutputFormat::Jsonl => crate::format::OutputFormat::Jsonl,
        }
    }
}
