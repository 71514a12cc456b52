//! # Chatlens
//!
//! A Rust library for loading exported streaming-chat logs and browsing them
//! by channel, text and date.
//!
//! ## Overview
//!
//! Chat exports arrive in several shapes:
//! - **CSV** exports with stray semicolons trailing every line
//! - **TXT** delimited text, possibly mixing comma and semicolon rows or
//!   repeating its header
//! - **Spreadsheets** (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`), first sheet
//!
//! Chatlens turns any of these into one canonical [`ChatMessage`] per row,
//! drops rows with no usable content, groups the rest by channel in time
//! order and answers search and date-range queries over a channel.
//!
//! ## Quick Start
//!
//! ```rust
//! use chatlens::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let text = "time,channel,login,body\n\
//!                 2024-03-01 18:00:00,speedruns,alice,gg\n\
//!                 2024-03-01 18:00:05,speedruns,bob,\"what a run, wow\"\n";
//!
//!     let session = ChatSession::default();
//!     let dataset = session.load(text.as_bytes(), "chat_messages.txt")?;
//!
//!     assert_eq!(dataset.channels()[0].name, "speedruns");
//!
//!     let filter = QueryFilter::new().with_search("WOW").with_date_from("2024-03-01")?;
//!     let hits = session.query("speedruns", &filter);
//!     assert_eq!(hits.len(), 1);
//!     assert_eq!(hits[0].username, "bob");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`parsing`] - Line splitter and timestamp decoding
//! - [`parsers`] - Format detection and row parsing ([`parse_file`](parsers::parse_file))
//! - [`core`] - Normalization, validation, grouping, queries, export, repair
//!   - [`core::dataset`] - [`Dataset`](core::Dataset), [`load`](core::load)
//!   - [`core::filter`] - [`QueryFilter`](core::QueryFilter), [`query`](core::query)
//!   - [`core::session`] - [`ChatSession`](core::ChatSession)
//!   - [`core::output`] - CSV, JSON and JSONL writers
//! - [`config`] - [`IngestConfig`](config::IngestConfig)
//! - [`format`] - Input and output format types
//! - [`error`] - Unified error types ([`ChatlensError`], [`Result`])
//! - [`prelude`] - Convenient re-exports
//!
//! ## Logging
//!
//! The library reports progress through [`tracing`] and never installs a
//! subscriber itself.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod message;
pub mod parsers;
pub mod parsing;

// Re-export the main types at the crate root for convenience
pub use error::{ChatlensError, Result};
pub use message::{ChatMessage, RawRow};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatlens::prelude::*;
/// ```
pub mod prelude {
    // Records
    pub use crate::message::{ChatMessage, RawRow};

    // Error types
    pub use crate::error::{ChatlensError, Result};

    // Configuration
    pub use crate::config::IngestConfig;
    pub use crate::core::models::OutputConfig;

    // Formats
    pub use crate::format::{InputFormat, OutputFormat, to_format_string, write_to_format};

    // Parsing
    pub use crate::parsers::{ParserPath, parse_file};

    // Pipeline and queries
    pub use crate::core::{
        ChannelSummary, ChatSession, Clock, Dataset, LoadReport, QueryFilter, fixed_clock,
        is_highlighted, load, query, system_clock,
    };

    // Repair
    pub use crate::core::{TWITCH_EXPORT_HEADERS, repair_columns};

    // Output (file writers and string converters)
    #[cfg(feature = "csv-output")]
    pub use crate::core::output::{to_csv, write_csv};
    #[cfg(feature = "json-output")]
    pub use crate::core::output::{to_json, to_jsonl, write_json, write_jsonl};
}
