//! Core processing logic for chatlens.
//!
//! This module contains:
//! - [`normalize`] - Raw rows to canonical messages, clock injection
//! - [`dataset`] - Validation, channel grouping and the [`load`] pipeline
//! - [`filter`] - Search and date-range queries
//! - [`session`] - The current dataset of a browsing session
//! - [`models`] - Export configuration
//! - [`output`] - Export writers (CSV, JSON, JSONL)
//! - [`processor`] - Column repair for malformed exports
//!
//! # Quick Start
//!
//! ```rust
//! use chatlens::core::{ChatSession, QueryFilter};
//!
//! # fn main() -> chatlens::Result<()> {
//! let session = ChatSession::default();
//! let bytes = b"time,channel,login,body\n2024-01-01 10:00:00,general,alice,hi\n";
//! session.load(bytes, "chat.txt")?;
//!
//! let hits = session.query("general", &QueryFilter::new().with_search("hi"));
//! assert_eq!(hits.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod filter;
pub mod models;
pub mod normalize;
pub mod output;
pub mod processor;
pub mod session;

pub use dataset::{
    ChannelIndex, ChannelSummary, Dataset, DatasetStats, LoadReport, is_valid, load,
};
pub use filter::{QueryFilter, is_highlighted, query};
pub use models::OutputConfig;
pub use normalize::{Clock, Normalizer, clean_message_text, fixed_clock, system_clock};
pub use processor::{RepairStats, TWITCH_EXPORT_HEADERS, repair_columns, repair_file};
pub use session::ChatSession;

#[cfg(feature = "csv-output")]
pub use output::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use output::{to_json, to_jsonl, write_json, write_jsonl};
