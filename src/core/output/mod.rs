//! Export writers for query results.
//!
//! - [`write_csv`] / [`to_csv`] - CSV with semicolon delimiter - requires `csv-output` feature
//! - [`write_json`] / [`to_json`] - JSON array of messages - requires `json-output` feature
//! - [`write_jsonl`] / [`to_jsonl`] - JSON Lines, one object per line - requires `json-output` feature
//!
//! Timestamps are written in UTC.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "csv-output", feature = "json-output"))]
//! # fn main() -> chatlens::Result<()> {
//! use chatlens::core::output::{to_csv, write_json};
//! use chatlens::core::models::OutputConfig;
//! use chatlens::ChatMessage;
//!
//! let messages = vec![ChatMessage::new("msg_0", "alice", "Hello!", "general")];
//! let config = OutputConfig::new().with_timestamps();
//!
//! write_json(&messages, "result.json", &config)?;
//! let csv_string = to_csv(&messages, &config)?;
//! # Ok(())
//! # }
//! # #[cfg(not(all(feature = "csv-output", feature = "json-output")))]
//! # fn main() {}
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
#[cfg(feature = "json-output")]
mod json_writer;
#[cfg(feature = "json-output")]
mod jsonl_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use json_writer::{to_json, write_json};
#[cfg(feature = "json-output")]
pub use jsonl_writer::{to_jsonl, write_jsonl};

#[cfg(any(feature = "csv-output", feature = "json-output"))]
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One exported message; optional columns follow `OutputConfig`.
#[cfg(feature = "json-output")]
#[derive(serde::Serialize)]
pub(crate) struct ExportRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    channel: &'a str,
    username: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_reply: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_mention: Option<bool>,
}

#[cfg(feature = "json-output")]
impl<'a> ExportRecord<'a> {
    pub(crate) fn new(
        msg: &'a crate::message::ChatMessage,
        config: &crate::core::models::OutputConfig,
    ) -> Self {
        let ids = config.include_ids;
        let meta = config.include_metadata;
        Self {
            id: ids.then_some(msg.id.as_str()),
            timestamp: config
                .include_timestamps
                .then(|| msg.timestamp.format(TIMESTAMP_FORMAT).to_string()),
            channel: &msg.channel,
            username: &msg.username,
            message: &msg.message,
            user_id: if ids { msg.user_id.as_deref() } else { None },
            country: if meta { msg.country.as_deref() } else { None },
            city: if meta { msg.city.as_deref() } else { None },
            is_reply: meta.then_some(msg.is_reply),
            is_mention: meta.then_some(msg.is_mention),
        }
    }
}
