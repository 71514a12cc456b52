//! Validation, channel grouping and the loaded dataset.
//!
//! [`load`] runs the whole pipeline over one file: parse, normalize, drop
//! invalid messages, group by channel. The result is an immutable
//! [`Dataset`]; a new file always produces a new dataset.
//!
//! # Example
//!
//! ```rust
//! use chatlens::config::IngestConfig;
//! use chatlens::core::dataset::load;
//! use chatlens::core::normalize::system_clock;
//!
//! # fn main() -> chatlens::Result<()> {
//! let text = "time,channel,login,body\n\
//!             2024-01-01 10:00:00,general,alice,hi\n\
//!             2024-01-01 10:01:00,random,bob,yo\n";
//! let dataset = load(text.as_bytes(), "chat.txt", &IngestConfig::default(), system_clock())?;
//!
//! assert_eq!(dataset.len(), 2);
//! assert_eq!(dataset.first_channel(), Some("general"));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::normalize::{Clock, Normalizer};
use crate::config::IngestConfig;
use crate::error::{ChatlensError, Result};
use crate::format::InputFormat;
use crate::message::ChatMessage;
use crate::parsers::{ParserPath, parse_file};

/// Post-normalization validation predicate.
///
/// A message is kept when its text is non-blank and at least one of user or
/// channel is real (not empty and not the default).
pub fn is_valid(msg: &ChatMessage) -> bool {
    !msg.is_empty() && (msg.has_real_username() || msg.has_real_channel())
}

// ============================================================================
// Channel index
// ============================================================================

/// Messages bucketed by channel, each bucket ascending by timestamp.
///
/// Buckets hold positions into the dataset's message list. Channels are kept
/// in the order they first appear in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelIndex {
    order: Vec<String>,
    buckets: HashMap<String, Vec<usize>>,
}

impl ChannelIndex {
    /// Groups `messages` by channel and stable-sorts each bucket by time.
    pub fn build(messages: &[ChatMessage]) -> Self {
        let mut order = Vec::new();
        let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();

        for (pos, msg) in messages.iter().enumerate() {
            buckets
                .entry(msg.channel.clone())
                .or_insert_with(|| {
                    order.push(msg.channel.clone());
                    Vec::new()
                })
                .push(pos);
        }

        for bucket in buckets.values_mut() {
            bucket.sort_by_key(|&pos| messages[pos].timestamp);
        }

        Self { order, buckets }
    }

    /// Positions for `channel` in timestamp order.
    pub fn get(&self, channel: &str) -> Option<&[usize]> {
        self.buckets.get(channel).map(Vec::as_slice)
    }

    /// Channel names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.buckets.contains_key(channel)
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ============================================================================
// Dataset
// ============================================================================

/// A channel and how many messages it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub name: String,
    pub count: usize,
}

/// Totals shown for a loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_messages: usize,
    pub total_channels: usize,
}

/// What happened during one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub format: InputFormat,
    pub path: ParserPath,
    /// Rows that passed parsing and admission
    pub rows_admitted: usize,
    /// Messages that passed validation
    pub messages_kept: usize,
    /// Messages dropped by validation
    pub messages_rejected: usize,
    pub channels: usize,
}

/// The in-memory result of loading one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    messages: Vec<ChatMessage>,
    index: ChannelIndex,
    report: LoadReport,
}

impl Dataset {
    /// Validates and groups normalized messages.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::EmptyDataset`] when no message is valid.
    pub fn from_messages(
        messages: Vec<ChatMessage>,
        format: InputFormat,
        path: ParserPath,
    ) -> Result<Self> {
        let rows_admitted = messages.len();
        let kept: Vec<ChatMessage> = messages.into_iter().filter(is_valid).collect();
        let messages_rejected = rows_admitted - kept.len();
        if messages_rejected > 0 {
            debug!(rejected = messages_rejected, "validation dropped messages");
        }

        if kept.is_empty() {
            return Err(ChatlensError::empty_dataset(format.label()));
        }

        let index = ChannelIndex::build(&kept);
        let report = LoadReport {
            format,
            path,
            rows_admitted,
            messages_kept: kept.len(),
            messages_rejected,
            channels: index.len(),
        };

        Ok(Self {
            messages: kept,
            index,
            report,
        })
    }

    /// All kept messages in file order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn index(&self) -> &ChannelIndex {
        &self.index
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Messages of `channel` in ascending timestamp order; empty when the
    /// channel does not exist.
    pub fn channel_messages(&self, channel: &str) -> Vec<&ChatMessage> {
        self.index
            .get(channel)
            .map(|positions| positions.iter().map(|&pos| &self.messages[pos]).collect())
            .unwrap_or_default()
    }

    /// Channels with their message counts, largest first.
    ///
    /// Channels with equal counts keep their first-seen order.
    pub fn channels(&self) -> Vec<ChannelSummary> {
        let mut list: Vec<ChannelSummary> = self
            .index
            .names()
            .map(|name| ChannelSummary {
                name: name.to_string(),
                count: self.index.get(name).map_or(0, <[usize]>::len),
            })
            .collect();
        list.sort_by(|a, b| b.count.cmp(&a.count));
        list
    }

    /// [`channels`](Self::channels) restricted to names containing `term`,
    /// ignoring case. An empty term keeps every channel.
    pub fn filter_channels(&self, term: &str) -> Vec<ChannelSummary> {
        let needle = term.to_lowercase();
        self.channels()
            .into_iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// The channel that appeared first in the file.
    pub fn first_channel(&self) -> Option<&str> {
        self.index.names().next()
    }

    /// Earliest and latest timestamp across all messages.
    pub fn date_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let earliest = self.messages.iter().map(|m| m.timestamp).min()?;
        let latest = self.messages.iter().map(|m| m.timestamp).max()?;
        Some((earliest, latest))
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            total_messages: self.messages.len(),
            total_channels: self.index.len(),
        }
    }
}

/// Loads one file: parse, normalize, validate, group.
///
/// `clock` supplies the timestamp for rows whose time cannot be parsed.
///
/// # Errors
///
/// Any error of [`parse_file`], plus [`ChatlensError::EmptyDataset`] when
/// every admitted row fails validation.
pub fn load(bytes: &[u8], filename: &str, config: &IngestConfig, clock: Clock) -> Result<Dataset> {
    let parsed = parse_file(bytes, filename, config)?;
    let normalizer = Normalizer::new(clock);
    let messages = normalizer.normalize_all(parsed.rows);
    let dataset = Dataset::from_messages(messages, parsed.format, parsed.path)?;

    let report = dataset.report();
    info!(
        filename,
        path = %report.path,
        rows = report.rows_admitted,
        messages = report.messages_kept,
        channels = report.channels,
        "loaded chat log"
    );
    Ok(dataset)
}
