//! Query a channel by text and date range.
//!
//! This module provides [`QueryFilter`] for defining the criteria and
//! [`query`] for running them against a [`Dataset`].
//!
//! # Filter Types
//!
//! | Filter | Method | Description |
//! |--------|--------|-------------|
//! | Search | [`with_search`](QueryFilter::with_search) | Text in message or username |
//! | Date from | [`with_date_from`](QueryFilter::with_date_from) | On or after local midnight of the date |
//! | Date to | [`with_date_to`](QueryFilter::with_date_to) | On or before 23:59:59.999 local of the date |
//!
//! # Examples
//!
//! ```
//! use chatlens::config::IngestConfig;
//! use chatlens::core::dataset::load;
//! use chatlens::core::filter::{QueryFilter, query};
//! use chatlens::core::normalize::system_clock;
//!
//! # fn main() -> chatlens::Result<()> {
//! let text = "time,channel,login,body\n\
//!             2024-06-01 09:00:00,general,alice,Hello world\n\
//!             2024-06-02 09:00:00,general,bob,goodbye\n";
//! let dataset = load(text.as_bytes(), "chat.txt", &IngestConfig::default(), system_clock())?;
//!
//! let filter = QueryFilter::new().with_search("HELLO").with_date_from("2024-06-01")?;
//! let hits = query(&dataset, "general", &filter);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].username(), "alice");
//! # Ok(())
//! # }
//! ```
//!
//! # Behavior Notes
//!
//! - Matching is case-insensitive (Unicode lowercase)
//! - An unknown channel yields an empty result, not an error
//! - Filters are combined with AND logic; results keep the channel's
//!   ascending timestamp order

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::dataset::Dataset;
use crate::error::ChatlensError;
use crate::message::ChatMessage;
use crate::parsing::local_to_utc;

/// Search and date criteria for [`query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    /// Lowercased search term; `None` or empty means no text filter.
    pub search: Option<String>,

    /// Include only messages on or after this instant.
    pub from: Option<DateTime<Utc>>,

    /// Include only messages on or before this instant.
    pub to: Option<DateTime<Utc>>,
}

impl QueryFilter {
    /// Creates a filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search term (case-insensitive substring of message or username).
    #[must_use]
    pub fn with_search(mut self, term: impl AsRef<str>) -> Self {
        let term = term.as_ref().to_lowercase();
        self.search = if term.is_empty() { None } else { Some(term) };
        self
    }

    /// Sets the start bound from a `YYYY-MM-DD` date (local midnight, inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::InvalidDate`] if the format is invalid.
    pub fn with_date_from(self, date_str: &str) -> Result<Self, ChatlensError> {
        Ok(self.with_from_date(parse_date(date_str)?))
    }

    /// Sets the end bound from a `YYYY-MM-DD` date (23:59:59.999 local, inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::InvalidDate`] if the format is invalid.
    pub fn with_date_to(self, date_str: &str) -> Result<Self, ChatlensError> {
        Ok(self.with_to_date(parse_date(date_str)?))
    }

    #[must_use]
    pub fn with_from_date(mut self, date: NaiveDate) -> Self {
        self.from = Some(start_of_local_day(date));
        self
    }

    #[must_use]
    pub fn with_to_date(mut self, date: NaiveDate) -> Self {
        self.to = Some(end_of_local_day(date));
        self
    }

    /// Returns `true` if any filter is active.
    pub fn is_active(&self) -> bool {
        self.search.is_some() || self.has_date_filter()
    }

    pub fn has_date_filter(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Returns `true` if `msg` passes every active filter.
    pub fn matches(&self, msg: &ChatMessage) -> bool {
        if let Some(ref term) = self.search {
            let in_text = msg.message.to_lowercase().contains(term.as_str());
            if !in_text && !msg.username.to_lowercase().contains(term.as_str()) {
                return false;
            }
        }
        if self.from.is_some_and(|from| msg.timestamp < from) {
            return false;
        }
        if self.to.is_some_and(|to| msg.timestamp > to) {
            return false;
        }
        true
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate, ChatlensError> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|_| ChatlensError::invalid_date(date_str))
}

/// Local midnight of `date`, as UTC.
///
/// If midnight does not exist locally (DST gap), the date's UTC midnight
/// is used.
pub fn start_of_local_day(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    local_to_utc(naive).unwrap_or_else(|| naive.and_utc())
}

/// 23:59:59.999 local on `date`, as UTC.
pub fn end_of_local_day(date: NaiveDate) -> DateTime<Utc> {
    let naive = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN));
    local_to_utc(naive).unwrap_or_else(|| naive.and_utc())
}

/// Runs `filter` over one channel of `dataset`.
///
/// The result keeps the channel's ascending timestamp order. An unknown
/// channel gives an empty vector.
pub fn query<'a>(dataset: &'a Dataset, channel: &str, filter: &QueryFilter) -> Vec<&'a ChatMessage> {
    let messages = dataset.channel_messages(channel);
    if !filter.is_active() {
        return messages;
    }
    messages.into_iter().filter(|msg| filter.matches(msg)).collect()
}

/// Returns `true` when `message` contains `term`, ignoring case.
///
/// Used by renderers to mark search hits. An empty term never highlights.
pub fn is_highlighted(message: &str, term: &str) -> bool {
    !term.is_empty() && message.to_lowercase().contains(&term.to_lowercase())
}
