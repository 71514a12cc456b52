//! Canonical chat record and the raw row it is built from.
//!
//! Every input format is first turned into [`RawRow`]s (header name to cell
//! text) and then normalized into [`ChatMessage`]s. Field names in a raw row
//! are kept exactly as they appear in the source header, so the same file can
//! carry `body`, `body_full` or `message` depending on the exporter.
//!
//! # Examples
//!
//! ```
//! use chatlens::ChatMessage;
//!
//! let msg = ChatMessage::new("msg_0", "alice", "hello chat", "general");
//! assert_eq!(msg.username(), "alice");
//! assert!(msg.has_identity());
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Username used when the source row names no user.
pub const DEFAULT_USERNAME: &str = "Anonymous";

/// Channel used when the source row names no channel.
pub const DEFAULT_CHANNEL: &str = "unknown";

/// An unvalidated row straight from file parsing.
///
/// Keys are case-sensitive header names. Rows of one file do not have to
/// share the same key set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the raw value for `key`, if the column exists in this row.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns the value for `key` only when it is a non-empty string.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Returns the first non-empty value among `keys`, in order.
    pub fn first_non_empty(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.non_empty(key))
    }

    /// Returns `true` when `key` holds something other than whitespace.
    pub fn has_text(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over `(key, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // =========================================================================
    // Canonical field accessors
    // =========================================================================

    /// Raw timestamp text: `time`, then `timestamp`, then `server_timestamp`.
    pub fn time(&self) -> Option<&str> {
        self.first_non_empty(&["time", "timestamp", "server_timestamp"])
    }

    /// Raw message text: `body`, then `body_full`, then `message`.
    pub fn body(&self) -> Option<&str> {
        self.first_non_empty(&["body", "body_full", "message"])
    }

    /// Raw user name: `login`, then `username`.
    pub fn login(&self) -> Option<&str> {
        self.first_non_empty(&["login", "username"])
    }

    pub fn channel(&self) -> Option<&str> {
        self.non_empty("channel")
    }

    pub fn msg_id(&self) -> Option<&str> {
        self.non_empty("msg_id")
    }

    pub fn user_id(&self) -> Option<&str> {
        self.non_empty("user_id")
    }

    pub fn country(&self) -> Option<&str> {
        self.non_empty("country")
    }

    pub fn city(&self) -> Option<&str> {
        self.non_empty("city")
    }

    /// `true` only for the literal strings `t` or `true`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("t" | "true"))
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A normalized chat record.
///
/// Built by [`Normalizer::normalize`](crate::core::normalize::Normalizer::normalize).
/// `id` is unique within one load only.
///
/// # Serialization
///
/// Optional fields are omitted from JSON when `None`; `original` is never
/// serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Source `msg_id`, or `msg_<index>` when the row has none.
    pub id: String,

    /// Author login, `"Anonymous"` when absent.
    pub username: String,

    /// Trimmed message text with one layer of wrapping quotes removed.
    pub message: String,

    /// Channel name, `"unknown"` when absent.
    pub channel: String,

    /// When the message was sent.
    ///
    /// Falls back to the load's clock when the source value is missing or
    /// unparseable, in which case ordering against other records is not
    /// meaningful.
    pub timestamp: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub is_reply: bool,

    #[serde(default)]
    pub is_mention: bool,

    /// The row this record was built from.
    #[serde(skip)]
    pub original: RawRow,
}

impl ChatMessage {
    /// Creates a message with the current time and no optional metadata.
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        message: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            message: message.into(),
            channel: channel.into(),
            timestamp: Utc::now(),
            user_id: None,
            country: None,
            city: None,
            is_reply: false,
            is_mention: false,
            original: RawRow::new(),
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    #[must_use]
    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = ts;
        self
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, country: impl Into<String>, city: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self.city = Some(city.into());
        self
    }

    #[must_use]
    pub fn with_flags(mut self, is_reply: bool, is_mention: bool) -> Self {
        self.is_reply = is_reply;
        self.is_mention = is_mention;
        self
    }

    #[must_use]
    pub fn with_original(mut self, row: RawRow) -> Self {
        self.original = row;
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    // =========================================================================
    // Validation helpers
    // =========================================================================

    /// Returns `true` if the username is set and not the default.
    pub fn has_real_username(&self) -> bool {
        !self.username.is_empty() && self.username != DEFAULT_USERNAME
    }

    /// Returns `true` if the channel is set and not the default.
    pub fn has_real_channel(&self) -> bool {
        !self.channel.is_empty() && self.channel != DEFAULT_CHANNEL
    }

    /// Returns `true` if at least one of user or channel was recovered.
    pub fn has_identity(&self) -> bool {
        self.has_real_username() || self.has_real_channel()
    }

    /// Returns `true` if the text is empty or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.message.trim().is_empty()
    }
}
