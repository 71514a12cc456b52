//! Raw row to [`ChatMessage`] normalization.
//!
//! Each canonical field is resolved from a primary source key, then its
//! alternates, then a default:
//!
//! | Field | Source keys | Default |
//! |-------|-------------|---------|
//! | `timestamp` | `time`, `timestamp`, `server_timestamp` | clock |
//! | `message` | `body`, `body_full`, `message` | `""` |
//! | `username` | `login`, `username` | `"Anonymous"` |
//! | `channel` | `channel` | `"unknown"` |
//! | `id` | `msg_id` | `msg_<index>` |

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::message::{ChatMessage, DEFAULT_CHANNEL, DEFAULT_USERNAME, RawRow};
use crate::parsing::parse_timestamp;

/// Source of "now" for rows whose timestamp is missing or unparseable.
///
/// # Example
///
/// ```rust
/// use chatlens::core::normalize::{Clock, fixed_clock};
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let clock: Clock = fixed_clock(at);
/// assert_eq!(clock(), at);
/// ```
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The wall clock.
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// A clock frozen at `at`.
pub fn fixed_clock(at: DateTime<Utc>) -> Clock {
    Arc::new(move || at)
}

/// Strips one leading and one trailing quote character, then trims.
///
/// Single and double quotes are both accepted and do not have to match.
pub fn clean_message_text(text: &str) -> String {
    let is_quote = |c: char| c == '"' || c == '\'';
    let text = text.strip_prefix(is_quote).unwrap_or(text);
    let text = text.strip_suffix(is_quote).unwrap_or(text);
    text.trim().to_string()
}

/// Converts raw rows into canonical messages.
#[derive(Clone)]
pub struct Normalizer {
    clock: Clock,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer").finish_non_exhaustive()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(system_clock())
    }
}

impl Normalizer {
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }

    /// Current time according to this normalizer's clock.
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Resolves a raw timestamp value, falling back to the clock.
    pub fn resolve_timestamp(&self, raw: Option<&str>, index: usize) -> DateTime<Utc> {
        let Some(raw) = raw else {
            return self.now();
        };
        match parse_timestamp(raw) {
            Some(ts) => ts,
            None => {
                warn!(row = index, value = raw, "unparseable timestamp, using current time");
                self.now()
            }
        }
    }

    /// Builds a [`ChatMessage`] from `row`; `index` is the row's position in
    /// the admitted row sequence.
    pub fn normalize(&self, row: RawRow, index: usize) -> ChatMessage {
        let timestamp = self.resolve_timestamp(row.time(), index);
        let message = clean_message_text(row.body().unwrap_or_default());

        let username = match row.login().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_USERNAME.to_string(),
        };
        let channel = match row.channel().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_CHANNEL.to_string(),
        };
        let id = row
            .msg_id()
            .map_or_else(|| format!("msg_{}", index), str::to_string);

        ChatMessage {
            id,
            username,
            message,
            channel,
            timestamp,
            user_id: row.user_id().map(str::to_string),
            country: row.country().map(str::to_string),
            city: row.city().map(str::to_string),
            is_reply: row.flag("is_reply"),
            is_mention: row.flag("is_mention"),
            original: row,
        }
    }

    /// Normalizes rows in order, using each row's position as its index.
    pub fn normalize_all(&self, rows: Vec<RawRow>) -> Vec<ChatMessage> {
        rows.into_iter()
            .enumerate()
            .map(|(index, row)| self.normalize(row, index))
            .collect()
    }
}
