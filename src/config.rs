//! Configuration types for ingestion.
//!
//! This module provides plain configuration structs for library usage,
//! without any CLI framework dependencies.
//!
//! # Example
//!
//! ```rust
//! use chatlens::config::IngestConfig;
//!
//! let config = IngestConfig::new()
//!     .with_header_scan_lines(10)
//!     .with_trailing_noise(';');
//!
//! assert_eq!(config.header_scan_lines, 10);
//! ```

use serde::{Deserialize, Serialize};

/// Keywords a header line must contain (case-insensitive substrings).
pub const DEFAULT_HEADER_KEYWORDS: &[&str] = &["time", "channel", "login", "body"];

/// Configuration for turning file bytes into raw rows.
///
/// The defaults match the chat exports this crate was built for: comma
/// separated, double-quoted, with stray semicolons trailing lines and cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Character stripped from the tail of lines and fields (default: `;`)
    pub trailing_noise: char,

    /// How many leading lines the scanning parser searches for a header (default: 5)
    pub header_scan_lines: usize,

    /// Substrings that identify a header line (default: time, channel, login, body)
    pub header_keywords: Vec<String>,

    /// Try the csv-crate parser before the scanning parser (default: true)
    pub structured_first: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            trailing_noise: ';',
            header_scan_lines: 5,
            header_keywords: DEFAULT_HEADER_KEYWORDS
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
            structured_first: true,
        }
    }
}

impl IngestConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the trailing-noise character.
    #[must_use]
    pub fn with_trailing_noise(mut self, ch: char) -> Self {
        self.trailing_noise = ch;
        self
    }

    /// Sets how many leading lines are searched for a header.
    #[must_use]
    pub fn with_header_scan_lines(mut self, lines: usize) -> Self {
        self.header_scan_lines = lines;
        self
    }

    /// Replaces the header keyword set.
    #[must_use]
    pub fn with_header_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables the csv-crate stage.
    #[must_use]
    pub fn with_structured_first(mut self, enabled: bool) -> Self {
        self.structured_first = enabled;
        self
    }

    /// Returns `true` if `line` contains every header keyword.
    ///
    /// Matching is case-insensitive. An empty keyword set never matches, so
    /// the scanning parser falls back to line 0.
    pub fn is_header_line(&self, line: &str) -> bool {
        if self.header_keywords.is_empty() {
            return false;
        }
        let lower = line.to_lowercase();
        self.header_keywords
            .iter()
            .all(|k| lower.contains(&k.to_lowercase()))
    }

    /// Returns `true` if the split `cells` of a record look like a header.
    ///
    /// Every keyword must appear in its own cell, so a single message that
    /// happens to mention all of them is still data.
    pub fn is_header_record<'a, I>(&self, cells: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.header_keywords.is_empty() {
            return false;
        }
        let cells: Vec<String> = cells.into_iter().map(str::to_lowercase).collect();
        let mut used = vec![false; cells.len()];
        self.header_keywords.iter().all(|keyword| {
            let keyword = keyword.to_lowercase();
            let hit = cells
                .iter()
                .enumerate()
                .position(|(i, cell)| !used[i] && cell.contains(&keyword));
            match hit {
                Some(i) => {
                    used[i] = true;
                    true
                }
                None => false,
            }
        })
    }

    /// Removes a trailing run of the noise character.
    pub fn strip_noise<'a>(&self, s: &'a str) -> &'a str {
        s.trim_end_matches(self.trailing_noise)
    }
}
