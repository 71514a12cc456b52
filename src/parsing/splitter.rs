//! Delimiter-aware line splitter.
//!
//! Splits one line of delimited text into fields. Double quotes group text
//! (the delimiter is literal inside them), a doubled quote inside a quoted
//! span is an escaped literal quote, and an unterminated quote simply runs
//! to the end of the line.
//!
//! The delimiter is detected per line, so a file that mixes comma and
//! semicolon separated rows still splits every row on its own separator.
//!
//! ```
//! use chatlens::parsing::LineSplitter;
//!
//! let splitter = LineSplitter::default();
//! let fields = splitter.split_auto(r#"2024-01-01,general,"say ""hi"" now";;"#);
//! assert_eq!(fields, vec!["2024-01-01", "general", "say \"hi\" now"]);
//! ```

use crate::config::IngestConfig;

/// Delimiter used when a line has no clear majority.
pub const DEFAULT_DELIMITER: char = ',';

const QUOTE: char = '"';

/// Picks the delimiter for one line.
///
/// Counts commas and semicolons outside quoted spans. Semicolon wins only
/// when it is strictly more frequent; ties and empty lines give a comma.
pub fn detect_delimiter(line: &str) -> char {
    let mut commas = 0usize;
    let mut semicolons = 0usize;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            QUOTE => in_quotes = !in_quotes,
            ',' if !in_quotes => commas += 1,
            ';' if !in_quotes => semicolons += 1,
            _ => {}
        }
    }

    if semicolons > commas {
        ';'
    } else {
        DEFAULT_DELIMITER
    }
}

/// Removes exactly one pair of enclosing double quotes.
pub fn strip_enclosing_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with(QUOTE) && s.ends_with(QUOTE) {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Splits lines into cleaned fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSplitter {
    trailing_noise: char,
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new(';')
    }
}

impl LineSplitter {
    /// Creates a splitter that strips runs of `trailing_noise` from field tails.
    pub fn new(trailing_noise: char) -> Self {
        Self { trailing_noise }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(config.trailing_noise)
    }

    /// Splits `line` on `delimiter`.
    ///
    /// Always returns at least one field; an empty line yields `[""]`.
    pub fn split(&self, line: &str, delimiter: char) -> Vec<String> {
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = line.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch == QUOTE {
                if in_quotes && chars.peek() == Some(&QUOTE) {
                    current.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            } else if ch == delimiter && !in_quotes {
                fields.push(self.finish_field(&current));
                current.clear();
            } else {
                current.push(ch);
            }
        }
        fields.push(self.finish_field(&current));

        fields
    }

    /// Detects the delimiter for `line`, then splits on it.
    pub fn split_auto(&self, line: &str) -> Vec<String> {
        self.split(line, detect_delimiter(line))
    }

    fn finish_field(&self, raw: &str) -> String {
        let unquoted = strip_enclosing_quotes(raw.trim());
        unquoted.trim_end_matches(self.trailing_noise).to_string()
    }
}
