//! Format detection and row parsing.
//!
//! [`parse_file`] is the single entry point: it picks a parser from the file
//! name, decodes the bytes and returns admitted [`RawRow`]s together with
//! the path that produced them.
//!
//! # Example
//!
//! ```rust
//! use chatlens::config::IngestConfig;
//! use chatlens::parsers::{ParserPath, parse_file};
//!
//! # fn main() -> chatlens::Result<()> {
//! let bytes = b"time,channel,login,body\n2024-01-01 10:00:00,general,alice,hi\n";
//! let parsed = parse_file(bytes, "chat.txt", &IngestConfig::default())?;
//!
//! assert_eq!(parsed.rows.len(), 1);
//! assert_eq!(parsed.path, ParserPath::Structured);
//! # Ok(())
//! # }
//! ```

pub mod delimited;
#[cfg(feature = "spreadsheet")]
pub mod spreadsheet;

pub use delimited::{parse_scanning, parse_structured, parse_text, strip_line_noise};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::IngestConfig;
use crate::error::{ChatlensError, Result};
use crate::format::InputFormat;
use crate::message::RawRow;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Which parser produced the rows of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserPath {
    /// Workbook decoder, first sheet
    Spreadsheet,
    /// csv-crate stage of the text pipeline
    Structured,
    /// Line-scanning fallback of the text pipeline
    Scanning,
}

impl std::fmt::Display for ParserPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserPath::Spreadsheet => write!(f, "spreadsheet"),
            ParserPath::Structured => write!(f, "structured"),
            ParserPath::Scanning => write!(f, "scanning"),
        }
    }
}

/// Rows produced by [`parse_file`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    /// Detected input format
    pub format: InputFormat,
    /// Parser that produced `rows`
    pub path: ParserPath,
    /// Admitted rows in file order (never empty)
    pub rows: Vec<RawRow>,
}

/// Row admission predicate for delimited text.
///
/// A row is admitted when it has message text (`body` or `body_full`), a
/// channel and a login, each with something besides whitespace.
pub fn is_admissible(row: &RawRow) -> bool {
    let has_message = row.has_text("body") || row.has_text("body_full");
    has_message && row.has_text("channel") && row.has_text("login")
}

/// Decodes UTF-8 text, dropping a leading byte-order mark.
pub fn decode_text(bytes: &[u8], format: InputFormat) -> Result<&str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|e| ChatlensError::decode(format.label(), e))
}

/// Parses file bytes into admitted raw rows.
///
/// # Errors
///
/// - [`ChatlensError::UnsupportedFormat`] for an unrecognized extension
/// - [`ChatlensError::Decode`] when the bytes are not UTF-8 text or not a
///   readable workbook
/// - [`ChatlensError::EmptyDataset`] when no row survives parsing
pub fn parse_file(bytes: &[u8], filename: &str, config: &IngestConfig) -> Result<ParsedFile> {
    let format = InputFormat::from_filename(filename)?;
    debug!(filename, %format, size = bytes.len(), "parsing file");

    let (rows, path) = match format {
        InputFormat::Spreadsheet => (read_spreadsheet(bytes, filename)?, ParserPath::Spreadsheet),
        InputFormat::NoisyCsv => {
            let text = decode_text(bytes, format)?;
            let cleaned = strip_line_noise(text, config);
            let out = parse_text(&cleaned, config);
            (out.rows, out.path)
        }
        InputFormat::Text => {
            let text = decode_text(bytes, format)?;
            let out = parse_text(text, config);
            (out.rows, out.path)
        }
    };

    if rows.is_empty() {
        return Err(ChatlensError::empty_dataset(format.label()));
    }

    Ok(ParsedFile { format, path, rows })
}

#[cfg(feature = "spreadsheet")]
fn read_spreadsheet(bytes: &[u8], _filename: &str) -> Result<Vec<RawRow>> {
    spreadsheet::parse_workbook(bytes)
}

#[cfg(not(feature = "spreadsheet"))]
fn read_spreadsheet(_bytes: &[u8], filename: &str) -> Result<Vec<RawRow>> {
    Err(ChatlensError::spreadsheet_disabled(
        crate::format::extension_of(filename),
    ))
}
