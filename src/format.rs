//! Input and output format types.
//!
//! [`InputFormat`] decides how a loaded file is parsed, purely from its file
//! name. [`OutputFormat`] selects the writer used to export query results.
//!
//! # Example
//!
//! ```rust
//! use chatlens::format::{InputFormat, OutputFormat};
//!
//! assert_eq!(InputFormat::from_filename("chat.txt").unwrap(), InputFormat::Text);
//! assert_eq!(InputFormat::from_filename("Export.CSV").unwrap(), InputFormat::NoisyCsv);
//! assert!(InputFormat::from_filename("notes.pdf").is_err());
//!
//! let format = OutputFormat::from_path("result.jsonl").unwrap();
//! assert_eq!(format, OutputFormat::Jsonl);
//! ```

use serde::{Deserialize, Serialize};

use crate::core::models::OutputConfig;
use crate::error::ChatlensError;
use crate::message::ChatMessage;

/// Extensions read through the spreadsheet decoder.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "xlsb", "ods"];

/// Returns the lowercased extension of `filename` without the dot.
///
/// A name without a dot (or ending in one) has an empty extension.
pub fn extension_of(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// How a file's bytes are turned into raw rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Plain delimited text (`.txt`)
    Text,

    /// Comma separated export with trailing semicolons on every line (`.csv`)
    ///
    /// Lines are stripped of the trailing-noise run before being parsed as
    /// plain delimited text.
    NoisyCsv,

    /// Workbook; only the first sheet is read
    /// (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`)
    Spreadsheet,
}

impl InputFormat {
    /// Detects the input format from a file name.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::UnsupportedFormat`] for any other extension.
    pub fn from_filename(filename: &str) -> Result<Self, ChatlensError> {
        let ext = extension_of(filename);
        match ext.as_str() {
            "txt" => Ok(InputFormat::Text),
            "csv" => Ok(InputFormat::NoisyCsv),
            e if SPREADSHEET_EXTENSIONS.contains(&e) => Ok(InputFormat::Spreadsheet),
            _ => Err(ChatlensError::unsupported_format(ext)),
        }
    }

    /// Short human-readable name used in messages and logs.
    pub fn label(&self) -> &'static str {
        match self {
            InputFormat::Text => "TXT",
            InputFormat::NoisyCsv => "CSV",
            InputFormat::Spreadsheet => "spreadsheet",
        }
    }

    /// Returns `true` for the two delimited-text formats.
    pub fn is_text(&self) -> bool {
        matches!(self, InputFormat::Text | InputFormat::NoisyCsv)
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Output format for exported query results.
///
/// - [`Csv`](OutputFormat::Csv) - semicolon delimited, opens directly in spreadsheets
/// - [`Json`](OutputFormat::Json) - one JSON array
/// - [`Jsonl`](OutputFormat::Jsonl) - one JSON object per line
///
/// # Example
///
/// ```rust
/// use chatlens::format::OutputFormat;
/// use std::str::FromStr;
///
/// let format = OutputFormat::from_str("ndjson").unwrap();
/// assert_eq!(format, OutputFormat::Jsonl);
/// assert_eq!(format.extension(), "jsonl");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// CSV with semicolon delimiter (default)
    #[default]
    Csv,

    /// JSON array of messages
    Json,

    /// JSON Lines - one JSON object per line
    Jsonl,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        }
    }

    /// Returns all accepted format names.
    pub fn all_names() -> &'static [&'static str] {
        &["csv", "json", "jsonl", "ndjson"]
    }

    /// Returns all available formats.
    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Csv, OutputFormat::Json, OutputFormat::Jsonl]
    }

    /// Detects format from a file path based on extension.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatlens::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::from_path("out/result.JSON").unwrap(), OutputFormat::Json);
    /// assert!(OutputFormat::from_path("result.txt").is_err());
    /// ```
    pub fn from_path(path: &str) -> Result<Self, ChatlensError> {
        let ext = extension_of(path);

        match ext.as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(ChatlensError::invalid_format(
                "output",
                format!(
                    "Unknown file extension: '.{}'. Expected one of: csv, json, jsonl",
                    ext
                ),
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "CSV"),
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}

fn missing_feature(format: OutputFormat) -> ChatlensError {
    let feature = match format {
        OutputFormat::Csv => "csv-output",
        OutputFormat::Json | OutputFormat::Jsonl => "json-output",
    };
    ChatlensError::invalid_format(
        "output",
        format!(
            "Output format {} requires the '{}' feature to be enabled",
            format, feature
        ),
    )
}

/// Writes messages to a file in the specified format.
///
/// # Errors
///
/// Returns an error if the format's feature is disabled or the file cannot
/// be written.
#[allow(unused_variables)]
pub fn write_to_format(
    messages: &[ChatMessage],
    path: &str,
    format: OutputFormat,
    config: &OutputConfig,
) -> Result<(), ChatlensError> {
    match format {
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::write_csv(messages, path, config),
        #[cfg(feature = "json-output")]
        OutputFormat::Json => crate::core::output::write_json(messages, path, config),
        #[cfg(feature = "json-output")]
        OutputFormat::Jsonl => crate::core::output::write_jsonl(messages, path, config),
        #[allow(unreachable_patterns)]
        _ => Err(missing_feature(format)),
    }
}

/// Converts messages to a string in the specified format.
#[allow(unused_variables)]
pub fn to_format_string(
    messages: &[ChatMessage],
    format: OutputFormat,
    config: &OutputConfig,
) -> Result<String, ChatlensError> {
    match format {
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::to_csv(messages, config),
        #[cfg(feature = "json-output")]
        OutputFormat::Json => crate::core::output::to_json(messages, config),
        #[cfg(feature = "json-output")]
        OutputFormat::Jsonl => crate::core::output::to_jsonl(messages, config),
        #[allow(unreachable_patterns)]
        _ => Err(missing_feature(format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_input_format_from_filename() {
        assert_eq!(InputFormat::from_filename("a.txt").unwrap(), InputFormat::Text);
        assert_eq!(InputFormat::from_filename("a.csv").unwrap(), InputFormat::NoisyCsv);
        assert_eq!(InputFormat::from_filename("A.XLSX").unwrap(), InputFormat::Spreadsheet);
        assert_eq!(InputFormat::from_filename("a.ods").unwrap(), InputFormat::Spreadsheet);
        assert_eq!(
            InputFormat::from_filename("dir.v2/export.xls").unwrap(),
            InputFormat::Spreadsheet
        );
    }

    #[test]
    fn test_input_format_rejects_unknown() {
        let err = InputFormat::from_filename("notes.pdf").unwrap_err();
        assert!(err.is_unsupported_format());
        assert!(err.to_string().contains("pdf"));

        assert!(InputFormat::from_filename("README").is_err());
        assert!(InputFormat::from_filename("archive.csv.gz").is_err());
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.b.CSV"), "csv");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of("dir.d/noext"), "");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn test_input_format_label() {
        assert_eq!(InputFormat::NoisyCsv.to_string(), "CSV");
        assert!(InputFormat::Text.is_text());
        assert!(!InputFormat::Spreadsheet.is_text());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("csv").unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("ndjson").unwrap(), OutputFormat::Jsonl);
        assert!(OutputFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path("o.csv").unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path("o.ndjson").unwrap(), OutputFormat::Jsonl);
        let err = OutputFormat::from_path("o.txt").unwrap_err();
        assert!(err.is_invalid_format());
    }

    #[test]
    fn test_output_format_defaults_and_serde() {
        assert_eq!(OutputFormat::default(), OutputFormat::Csv);
        assert_eq!(OutputFormat::all().len(), 3);
        assert_eq!(serde_json::to_string(&OutputFormat::Jsonl).unwrap(), "\"jsonl\"");
        assert_eq!(
            serde_json::to_string(&InputFormat::NoisyCsv).unwrap(),
            "\"noisy_csv\""
        );
    }
}
