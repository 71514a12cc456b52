//! Unified error types for chatlens.
//!
//! This module provides a single [`ChatlensError`] enum that covers every
//! way a load, query or export can fail. Malformed rows and unparseable
//! timestamps are not errors: the ingestion pipeline drops or defaults them
//! silently and only whole-file failures surface here.
//!
//! # Load failures
//!
//! - [`ChatlensError::UnsupportedFormat`] - the file extension is not one of
//!   the recognized delimited-text or spreadsheet formats
//! - [`ChatlensError::Decode`] - the bytes could not be turned into text or
//!   a table (bad UTF-8, corrupt workbook)
//! - [`ChatlensError::EmptyDataset`] - parsing worked but no usable row survived

use std::io;

use thiserror::Error;

/// A specialized [`Result`] type for chatlens operations.
///
/// # Example
///
/// ```rust
/// use chatlens::error::Result;
/// use chatlens::ChatMessage;
///
/// fn my_function() -> Result<Vec<ChatMessage>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatlensError>;

/// The error type for all chatlens operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatlensError {
    /// An I/O error occurred.
    ///
    /// The ingestion core never touches the filesystem; this comes from
    /// file helpers, the export writers and the CLI.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The file extension is not a recognized input format.
    #[error("Unsupported file format '{extension}'. {hint}")]
    UnsupportedFormat {
        /// Lowercased extension without the dot (may be empty)
        extension: String,
        /// What the caller can do about it
        hint: &'static str,
    },

    /// Parsing succeeded structurally but produced no usable rows.
    #[error("No valid data found in the {format} file. Please check the file format.")]
    EmptyDataset {
        /// Human-readable input format name (e.g. "CSV", "XLSX")
        format: &'static str,
    },

    /// The underlying byte-to-text or table decoder failed.
    #[error("Failed to decode {format} file: {source}")]
    Decode {
        /// Human-readable input format name
        format: &'static str,
        /// The decoder's own error
        #[source]
        source: DecodeErrorKind,
    },

    /// An output format name or extension was not recognized.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// Which side the format belongs to (e.g. "output")
        format: &'static str,
        /// Details about the error
        message: String,
    },

    /// Invalid date in a query bound.
    ///
    /// Date bounds expect YYYY-MM-DD format.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// CSV error while writing exported messages.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error while writing exported messages.
    #[cfg(feature = "json-output")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kinds of decoder failures wrapped by [`ChatlensError::Decode`].
#[derive(Debug, Error)]
pub enum DecodeErrorKind {
    /// Bytes are not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// The workbook could not be opened or read
    #[cfg(feature = "spreadsheet")]
    #[error("{0}")]
    Spreadsheet(#[from] calamine::Error),
    /// Anything else
    #[error("{0}")]
    Other(String),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatlensError {
    /// Creates an unsupported-format error for an unknown extension.
    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        ChatlensError::UnsupportedFormat {
            extension: extension.into(),
            hint: "Please use CSV, TXT, or XLSX files.",
        }
    }

    /// Creates an unsupported-format error for a spreadsheet extension when
    /// spreadsheet support was compiled out.
    pub fn spreadsheet_disabled(extension: impl Into<String>) -> Self {
        ChatlensError::UnsupportedFormat {
            extension: extension.into(),
            hint: "Spreadsheet support requires the 'spreadsheet' feature.",
        }
    }

    /// Creates an invalid-format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        ChatlensError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Creates an empty-dataset error.
    pub fn empty_dataset(format: &'static str) -> Self {
        ChatlensError::EmptyDataset { format }
    }

    /// Creates a decode error.
    pub fn decode(format: &'static str, source: impl Into<DecodeErrorKind>) -> Self {
        ChatlensError::Decode {
            format,
            source: source.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        ChatlensError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatlensError::Io(_))
    }

    /// Returns `true` if the file extension was not recognized.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, ChatlensError::UnsupportedFormat { .. })
    }

    /// Returns `true` if the load produced no usable rows.
    pub fn is_empty_dataset(&self) -> bool {
        matches!(self, ChatlensError::EmptyDataset { .. })
    }

    /// Returns `true` if the bytes could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self, ChatlensError::Decode { .. })
    }

    /// Returns `true` if a format name or extension was rejected.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, ChatlensError::InvalidFormat { .. })
    }

    /// Returns `true` if this is a date-related error.
    pub fn is_invalid_date(&self) -> bool {
        matches!(self, ChatlensError::InvalidDate { .. })
    }
}

impl From<String> for DecodeErrorKind {
    fn from(message: String) -> Self {
        DecodeErrorKind::Other(message)
    }
}
