//! Low-level text helpers shared by every input parser.
//!
//! - [`splitter`] turns one line of delimited text into cleaned fields
//! - [`timestamp`] turns a cell into an instant

pub mod splitter;
pub mod timestamp;

pub use splitter::{DEFAULT_DELIMITER, LineSplitter, detect_delimiter, strip_enclosing_quotes};
pub use timestamp::{
    TimestampPattern, local_to_utc, parse_direct, parse_timestamp, parse_with_patterns,
};
