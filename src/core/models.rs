//! Export configuration.

use serde::{Deserialize, Serialize};

/// Controls which optional columns the export writers include.
///
/// `username`, `channel` and `message` are always written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Include timestamps in output
    pub include_timestamps: bool,
    /// Include message and user IDs in output
    pub include_ids: bool,
    /// Include country, city and reply/mention flags in output
    pub include_metadata: bool,
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables every optional column.
    pub fn all() -> Self {
        Self {
            include_timestamps: true,
            include_ids: true,
            include_metadata: true,
        }
    }

    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.include_timestamps = true;
        self
    }

    #[must_use]
    pub fn with_ids(mut self) -> Self {
        self.include_ids = true;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self) -> Self {
        self.include_metadata = true;
        self
    }
}
