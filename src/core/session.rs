//! The current dataset of an interactive browsing session.
//!
//! [`ChatSession`] holds at most one [`Dataset`]. A load builds the next
//! dataset completely before swapping it in, so readers never observe a
//! half-built state, and a failed load leaves the previous dataset in place.
//! Snapshots taken with [`ChatSession::current`] stay valid across loads.
//!
//! Loads are not serialized by the session; callers run one at a time.

use std::sync::{Arc, RwLock};

use super::dataset::{Dataset, load};
use super::filter::{QueryFilter, query};
use super::normalize::{Clock, system_clock};
use crate::config::IngestConfig;
use crate::error::Result;
use crate::message::ChatMessage;

/// Owner of the current dataset.
pub struct ChatSession {
    config: IngestConfig,
    clock: Clock,
    current: RwLock<Option<Arc<Dataset>>>,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("config", &self.config)
            .field("loaded", &self.current().is_some())
            .finish_non_exhaustive()
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl ChatSession {
    /// Creates an empty session using the wall clock.
    pub fn new(config: IngestConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    /// Creates an empty session with an injected clock.
    pub fn with_clock(config: IngestConfig, clock: Clock) -> Self {
        Self {
            config,
            clock,
            current: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Loads a file and makes it the current dataset.
    ///
    /// On error the previous dataset is kept.
    pub fn load(&self, bytes: &[u8], filename: &str) -> Result<Arc<Dataset>> {
        let dataset = Arc::new(load(bytes, filename, &self.config, Arc::clone(&self.clock))?);
        let mut slot = self
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// A snapshot of the current dataset, if any file has been loaded.
    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Drops the current dataset.
    pub fn clear(&self) {
        let mut slot = self
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = None;
    }

    /// Runs a query against the current dataset.
    ///
    /// Returns owned messages so the result outlives the snapshot. Empty when
    /// nothing is loaded.
    pub fn query(&self, channel: &str, filter: &QueryFilter) -> Vec<ChatMessage> {
        match self.current() {
            Some(dataset) => query(&dataset, channel, filter)
                .into_iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }
}
