//! Marker store port
//!
//! Minimal key-value interface for the single persisted value: the
//! novelty marker of the most recently announced recall.

use async_trait::async_trait;
use herald_domain::NoveltyMarker;
use thiserror::Error;

/// Errors that can occur reading or writing the marker
#[derive(Error, Debug)]
pub enum MarkerStoreError {
    #[error("Marker store I/O failure: {reason}")]
    Io { reason: String },

    /// The stored marker no longer matches what this run read at start.
    /// Another run advanced it; this run must not overwrite.
    #[error("Marker changed concurrently (expected {expected:?}, found {found:?})")]
    Conflict {
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("Stored marker is corrupt: {reason}")]
    Corrupt { reason: String },
}

impl MarkerStoreError {
    pub fn io(reason: impl Into<String>) -> Self {
        MarkerStoreError::Io {
            reason: reason.into(),
        }
    }

    pub fn corrupt(reason: impl Into<String>) -> Self {
        MarkerStoreError::Corrupt {
            reason: reason.into(),
        }
    }

    pub fn conflict(expected: Option<&NoveltyMarker>, found: Option<&NoveltyMarker>) -> Self {
        MarkerStoreError::Conflict {
            expected: expected.map(|m| m.record_id.to_string()),
            found: found.map(|m| m.record_id.to_string()),
        }
    }
}

/// Persistence for the novelty marker
///
/// Writes are conditional: `compare_and_set` only succeeds when the
/// stored value still equals `expected`, so two overlapping runs cannot
/// both advance the marker from a stale read. Each successful write is
/// atomic; a reader never observes a torn value.
#[async_trait]
pub trait MarkerStore: Send + Sync {
    async fn get(&self) -> Result<Option<NoveltyMarker>, MarkerStoreError>;

    async fn compare_and_set(
        &self,
        expected: Option<&NoveltyMarker>,
        new: &NoveltyMarker,
    ) -> Result<(), MarkerStoreError>;
}
