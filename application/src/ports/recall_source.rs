//! Recall source port
//!
//! Defines the interface for fetching recall records from the upstream
//! data provider.

use async_trait::async_trait;
use herald_domain::RecallRecord;
use thiserror::Error;

/// Errors that can occur while fetching recalls
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network-level failure or non-success status; worth retrying
    #[error("Recall source unavailable: {reason}")]
    Unavailable { reason: String },

    /// Response body cannot be trusted; retrying the same request will
    /// not help and the marker must stay untouched
    #[error("Malformed recall source response: {reason}")]
    Malformed { reason: String },
}

impl SourceError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        SourceError::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        SourceError::Malformed {
            reason: reason.into(),
        }
    }

    /// Whether retrying the fetch may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Unavailable { .. })
    }
}

/// Read-only gateway to the upstream recall data provider
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait RecallSource: Send + Sync {
    /// Fetch up to `limit` recall records, newest first
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<RecallRecord>, SourceError>;
}
