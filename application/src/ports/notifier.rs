//! Notifier port
//!
//! Defines the interface for delivering alert messages to the chat
//! endpoint.

use async_trait::async_trait;
use herald_domain::NotificationMessage;
use thiserror::Error;

/// Errors that can occur while delivering an alert
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Invalid or missing credential. Surfaced distinctly so operators
    /// fix the token instead of waiting out a retry loop.
    #[error("Chat authentication failed: {reason}")]
    Auth { reason: String },

    /// Rate limiting or a transient network failure; worth retrying
    #[error("Transient delivery failure: {reason}")]
    Transient { reason: String },

    /// The endpoint refused the message for a non-auth reason
    /// (e.g. unknown channel); retrying will not help
    #[error("Message rejected by chat endpoint: {reason}")]
    Rejected { reason: String },
}

impl NotifyError {
    pub fn auth(reason: impl Into<String>) -> Self {
        NotifyError::Auth {
            reason: reason.into(),
        }
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        NotifyError::Transient {
            reason: reason.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        NotifyError::Rejected {
            reason: reason.into(),
        }
    }

    /// Whether retrying the delivery may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, NotifyError::Transient { .. })
    }

    /// Whether this is a credential problem
    pub fn is_auth(&self) -> bool {
        matches!(self, NotifyError::Auth { .. })
    }
}

/// Outbound gateway to the chat platform
///
/// Implementations deliver one message per call, in the order called;
/// they never batch or reorder.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError>;
}
