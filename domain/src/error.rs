//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Record id cannot be empty")]
    EmptyRecordId,

    #[error("Invalid report date '{0}': expected YYYYMMDD")]
    InvalidReportDate(String),

    #[error("Unknown first-run policy '{0}': expected 'baseline-only' or 'notify-all'")]
    UnknownFirstRunPolicy(String),
}
