//! Application layer for recall-herald
//!
//! This crate contains the `RunOnce` use case, the port definitions its
//! adapters implement, and the retry policy applied to transient
//! failures. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod retry;
pub mod use_cases;

// Re-export commonly used types
pub use config::RunConfig;
pub use ports::{
    marker_store::{MarkerStore, MarkerStoreError},
    notifier::{Notifier, NotifyError},
    recall_source::{RecallSource, SourceError},
};
pub use retry::RetryPolicy;
pub use use_cases::run_once::{RunOnceError, RunOnceUseCase, RunReport};
