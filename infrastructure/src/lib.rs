//! Infrastructure layer for recall-herald
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer, plus configuration file loading: the openFDA
//! enforcement client, the Slack notifier, and the file-backed marker
//! store.

pub mod config;
pub mod marker;
pub mod openfda;
pub mod slack;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, FileConfig, Settings, SlackSettings, SourceSettings,
};
pub use marker::{FileMarkerStore, InMemoryMarkerStore};
pub use openfda::OpenFdaClient;
pub use slack::SlackNotifier;
