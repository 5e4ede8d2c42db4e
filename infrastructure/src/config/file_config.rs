//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the config file; every
//! field has a default so a missing file or section still extracts. The
//! only value with no usable default is the Slack token, which
//! [`FileConfig::into_settings`] enforces at load time.

use herald_application::{RetryPolicy, RunConfig};
use herald_domain::{DomainError, FirstRunPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default enforcement endpoint (food recalls)
const DEFAULT_ENDPOINT: &str = "https://api.fda.gov/food/enforcement.json";

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("slack.token is not set; export HERALD_SLACK__TOKEN or set [slack] token")]
    MissingSlackToken,

    #[error("slack.channel is not set")]
    MissingSlackChannel,

    #[error("source.endpoint is not set")]
    MissingSourceEndpoint,

    #[error("retry.max_attempts must be at least 1")]
    ZeroRetryAttempts,

    #[error("run.first_run_policy: {0}")]
    InvalidFirstRunPolicy(#[from] DomainError),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Upstream recall feed
    pub source: FileSourceConfig,
    /// Slack delivery
    pub slack: FileSlackConfig,
    /// Run behavior
    pub run: FileRunConfig,
    /// Retry budget for transient failures
    pub retry: FileRetryConfig,
}

/// Upstream source configuration (`[source]` section)
///
/// ```toml
/// [source]
/// endpoint = "https://api.fda.gov/food/enforcement.json"
/// limit = 20
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSourceConfig {
    /// Query endpoint for the enforcement feed
    pub endpoint: String,
    /// Records per fetch; the upstream caps pages at 100
    pub limit: usize,
    /// Optional api_key raising the upstream rate limit
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FileSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            limit: 20,
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Slack delivery configuration (`[slack]` section)
///
/// The token has no default on purpose; ship it through the environment:
///
/// ```text
/// export HERALD_SLACK__TOKEN=xoxb-...
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSlackConfig {
    /// Destination channel (name or id)
    pub channel: String,
    /// Bot token used as the bearer credential
    pub token: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FileSlackConfig {
    fn default() -> Self {
        Self {
            channel: "slack-bots".to_string(),
            token: String::new(),
            timeout_secs: 15,
        }
    }
}

/// Run behavior (`[run]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRunConfig {
    /// "baseline-only" or "notify-all"
    pub first_run_policy: String,
    /// Marker file location; empty means the XDG state directory
    pub marker_path: String,
}

impl Default for FileRunConfig {
    fn default() -> Self {
        Self {
            first_run_policy: FirstRunPolicy::BaselineOnly.as_str().to_string(),
            marker_path: String::new(),
        }
    }
}

/// Retry budget (`[retry]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

/// Validated settings for the upstream source adapter
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Validated settings for the Slack adapter
#[derive(Debug, Clone)]
pub struct SlackSettings {
    pub channel: String,
    pub token: String,
    pub timeout: Duration,
}

/// Everything the binary needs to wire a run
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: SourceSettings,
    pub slack: SlackSettings,
    pub marker_path: PathBuf,
    pub run: RunConfig,
}

impl FileConfig {
    /// Validate into the typed settings the adapters and use case take
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        if self.slack.token.trim().is_empty() {
            return Err(ConfigError::MissingSlackToken);
        }
        if self.slack.channel.trim().is_empty() {
            return Err(ConfigError::MissingSlackChannel);
        }
        if self.source.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingSourceEndpoint);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroRetryAttempts);
        }

        let first_run_policy: FirstRunPolicy = self.run.first_run_policy.parse()?;

        let api_key = if self.source.api_key.trim().is_empty() {
            None
        } else {
            Some(self.source.api_key)
        };

        let marker_path = if self.run.marker_path.trim().is_empty() {
            default_marker_path()
        } else {
            PathBuf::from(self.run.marker_path)
        };

        Ok(Settings {
            source: SourceSettings {
                endpoint: self.source.endpoint,
                api_key,
                timeout: Duration::from_secs(self.source.timeout_secs),
            },
            slack: SlackSettings {
                channel: self.slack.channel,
                token: self.slack.token,
                timeout: Duration::from_secs(self.slack.timeout_secs),
            },
            marker_path,
            run: RunConfig::new(
                self.source.limit,
                first_run_policy,
                RetryPolicy::new(
                    self.retry.max_attempts,
                    Duration::from_millis(self.retry.base_delay_ms),
                    Duration::from_millis(self.retry.max_delay_ms),
                ),
            ),
        })
    }
}

/// Marker location when none is configured
fn default_marker_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|d| d.join("recall-herald").join("marker.json"))
        .unwrap_or_else(|| PathBuf::from("herald-marker.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_token(mut config: FileConfig) -> FileConfig {
        config.slack.token = "xoxb-test".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.source.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.source.limit, 20);
        assert_eq!(config.slack.channel, "slack-bots");
        assert_eq!(config.run.first_run_policy, "baseline-only");
        assert_eq!(config.retry.max_attempts, 4);
    }

    #[test]
    fn test_empty_toml_extracts_to_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.source, FileSourceConfig::default());
        assert_eq!(config.slack, FileSlackConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [slack]
            channel = "food-safety"
            token = "xoxb-test"

            [run]
            first_run_policy = "notify-all"
            "#,
        )
        .unwrap();
        assert_eq!(config.slack.channel, "food-safety");
        assert_eq!(config.run.first_run_policy, "notify-all");
        assert_eq!(config.source.limit, 20);

        let settings = config.into_settings().unwrap();
        assert_eq!(settings.run.first_run_policy, FirstRunPolicy::NotifyAll);
        assert_eq!(settings.slack.channel, "food-safety");
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let error = FileConfig::default().into_settings().unwrap_err();
        assert!(matches!(error, ConfigError::MissingSlackToken));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let mut config = with_token(FileConfig::default());
        config.run.first_run_policy = "everything".to_string();
        let error = config.into_settings().unwrap_err();
        assert!(matches!(error, ConfigError::InvalidFirstRunPolicy(_)));
    }

    #[test]
    fn test_zero_retry_attempts_is_rejected() {
        let mut config = with_token(FileConfig::default());
        config.retry.max_attempts = 0;
        let error = config.into_settings().unwrap_err();
        assert!(matches!(error, ConfigError::ZeroRetryAttempts));
    }

    #[test]
    fn test_blank_api_key_maps_to_none() {
        let settings = with_token(FileConfig::default()).into_settings().unwrap();
        assert_eq!(settings.source.api_key, None);

        let mut config = with_token(FileConfig::default());
        config.source.api_key = "DEMO_KEY".to_string();
        let settings = config.into_settings().unwrap();
        assert_eq!(settings.source.api_key.as_deref(), Some("DEMO_KEY"));
    }

    #[test]
    fn test_retry_settings_reach_the_policy() {
        let mut config = with_token(FileConfig::default());
        config.retry.max_attempts = 2;
        config.retry.base_delay_ms = 100;
        config.retry.max_delay_ms = 150;
        let settings = config.into_settings().unwrap();
        assert_eq!(settings.run.retry.max_attempts, 2);
        assert_eq!(settings.run.retry.base_delay, Duration::from_millis(100));
        assert_eq!(settings.run.retry.delay_for(2), Duration::from_millis(150));
    }
}
