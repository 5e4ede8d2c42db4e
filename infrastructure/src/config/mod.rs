//! Configuration loading for recall-herald
//!
//! Raw TOML structures, their validation into typed settings, and the
//! figment-based loader that merges all sources. The priority order
//! (highest to lowest):
//!
//! 1. Environment variables prefixed `HERALD_` (nested keys split on
//!    `__`, e.g. `HERALD_SLACK__TOKEN`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./herald.toml` or `./.herald.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/recall-herald/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigError, FileConfig, FileRetryConfig, FileRunConfig, FileSlackConfig, FileSourceConfig,
    Settings, SlackSettings, SourceSettings,
};
pub use loader::ConfigLoader;
