//! CLI entrypoint for recall-herald
//!
//! External glue around the RunOnce use case: config loading, logging
//! setup, dependency injection, and Ctrl-C handling. One invocation is
//! one run; scheduling belongs to cron or a systemd timer.

use anyhow::{Context, Result};
use clap::Parser;
use herald_application::{RunOnceError, RunOnceUseCase, RunReport};
use herald_infrastructure::{
    ConfigError, ConfigLoader, FileMarkerStore, OpenFdaClient, SlackNotifier,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// A failed run where retrying later is pointless without operator action
const EXIT_PERMANENT: u8 = 2;
/// Configuration problems, reported before any network call
const EXIT_CONFIG: u8 = 3;

#[derive(Parser)]
#[command(name = "recall-herald", version, about = "Posts new FDA food recalls to a Slack channel")]
struct Cli {
    /// Explicit config file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Destination channel, overriding configuration
    #[arg(long)]
    channel: Option<String>,

    /// Records to fetch per run (1-100), overriding configuration
    #[arg(long)]
    limit: Option<usize>,

    /// First-run policy override: baseline-only | notify-all
    #[arg(long)]
    first_run_policy: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(report) => {
            if report.baseline_established {
                let marker = report
                    .marker
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                info!(
                    fetched = report.fetched,
                    marker = %marker,
                    "baseline established, no alerts sent"
                );
            } else {
                info!(
                    fetched = report.fetched,
                    new = report.new,
                    notified = report.notified,
                    "run complete"
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(classify_exit(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<RunReport> {
    let mut file_config = ConfigLoader::load(cli.config.as_ref()).map_err(ConfigError::Load)?;

    // CLI flags beat every other configuration source
    if let Some(channel) = cli.channel {
        file_config.slack.channel = channel;
    }
    if let Some(limit) = cli.limit {
        file_config.source.limit = limit;
    }
    if let Some(policy) = cli.first_run_policy {
        file_config.run.first_run_policy = policy;
    }

    let settings = file_config.into_settings()?;

    // === Dependency Injection ===
    let source = Arc::new(OpenFdaClient::new(&settings.source).context("building source client")?);
    let notifier = Arc::new(SlackNotifier::new(&settings.slack).context("building notifier")?);
    let marker_store = Arc::new(FileMarkerStore::new(&settings.marker_path));

    // Ctrl-C aborts at the next suspension point; committed progress stays
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current step");
            signal_token.cancel();
        }
    });

    info!(
        endpoint = %settings.source.endpoint,
        channel = %settings.slack.channel,
        marker_path = %settings.marker_path.display(),
        "starting run"
    );

    let use_case =
        RunOnceUseCase::new(source, notifier, marker_store).with_cancellation(token);
    let report = use_case.execute(&settings.run).await?;
    Ok(report)
}

/// Map failures onto exit codes so schedulers and operators can tell
/// "try again later" from "fix the configuration"
fn classify_exit(error: &anyhow::Error) -> u8 {
    if error.downcast_ref::<ConfigError>().is_some() {
        return EXIT_CONFIG;
    }
    if let Some(run_error) = error.downcast_ref::<RunOnceError>() {
        if run_error.is_auth() {
            return EXIT_PERMANENT;
        }
    }
    1
}
