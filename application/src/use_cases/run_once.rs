//! RunOnce use case
//!
//! One full pass of the bot: fetch recent recalls, select the ones not
//! announced yet, deliver them oldest first, and advance the marker one
//! record at a time. Triggered externally (scheduler or manual
//! invocation); this use case never loops or sleeps between runs.

use crate::config::RunConfig;
use crate::ports::marker_store::{MarkerStore, MarkerStoreError};
use crate::ports::notifier::{Notifier, NotifyError};
use crate::ports::recall_source::{RecallSource, SourceError};
use crate::retry::retry_transient;
use herald_domain::{NotificationMessage, NoveltyMarker, RecordId, select_new};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Errors that can end a run early
///
/// Progress already committed to the marker store stays committed; the
/// error only describes where the run stopped and why.
#[derive(Error, Debug)]
pub enum RunOnceError {
    #[error("Fetching recalls failed: {0}")]
    Source(#[from] SourceError),

    #[error("Delivering alert for record {record_id} failed: {source}")]
    Notify {
        record_id: RecordId,
        #[source]
        source: NotifyError,
        /// Records already delivered (and committed) before the failure
        delivered: usize,
    },

    #[error("Marker store failure: {0}")]
    Marker(#[from] MarkerStoreError),

    #[error("Run cancelled")]
    Cancelled,
}

impl RunOnceError {
    /// Credential problem; operators should fix configuration, not retry
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            RunOnceError::Notify {
                source: NotifyError::Auth { .. },
                ..
            }
        )
    }

    /// The id of the record the run stopped on, when one exists
    pub fn record_id(&self) -> Option<&RecordId> {
        match self {
            RunOnceError::Notify { record_id, .. } => Some(record_id),
            _ => None,
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Records returned by the source
    pub fetched: usize,
    /// Records the novelty filter selected
    pub new: usize,
    /// Alerts actually delivered
    pub notified: usize,
    /// True when a first run only established a baseline
    pub baseline_established: bool,
    /// Marker after the run, if any exists
    pub marker: Option<NoveltyMarker>,
}

/// Use case for one fetch-filter-dispatch pass
///
/// Holds the three ports behind `Arc` so the caller wires adapters once
/// at startup; tests inject scripted fakes the same way.
pub struct RunOnceUseCase<S, N, M>
where
    S: RecallSource,
    N: Notifier,
    M: MarkerStore,
{
    source: Arc<S>,
    notifier: Arc<N>,
    marker_store: Arc<M>,
    cancellation_token: Option<CancellationToken>,
}

impl<S, N, M> RunOnceUseCase<S, N, M>
where
    S: RecallSource + 'static,
    N: Notifier + 'static,
    M: MarkerStore + 'static,
{
    pub fn new(source: Arc<S>, notifier: Arc<N>, marker_store: Arc<M>) -> Self {
        Self {
            source,
            notifier,
            marker_store,
            cancellation_token: None,
        }
    }

    /// Attach a token that aborts the run at the next suspension point
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute one run
    pub async fn execute(&self, config: &RunConfig) -> Result<RunReport, RunOnceError> {
        self.ensure_live()?;

        let marker = self.marker_store.get().await?;
        match &marker {
            Some(marker) => debug!(%marker, "loaded novelty marker"),
            None => info!("no novelty marker yet, applying first-run policy"),
        }

        let records = retry_transient(
            &config.retry,
            self.cancellation_token.as_ref(),
            "recall fetch",
            SourceError::is_transient,
            || {
                let source = Arc::clone(&self.source);
                let limit = config.source_limit;
                async move { source.fetch_recent(limit).await }
            },
        )
        .await?;
        self.ensure_live()?;

        let fetched = records.len();
        let selection = select_new(records, marker.as_ref(), config.first_run_policy);

        if let Some(baseline) = &selection.baseline {
            self.marker_store
                .compare_and_set(marker.as_ref(), baseline)
                .await?;
            info!(marker = %baseline, "baseline established, nothing announced");
            return Ok(RunReport {
                fetched,
                new: 0,
                notified: 0,
                baseline_established: true,
                marker: Some(baseline.clone()),
            });
        }

        let new = selection.to_notify.len();
        info!(fetched, new, "selected records to announce");

        let mut current = marker;
        let mut notified = 0;
        for record in selection.to_notify {
            self.ensure_live()?;

            let message = NotificationMessage::from_record(&record);
            retry_transient(
                &config.retry,
                self.cancellation_token.as_ref(),
                "alert delivery",
                NotifyError::is_transient,
                || {
                    let notifier = Arc::clone(&self.notifier);
                    let message = message.clone();
                    async move { notifier.send(&message).await }
                },
            )
            .await
            .map_err(|source| RunOnceError::Notify {
                record_id: record.id.clone(),
                source,
                delivered: notified,
            })?;

            let advanced = NoveltyMarker::for_record(&record);
            self.marker_store
                .compare_and_set(current.as_ref(), &advanced)
                .await?;
            debug!(record_id = %record.id, "alert delivered, marker advanced");
            current = Some(advanced);
            notified += 1;
        }

        Ok(RunReport {
            fetched,
            new,
            notified,
            baseline_established: false,
            marker: current,
        })
    }

    fn ensure_live(&self) -> Result<(), RunOnceError> {
        match &self.cancellation_token {
            Some(token) if token.is_cancelled() => Err(RunOnceError::Cancelled),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use async_trait::async_trait;
    use herald_domain::{FirstRunPolicy, RecallRecord, ReportDate};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    fn record(id: &str, date: &str) -> RecallRecord {
        RecallRecord::new(
            RecordId::try_new(id).unwrap(),
            ReportDate::parse_compact(date).unwrap(),
            format!("product {id}"),
            "reason",
            "firm",
        )
    }

    fn marker(id: &str, date: &str) -> NoveltyMarker {
        NoveltyMarker::for_record(&record(id, date))
    }

    /// Source that pops one scripted response per fetch call
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Vec<RecallRecord>, SourceError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<RecallRecord>, SourceError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl RecallSource for ScriptedSource {
        async fn fetch_recent(&self, _limit: usize) -> Result<Vec<RecallRecord>, SourceError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("source called more times than scripted")
        }
    }

    /// Notifier that records every delivered text and pops scripted
    /// outcomes (missing script entries mean success)
    struct ScriptedNotifier {
        outcomes: Mutex<VecDeque<Result<(), NotifyError>>>,
        sent: Mutex<Vec<String>>,
    }

    impl ScriptedNotifier {
        fn succeeding() -> Self {
            Self::new(Vec::new())
        }

        fn new(outcomes: Vec<Result<(), NotifyError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }

        fn attempts(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Notifier for ScriptedNotifier {
        async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(message.text().to_string());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(()))
        }
    }

    /// Mutex-guarded marker store with real compare-and-set semantics
    struct FakeMarkerStore {
        value: Mutex<Option<NoveltyMarker>>,
    }

    impl FakeMarkerStore {
        fn empty() -> Self {
            Self {
                value: Mutex::new(None),
            }
        }

        fn with(marker: NoveltyMarker) -> Self {
            Self {
                value: Mutex::new(Some(marker)),
            }
        }

        fn current(&self) -> Option<NoveltyMarker> {
            self.value.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MarkerStore for FakeMarkerStore {
        async fn get(&self) -> Result<Option<NoveltyMarker>, MarkerStoreError> {
            Ok(self.value.lock().unwrap().clone())
        }

        async fn compare_and_set(
            &self,
            expected: Option<&NoveltyMarker>,
            new: &NoveltyMarker,
        ) -> Result<(), MarkerStoreError> {
            let mut value = self.value.lock().unwrap();
            if value.as_ref() != expected {
                return Err(MarkerStoreError::conflict(expected, value.as_ref()));
            }
            *value = Some(new.clone());
            Ok(())
        }
    }

    fn fast_config(policy: FirstRunPolicy) -> RunConfig {
        RunConfig::new(
            100,
            policy,
            RetryPolicy::new(3, Duration::ZERO, Duration::ZERO),
        )
    }

    fn use_case(
        source: ScriptedSource,
        notifier: ScriptedNotifier,
        store: FakeMarkerStore,
    ) -> RunOnceUseCase<ScriptedSource, ScriptedNotifier, FakeMarkerStore> {
        RunOnceUseCase::new(Arc::new(source), Arc::new(notifier), Arc::new(store))
    }

    // ==================== Flow tests ====================

    #[tokio::test]
    async fn test_new_records_announced_oldest_first_and_marker_lands_on_newest() {
        // Fetch is newest first: A(day3), B(day2), C(day1); marker at C
        let source = ScriptedSource::new(vec![Ok(vec![
            record("A", "20260103"),
            record("B", "20260102"),
            record("C", "20260101"),
        ])]);
        let uc = use_case(
            source,
            ScriptedNotifier::succeeding(),
            FakeMarkerStore::with(marker("C", "20260101")),
        );

        let report = uc
            .execute(&fast_config(FirstRunPolicy::BaselineOnly))
            .await
            .expect("run should succeed");

        assert_eq!(report.fetched, 3);
        assert_eq!(report.new, 2);
        assert_eq!(report.notified, 2);
        assert!(!report.baseline_established);
        assert_eq!(report.marker, Some(marker("A", "20260103")));

        let sent = uc.notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("product B"));
        assert!(sent[1].contains("product A"));

        assert_eq!(uc.marker_store.current(), Some(marker("A", "20260103")));
    }

    #[tokio::test]
    async fn test_nothing_new_sends_nothing_and_keeps_marker() {
        let source = ScriptedSource::new(vec![Ok(vec![record("A", "20260103")])]);
        let uc = use_case(
            source,
            ScriptedNotifier::succeeding(),
            FakeMarkerStore::with(marker("A", "20260103")),
        );

        let report = uc
            .execute(&fast_config(FirstRunPolicy::BaselineOnly))
            .await
            .unwrap();

        assert_eq!(report.notified, 0);
        assert_eq!(uc.notifier.attempts(), 0);
        assert_eq!(uc.marker_store.current(), Some(marker("A", "20260103")));
    }

    #[tokio::test]
    async fn test_empty_fetch_is_a_quiet_success() {
        let source = ScriptedSource::new(vec![Ok(Vec::new())]);
        let uc = use_case(
            source,
            ScriptedNotifier::succeeding(),
            FakeMarkerStore::empty(),
        );

        let report = uc
            .execute(&fast_config(FirstRunPolicy::BaselineOnly))
            .await
            .unwrap();

        assert_eq!(report.fetched, 0);
        assert_eq!(report.notified, 0);
        assert!(!report.baseline_established);
        assert_eq!(uc.marker_store.current(), None);
    }

    // ==================== First-run policy ====================

    #[tokio::test]
    async fn test_first_run_baseline_only_sets_marker_silently() {
        let source = ScriptedSource::new(vec![Ok(vec![
            record("A", "20260103"),
            record("B", "20260102"),
        ])]);
        let uc = use_case(
            source,
            ScriptedNotifier::succeeding(),
            FakeMarkerStore::empty(),
        );

        let report = uc
            .execute(&fast_config(FirstRunPolicy::BaselineOnly))
            .await
            .unwrap();

        assert!(report.baseline_established);
        assert_eq!(report.notified, 0);
        assert_eq!(uc.notifier.attempts(), 0);
        assert_eq!(uc.marker_store.current(), Some(marker("A", "20260103")));
    }

    #[tokio::test]
    async fn test_first_run_notify_all_announces_everything() {
        let source = ScriptedSource::new(vec![Ok(vec![
            record("A", "20260103"),
            record("B", "20260102"),
        ])]);
        let uc = use_case(
            source,
            ScriptedNotifier::succeeding(),
            FakeMarkerStore::empty(),
        );

        let report = uc
            .execute(&fast_config(FirstRunPolicy::NotifyAll))
            .await
            .unwrap();

        assert_eq!(report.notified, 2);
        let sent = uc.notifier.sent();
        assert!(sent[0].contains("product B"));
        assert!(sent[1].contains("product A"));
        assert_eq!(uc.marker_store.current(), Some(marker("A", "20260103")));
    }

    // ==================== Failure handling ====================

    #[tokio::test]
    async fn test_transient_fetch_failure_is_retried_then_succeeds() {
        let source = ScriptedSource::new(vec![
            Err(SourceError::unavailable("503")),
            Ok(vec![record("A", "20260103")]),
        ]);
        let uc = use_case(
            source,
            ScriptedNotifier::succeeding(),
            FakeMarkerStore::empty(),
        );

        let report = uc
            .execute(&fast_config(FirstRunPolicy::NotifyAll))
            .await
            .unwrap();

        assert_eq!(uc.source.calls(), 2);
        assert_eq!(report.notified, 1);
    }

    #[tokio::test]
    async fn test_fetch_retry_exhaustion_ends_run_with_marker_untouched() {
        let source = ScriptedSource::new(vec![
            Err(SourceError::unavailable("timeout")),
            Err(SourceError::unavailable("timeout")),
            Err(SourceError::unavailable("timeout")),
        ]);
        let uc = use_case(
            source,
            ScriptedNotifier::succeeding(),
            FakeMarkerStore::with(marker("C", "20260101")),
        );

        let error = uc
            .execute(&fast_config(FirstRunPolicy::BaselineOnly))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            RunOnceError::Source(SourceError::Unavailable { .. })
        ));
        assert_eq!(uc.source.calls(), 3);
        assert_eq!(uc.notifier.attempts(), 0);
        assert_eq!(uc.marker_store.current(), Some(marker("C", "20260101")));
    }

    #[tokio::test]
    async fn test_malformed_response_is_not_retried_and_marker_untouched() {
        let source = ScriptedSource::new(vec![Err(SourceError::malformed("bad json"))]);
        let uc = use_case(
            source,
            ScriptedNotifier::succeeding(),
            FakeMarkerStore::with(marker("C", "20260101")),
        );

        let error = uc
            .execute(&fast_config(FirstRunPolicy::BaselineOnly))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            RunOnceError::Source(SourceError::Malformed { .. })
        ));
        assert_eq!(uc.source.calls(), 1);
        assert_eq!(uc.marker_store.current(), Some(marker("C", "20260101")));
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_marker_at_last_delivered_record() {
        // Three new records; delivery of the second fails permanently.
        let source = ScriptedSource::new(vec![Ok(vec![
            record("D", "20260104"),
            record("C", "20260103"),
            record("B", "20260102"),
        ])]);
        let notifier = ScriptedNotifier::new(vec![
            Ok(()),
            Err(NotifyError::rejected("channel_not_found")),
        ]);
        let uc = use_case(
            source,
            notifier,
            FakeMarkerStore::with(marker("A", "20260101")),
        );

        let error = uc
            .execute(&fast_config(FirstRunPolicy::BaselineOnly))
            .await
            .unwrap_err();

        match &error {
            RunOnceError::Notify {
                record_id,
                delivered,
                ..
            } => {
                assert_eq!(record_id.as_str(), "C");
                assert_eq!(*delivered, 1);
            }
            other => panic!("unexpected error: {other}"),
        }

        // B went out and was committed; C and D stay pending for the next run
        assert_eq!(uc.marker_store.current(), Some(marker("B", "20260102")));
        assert_eq!(uc.notifier.attempts(), 2);
    }

    #[tokio::test]
    async fn test_transient_delivery_failure_retried_then_succeeds() {
        let source = ScriptedSource::new(vec![Ok(vec![record("B", "20260102")])]);
        let notifier = ScriptedNotifier::new(vec![
            Err(NotifyError::transient("ratelimited")),
            Ok(()),
        ]);
        let uc = use_case(
            source,
            notifier,
            FakeMarkerStore::with(marker("A", "20260101")),
        );

        let report = uc
            .execute(&fast_config(FirstRunPolicy::BaselineOnly))
            .await
            .unwrap();

        assert_eq!(report.notified, 1);
        assert_eq!(uc.notifier.attempts(), 2);
        assert_eq!(uc.marker_store.current(), Some(marker("B", "20260102")));
    }

    #[tokio::test]
    async fn test_auth_failure_aborts_without_retry() {
        let source = ScriptedSource::new(vec![Ok(vec![
            record("C", "20260103"),
            record("B", "20260102"),
        ])]);
        let notifier = ScriptedNotifier::new(vec![Err(NotifyError::auth("invalid_auth"))]);
        let uc = use_case(
            source,
            notifier,
            FakeMarkerStore::with(marker("A", "20260101")),
        );

        let error = uc
            .execute(&fast_config(FirstRunPolicy::BaselineOnly))
            .await
            .unwrap_err();

        assert!(error.is_auth());
        assert_eq!(error.record_id().map(RecordId::as_str), Some("B"));
        // One attempt for the first record, no retries, no second record
        assert_eq!(uc.notifier.attempts(), 1);
        assert_eq!(uc.marker_store.current(), Some(marker("A", "20260101")));
    }

    // ==================== Cancellation ====================

    #[tokio::test]
    async fn test_cancelled_before_start_does_nothing() {
        let token = CancellationToken::new();
        token.cancel();

        let source = ScriptedSource::new(vec![Ok(vec![record("A", "20260103")])]);
        let uc = use_case(
            source,
            ScriptedNotifier::succeeding(),
            FakeMarkerStore::empty(),
        )
        .with_cancellation(token);

        let error = uc
            .execute(&fast_config(FirstRunPolicy::NotifyAll))
            .await
            .unwrap_err();

        assert!(matches!(error, RunOnceError::Cancelled));
        assert_eq!(uc.source.calls(), 0);
        assert_eq!(uc.notifier.attempts(), 0);
    }
}
