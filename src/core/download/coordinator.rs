//! Download coordinator - main orchestrator for the download process
//!
//! This module owns the bounded batch loop: it loads the cursor, fetches
//! batches one at a time, hands each to the batch processor and commits the
//! cursor only after the batch's keys are durably stored.

use super::batch::BatchProcessor;
use super::clock::{Clock, SystemClock};
use super::summary::{DownloadSummary, StopReason};
use crate::adapters::interop::{FederationSource, InteropClient};
use crate::adapters::secrets::create_secret_provider;
use crate::adapters::sink::{create_object_sink, ObjectSink};
use crate::adapters::state::{create_batch_tag_store, BatchTagStore};
use crate::config::DownloadConfig;
use crate::core::state::StateManager;
use crate::core::validation::ValidationPolicy;
use crate::domain::{BatchTag, FederationBatch, Result};
use chrono::{Days, NaiveDate};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Download coordinator
pub struct DownloadCoordinator {
    config: DownloadConfig,
    source: Arc<dyn FederationSource>,
    state_manager: StateManager,
    batch_processor: BatchProcessor,
    clock: Arc<dyn Clock>,
    invocation_id: Uuid,
}

impl DownloadCoordinator {
    /// Create a coordinator over already built collaborators
    pub fn new(
        config: DownloadConfig,
        source: Arc<dyn FederationSource>,
        store: Arc<dyn BatchTagStore>,
        sink: Arc<dyn ObjectSink>,
    ) -> Self {
        let batch_processor = BatchProcessor::new(sink, config.federated_key_download_prefix.clone());

        Self {
            config,
            source,
            state_manager: StateManager::new(store),
            batch_processor,
            clock: Arc::new(SystemClock),
            invocation_id: Uuid::new_v4(),
        }
    }

    /// Build the production collaborators from configuration
    ///
    /// Resolves the interop token once, connects the state store and opens
    /// the object sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret cannot be resolved or the state store
    /// cannot be reached.
    pub async fn connect(config: DownloadConfig) -> Result<Self> {
        let secrets = create_secret_provider(&config);
        let source = Arc::new(InteropClient::connect(&config, secrets.as_ref()).await?);
        let store = create_batch_tag_store(&config.state).await?;
        let sink = create_object_sink(&config);

        Ok(Self::new(config, source, store, sink))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_invocation_id(mut self, invocation_id: Uuid) -> Self {
        self.invocation_id = invocation_id;
        self
    }

    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    /// Execute one download invocation
    ///
    /// 1. Checks the workspace feature flag; a disabled workspace is a no-op
    /// 2. Loads the cursor, or bootstraps a start date from the history window
    /// 3. Fetches, validates, stores and commits batches one at a time until
    ///    the server runs out, the batch limit is hit or the time budget ends
    /// 4. Records the run timestamp
    ///
    /// # Errors
    ///
    /// Any fetch, sink or state failure aborts the invocation. Batches
    /// committed before the failure stay committed; the failed batch is not.
    pub async fn execute_download(&self) -> Result<DownloadSummary> {
        let span = tracing::info_span!(
            "download",
            invocation_id = %self.invocation_id,
            workspace = %self.config.download_feature_flag.workspace()
        );

        let result = self.run().instrument(span.clone()).await;

        if let Err(e) = &result {
            span.in_scope(|| {
                crate::log_fatal_error!(e, "Download failed");
            });
        }

        result
    }

    async fn run(&self) -> Result<DownloadSummary> {
        let start_time = Instant::now();
        let now = self.clock.now();

        if !self.config.download_enabled() {
            let summary = DownloadSummary::disabled(self.invocation_id, now)
                .with_duration(start_time.elapsed());
            summary.log_summary();
            return Ok(summary);
        }

        tracing::info!(
            max_batches = self.config.max_subsequent_batch_download_count,
            "Starting federated key download"
        );

        let mut summary = DownloadSummary::new(self.invocation_id, now);
        let policy = ValidationPolicy::from_config(&self.config, now);

        let today = now.date_naive();
        let (mut cursor, batch_date) = match self.state_manager.load_cursor().await? {
            Some(batch) => (Some(batch.batch_tag().clone()), batch.batch_date()),
            None => {
                let date = self.bootstrap_date(today);
                tracing::info!(
                    batch_date = %date,
                    history_days = self.config.initial_download_history_days,
                    "Bootstrapping download history"
                );
                (None, date)
            }
        };

        let stop_reason = self
            .download_batches(&policy, &mut cursor, batch_date, today, start_time, &mut summary)
            .await?;
        summary.stop_reason = stop_reason;

        let finished_at = self.clock.now();
        self.state_manager.record_run(finished_at).await?;
        summary.last_processed_timestamp = finished_at;

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// The bounded fetch-process-commit loop
    ///
    /// When a day runs out of batches before `today`, the loop moves on to
    /// the start of the following day. Every committed batch carries the
    /// date it was requested for.
    async fn download_batches(
        &self,
        policy: &ValidationPolicy,
        cursor: &mut Option<BatchTag>,
        mut batch_date: NaiveDate,
        today: NaiveDate,
        start_time: Instant,
        summary: &mut DownloadSummary,
    ) -> Result<StopReason> {
        let max_batches = self.config.max_subsequent_batch_download_count as usize;

        loop {
            if summary.batches_processed >= max_batches {
                return Ok(StopReason::BatchLimitReached);
            }

            if let Some(budget) = self.config.max_runtime {
                if start_time.elapsed() >= budget {
                    tracing::info!(
                        budget_secs = budget.as_secs(),
                        "Time budget exhausted, leaving remaining batches for the next run"
                    );
                    return Ok(StopReason::TimeBudgetExhausted);
                }
            }

            let fetched = self.source.fetch_batch(cursor.as_ref(), batch_date).await?;

            let Some(batch_tag) = fetched.next_cursor else {
                if !fetched.exposures.is_empty() {
                    tracing::warn!(
                        batch_date = %batch_date,
                        dropped = fetched.exposures.len(),
                        "Response without a batch tag carried exposures, dropping them"
                    );
                }

                match batch_date.succ_opt() {
                    Some(next_day) if batch_date < today => {
                        tracing::info!(
                            exhausted = %batch_date,
                            batch_date = %next_day,
                            "Day exhausted, moving to the next day"
                        );
                        batch_date = next_day;
                        *cursor = None;
                        continue;
                    }
                    _ => return Ok(StopReason::EndOfBatches),
                }
            };

            if cursor.as_ref() == Some(&batch_tag) {
                tracing::warn!(
                    batch_tag = %batch_tag,
                    "Server returned the requested batch tag again, stopping"
                );
                return Ok(StopReason::NoProgress);
            }

            let result = self
                .batch_processor
                .process_batch(policy, &batch_tag, batch_date, &fetched.exposures)
                .await?;

            self.state_manager
                .checkpoint_batch(&FederationBatch::new(batch_tag.clone(), batch_date))
                .await?;

            summary.record_batch(
                result.to_report(&batch_tag, batch_date),
                &result.rejections_by_reason,
            );
            *cursor = Some(batch_tag);
        }
    }

    fn bootstrap_date(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.config.initial_download_history_days)))
            .unwrap_or(NaiveDate::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::interop::FetchedBatch;
    use crate::core::download::clock::FixedClock;
    use crate::adapters::sink::InMemorySink;
    use crate::adapters::state::InMemoryBatchTagStore;
    use crate::config::schema::test_support::sample_config;
    use crate::domain::{ExposureDownload, ReportType, TestType};
    use async_trait::async_trait;
    use chrono::{Datelike, TimeZone, Utc};
    use std::sync::Mutex;
    use tracing_subscriber::layer::SubscriberExt;

    /// Returns an endless run of empty batches, recording each request
    #[derive(Default)]
    struct EndlessSource {
        requests: Mutex<Vec<(Option<String>, NaiveDate)>>,
    }

    #[async_trait]
    impl FederationSource for EndlessSource {
        async fn fetch_batch(
            &self,
            cursor: Option<&BatchTag>,
            date: NaiveDate,
        ) -> Result<FetchedBatch> {
            let mut requests = self.requests.lock().unwrap();
            requests.push((cursor.map(|c| c.as_str().to_string()), date));
            Ok(FetchedBatch {
                exposures: Vec::new(),
                next_cursor: Some(BatchTag::new(format!("tag-{}", requests.len())).unwrap()),
            })
        }
    }

    /// Answers every request as exhausted, optionally with stray exposures
    #[derive(Default)]
    struct UntaggedSource {
        exposures: Vec<ExposureDownload>,
        dates: Mutex<Vec<NaiveDate>>,
    }

    #[async_trait]
    impl FederationSource for UntaggedSource {
        async fn fetch_batch(
            &self,
            _cursor: Option<&BatchTag>,
            date: NaiveDate,
        ) -> Result<FetchedBatch> {
            self.dates.lock().unwrap().push(date);
            Ok(FetchedBatch {
                exposures: self.exposures.clone(),
                next_cursor: None,
            })
        }
    }

    /// Collects the fields of every `warn!` event
    #[derive(Clone, Default)]
    struct WarnCollector(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCollector {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() != tracing::Level::WARN {
                return;
            }
            let mut fields = FieldText::default();
            event.record(&mut fields);
            self.0.lock().unwrap().push(fields.0);
        }
    }

    #[derive(Default)]
    struct FieldText(String);

    impl tracing::field::Visit for FieldText {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0.push_str(&format!("{}={:?} ", field.name(), value));
        }
    }

    fn exposure() -> ExposureDownload {
        ExposureDownload {
            key_data: "ogNW4Ra+Zdds1ZOOmyntDA==".to_string(),
            rolling_start_number: 2_692_512,
            transmission_risk_level: 3,
            rolling_period: 144,
            origin: "JE".to_string(),
            regions: vec!["GB".to_string()],
            test_type: TestType::LabResult,
            report_type: ReportType::ConfirmedTest,
            days_since_onset: 0,
        }
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 12, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_bootstrap_date() {
        let coordinator = DownloadCoordinator::new(
            sample_config(),
            Arc::new(EndlessSource::default()),
            Arc::new(InMemoryBatchTagStore::new()),
            Arc::new(InMemorySink::new()),
        );

        assert_eq!(
            coordinator.bootstrap_date(NaiveDate::from_ymd_opt(2021, 3, 12).unwrap()),
            NaiveDate::from_ymd_opt(2021, 2, 26).unwrap()
        );
    }

    #[tokio::test]
    async fn test_loop_is_bounded_and_threads_cursor() {
        let source = Arc::new(EndlessSource::default());
        let store = Arc::new(InMemoryBatchTagStore::new());
        let coordinator = DownloadCoordinator::new(
            sample_config(),
            source.clone(),
            store.clone(),
            Arc::new(InMemorySink::new()),
        )
        .with_clock(Arc::new(FixedClock::new(now())));

        let summary = coordinator.execute_download().await.unwrap();

        assert_eq!(summary.batches_processed, 5);
        assert_eq!(summary.stop_reason, StopReason::BatchLimitReached);

        let requests = source.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 5);
        assert_eq!(requests[0].0, None);
        assert_eq!(requests[1].0.as_deref(), Some("tag-1"));
        assert_eq!(requests[4].0.as_deref(), Some("tag-4"));
        assert_eq!(store.commits().len(), 5);
    }

    #[tokio::test]
    async fn test_zero_time_budget_fetches_nothing() {
        let mut config = sample_config();
        config.max_runtime = Some(std::time::Duration::ZERO);

        let source = Arc::new(EndlessSource::default());
        let store = Arc::new(InMemoryBatchTagStore::new());
        let coordinator = DownloadCoordinator::new(
            config,
            source.clone(),
            store.clone(),
            Arc::new(InMemorySink::new()),
        );

        let summary = coordinator.execute_download().await.unwrap();

        assert_eq!(summary.stop_reason, StopReason::TimeBudgetExhausted);
        assert!(source.requests.lock().unwrap().is_empty());
        assert!(store.last_upload_state().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_exhausted_days_advance_until_today() {
        let source = Arc::new(UntaggedSource::default());
        let store = Arc::new(InMemoryBatchTagStore::with_batch(FederationBatch::new(
            BatchTag::new("t-9").unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 9).unwrap(),
        )));
        let coordinator = DownloadCoordinator::new(
            sample_config(),
            source.clone(),
            store.clone(),
            Arc::new(InMemorySink::new()),
        )
        .with_clock(Arc::new(FixedClock::new(now())));

        let summary = coordinator.execute_download().await.unwrap();

        assert_eq!(summary.stop_reason, StopReason::EndOfBatches);
        assert_eq!(summary.batches_processed, 0);
        let days: Vec<u32> = source.dates.lock().unwrap().iter().map(|d| d.day()).collect();
        assert_eq!(days, vec![9, 10, 11, 12]);
        assert!(store.commits().is_empty());
    }

    #[tokio::test]
    async fn test_untagged_exposures_are_dropped_with_warning() {
        let warnings = WarnCollector::default();
        let subscriber = tracing_subscriber::registry().with(warnings.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let source = Arc::new(UntaggedSource {
            exposures: vec![exposure(), exposure()],
            ..Default::default()
        });
        let store = Arc::new(InMemoryBatchTagStore::with_batch(FederationBatch::new(
            BatchTag::new("t-0").unwrap(),
            now().date_naive(),
        )));
        let sink = Arc::new(InMemorySink::new());
        let coordinator = DownloadCoordinator::new(
            sample_config(),
            source,
            store.clone(),
            sink.clone(),
        )
        .with_clock(Arc::new(FixedClock::new(now())));

        let summary = coordinator.execute_download().await.unwrap();

        assert_eq!(summary.keys_accepted, 0);
        assert_eq!(sink.put_count(), 0);
        assert!(store.commits().is_empty());

        let warnings = warnings.0.lock().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("dropped=2"), "{}", warnings[0]);
    }
}
