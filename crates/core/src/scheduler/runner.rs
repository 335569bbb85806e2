use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::catalog::{FilmCatalog, UploadStatus};
use crate::config::SchedulerConfig;
use crate::dedup::{DedupError, DedupSnapshot, DedupStore};
use crate::film::{Film, FilmMode};
use crate::metrics;
use crate::notify::Notifier;
use crate::pipeline::{FilmPipeline, ProcessingOutcome};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to read dedup state: {0}")]
    Dedup(#[from] DedupError),

    #[error("Failed to write results: {0}")]
    WriteResults(#[from] std::io::Error),

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Upload result for one outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadRecord {
    pub film_id: i64,
    pub status: UploadStatus,
}

/// Summary of one tick.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub fresh_films: usize,
    pub recheck_films: usize,
    pub outcomes: Vec<ProcessingOutcome>,
    /// Empty on dry runs.
    pub uploads: Vec<UploadRecord>,
    pub duration_ms: u64,
}

/// Runs one full tick against the catalog, the trackers and the dedup store.
pub struct RunCycle {
    catalog: Arc<dyn FilmCatalog>,
    pipeline: FilmPipeline,
    store: Arc<dyn DedupStore>,
    notifier: Option<Arc<dyn Notifier>>,
    config: SchedulerConfig,
}

impl RunCycle {
    pub fn new(
        catalog: Arc<dyn FilmCatalog>,
        pipeline: FilmPipeline,
        store: Arc<dyn DedupStore>,
        notifier: Option<Arc<dyn Notifier>>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            catalog,
            pipeline,
            store,
            notifier,
            config,
        }
    }

    /// Run one tick.
    ///
    /// A catalog failure leaves only the recheck batch; a dedup read failure
    /// aborts the tick.
    pub async fn run_once(&self) -> Result<RunReport, RunError> {
        let run_id = Uuid::new_v4();
        let start = Instant::now();

        let result = self
            .run_inner(run_id, start)
            .instrument(info_span!("run", run_id = %run_id))
            .await;

        metrics::RUN_DURATION
            .with_label_values(&[if result.is_ok() { "success" } else { "failed" }])
            .observe(start.elapsed().as_secs_f64());
        result
    }

    async fn run_inner(&self, run_id: Uuid, start: Instant) -> Result<RunReport, RunError> {
        info!(dry_run = self.config.dry_run, "Run started");

        let fresh = match self.catalog.fetch_films().await {
            Ok(films) => films,
            Err(e) => {
                warn!(error = %e, "Failed to fetch films from catalog");
                Vec::new()
            }
        };
        metrics::CATALOG_FILMS_FETCHED.inc_by(fresh.len() as u64);

        let snapshot = DedupSnapshot::load(self.store.as_ref())?;
        let recheck: Vec<Film> = snapshot
            .pending_recheck()
            .iter()
            .cloned()
            .map(Film::from)
            .collect();

        info!(
            fresh = fresh.len(),
            recheck = recheck.len(),
            recorded = snapshot.len(),
            "Films to process"
        );

        let (fresh_films, recheck_films) = (fresh.len(), recheck.len());
        let batch: Vec<(Film, FilmMode)> = fresh
            .into_iter()
            .map(|f| (f, FilmMode::Fresh))
            .chain(recheck.into_iter().map(|f| (f, FilmMode::Recheck)))
            .collect();

        let outcomes = self
            .pipeline
            .run_batch(&batch, &snapshot, self.config.max_concurrent_films)
            .await;

        let uploads = self.deliver(&outcomes).await?;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            matched = outcomes.len(),
            uploaded = uploads.iter().filter(|u| u.status.is_success()).count(),
            duration_ms = duration_ms,
            "Run finished"
        );

        Ok(RunReport {
            run_id,
            fresh_films,
            recheck_films,
            outcomes,
            uploads,
            duration_ms,
        })
    }

    async fn deliver(&self, outcomes: &[ProcessingOutcome]) -> Result<Vec<UploadRecord>, RunError> {
        if self.config.dry_run {
            let json = serde_json::to_string_pretty(outcomes)?;
            tokio::fs::write(&self.config.result_path, json).await?;
            info!(
                path = %self.config.result_path.display(),
                count = outcomes.len(),
                "Dry run: results written"
            );
            return Ok(Vec::new());
        }

        let interval = Duration::from_secs(self.config.upload_interval_secs);
        let mut uploads = Vec::with_capacity(outcomes.len());

        for (i, outcome) in outcomes.iter().enumerate() {
            info!(film_id = outcome.id, name_to_api = %outcome.name_to_api, "Uploading");
            let status = self.catalog.upload(outcome).await;
            metrics::UPLOADS.with_label_values(&[status.as_str()]).inc();

            if let Some(notifier) = &self.notifier {
                if let Err(e) = notifier.notify(outcome, &status).await {
                    warn!(film_id = outcome.id, error = %e, "Failed to send notification");
                }
            }

            uploads.push(UploadRecord {
                film_id: outcome.id,
                status,
            });

            if i + 1 < outcomes.len() && !interval.is_zero() {
                info!(wait_secs = interval.as_secs(), "Waiting before next upload");
                tokio::time::sleep(interval).await;
            }
        }

        Ok(uploads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::dedup::{DedupTable, SqliteDedupStore};
    use crate::film::DedupRecord;
    use crate::testing::{fixtures, MockCatalog, MockMagnetSource, MockNotifier, MockSearcher};
    use tempfile::TempDir;

    struct Harness {
        catalog: Arc<MockCatalog>,
        searcher: Arc<MockSearcher>,
        magnets: Arc<MockMagnetSource>,
        store: Arc<SqliteDedupStore>,
        notifier: Arc<MockNotifier>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                catalog: Arc::new(MockCatalog::new()),
                searcher: Arc::new(MockSearcher::new()),
                magnets: Arc::new(MockMagnetSource::new()),
                store: Arc::new(SqliteDedupStore::in_memory().unwrap()),
                notifier: Arc::new(MockNotifier::new()),
            }
        }

        fn cycle(&self, config: SchedulerConfig) -> RunCycle {
            let pipeline = FilmPipeline::new(
                &fixtures::matching_config(),
                &fixtures::tracker_api_config(),
                self.searcher.clone(),
                self.magnets.clone(),
                self.store.clone(),
            );
            RunCycle::new(
                self.catalog.clone(),
                pipeline,
                self.store.clone(),
                Some(self.notifier.clone()),
                config,
            )
        }

        async fn with_alpha_release(&self) {
            self.searcher
                .set_result(fixtures::search_result(&[fixtures::release_json(
                    "Alpha Original 2024 WEB-DL",
                    "2.1 GB",
                    5,
                    "101",
                )]))
                .await;
            self.magnets.set_magnet("101", "magnet:?alpha").await;
        }
    }

    fn live_config() -> SchedulerConfig {
        SchedulerConfig {
            dry_run: false,
            upload_interval_secs: 0,
            ..SchedulerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_uploads_and_notifies() {
        let h = Harness::new();
        h.catalog.set_films(vec![fixtures::alpha_film()]).await;
        h.with_alpha_release().await;

        let report = h.cycle(live_config()).run_once().await.unwrap();

        assert_eq!(report.fresh_films, 1);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.uploads.len(), 1);
        assert_eq!(report.uploads[0].status, UploadStatus::Uploaded);
        assert_eq!(h.catalog.uploaded().await.len(), 1);

        let notes = h.notifier.notifications().await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].1, UploadStatus::Uploaded);
    }

    #[tokio::test]
    async fn test_dry_run_writes_result_file() {
        let h = Harness::new();
        h.catalog.set_films(vec![fixtures::alpha_film()]).await;
        h.with_alpha_release().await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("result.json");
        let config = SchedulerConfig {
            dry_run: true,
            result_path: path.clone(),
            ..SchedulerConfig::default()
        };

        let report = h.cycle(config).run_once().await.unwrap();
        assert!(report.uploads.is_empty());
        assert!(h.catalog.uploaded().await.is_empty());
        assert!(h.notifier.notifications().await.is_empty());

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let first = &written[0];
        assert_eq!(first["id"], 1);
        assert_eq!(first["kinotam_name"], "Alpha | Alpha Original | 2024");
        assert_eq!(first["name_to_api"], "Alpha | Alpha Original | 2024 | WEB-DL");
        assert_eq!(first["magnet"], "magnet:?alpha");
    }

    #[tokio::test]
    async fn test_catalog_failure_still_rechecks() {
        let h = Harness::new();
        h.catalog
            .set_next_error(CatalogError::AuthFailed("denied".to_string()))
            .await;
        h.store
            .record(DedupTable::BadQuality, &DedupRecord::from(&fixtures::alpha_film()))
            .unwrap();
        h.with_alpha_release().await;

        let report = h.cycle(live_config()).run_once().await.unwrap();

        assert_eq!(report.fresh_films, 0);
        assert_eq!(report.recheck_films, 1);
        assert_eq!(report.outcomes.len(), 1);
        assert!(h.store.all(DedupTable::BadQuality).unwrap().is_empty());
        assert_eq!(h.store.all(DedupTable::GoodQuality).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_run_skips_recorded_film() {
        let h = Harness::new();
        h.catalog.set_films(vec![fixtures::alpha_film()]).await;
        h.with_alpha_release().await;

        let cycle = h.cycle(live_config());
        assert_eq!(cycle.run_once().await.unwrap().outcomes.len(), 1);
        assert!(cycle.run_once().await.unwrap().outcomes.is_empty());
        assert_eq!(h.searcher.recorded_queries().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_is_reported_not_fatal() {
        let h = Harness::new();
        h.catalog.set_films(vec![fixtures::alpha_film()]).await;
        h.catalog
            .set_upload_status(UploadStatus::Rejected("00012".to_string()))
            .await;
        h.with_alpha_release().await;

        let report = h.cycle(live_config()).run_once().await.unwrap();
        assert_eq!(
            report.uploads[0].status,
            UploadStatus::Rejected("00012".to_string())
        );
        assert_eq!(
            h.notifier.notifications().await[0].1,
            UploadStatus::Rejected("00012".to_string())
        );
    }
}
