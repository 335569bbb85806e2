//! Film pipeline implementation.
//!
//! One `process_film` call runs a single film from search to magnet link.
//! `run_batch` fans many films out under a bounded pool; every per-film
//! failure is logged and turns into a dropped film, never a batch error.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::{MatchingConfig, RetryConfig, TrackerApiConfig};
use crate::dedup::{DedupSnapshot, DedupStore};
use crate::film::{Film, FilmMode};
use crate::matching::{pick_best_seeded, QualityClassifier, ReleaseFilter};
use crate::metrics;
use crate::retry::retry_until_some;
use crate::searcher::{MagnetSource, SearchQuery, Searcher};

use super::ProcessingOutcome;

/// Sequences matching for one film at a time.
pub struct FilmPipeline {
    searcher: Arc<dyn Searcher>,
    magnets: Arc<dyn MagnetSource>,
    store: Arc<dyn DedupStore>,
    filter: ReleaseFilter,
    classifier: QualityClassifier,
    min_views: i64,
    scope: String,
    magnet_retry: RetryConfig,
}

impl FilmPipeline {
    pub fn new(
        matching: &MatchingConfig,
        tracker_api: &TrackerApiConfig,
        searcher: Arc<dyn Searcher>,
        magnets: Arc<dyn MagnetSource>,
        store: Arc<dyn DedupStore>,
    ) -> Self {
        Self {
            searcher,
            magnets,
            store,
            filter: ReleaseFilter::from_config(matching),
            classifier: QualityClassifier::from_config(matching),
            min_views: matching.min_views,
            scope: tracker_api.scope.clone(),
            magnet_retry: tracker_api.magnet_retry.clone(),
        }
    }

    /// Run one film through the pipeline.
    ///
    /// `snapshot` is the dedup state taken before the batch started; it is
    /// only consulted for fresh films.
    pub async fn process_film(
        &self,
        film: &Film,
        mode: FilmMode,
        snapshot: &DedupSnapshot,
    ) -> Option<ProcessingOutcome> {
        let (label, outcome) = self.evaluate(film, mode, snapshot).await;
        metrics::FILMS_PROCESSED
            .with_label_values(&[mode.as_str(), label])
            .inc();
        outcome
    }

    async fn evaluate(
        &self,
        film: &Film,
        mode: FilmMode,
        snapshot: &DedupSnapshot,
    ) -> (&'static str, Option<ProcessingOutcome>) {
        if mode == FilmMode::Fresh {
            if film.views_cnt < self.min_views {
                debug!(
                    film_id = film.id,
                    name = %film.name,
                    views = film.views_cnt,
                    min_views = self.min_views,
                    "Below view threshold, skipping"
                );
                return ("below_views", None);
            }
            if snapshot.contains(film.id) {
                debug!(film_id = film.id, name = %film.name, "Already processed, skipping");
                return ("already_processed", None);
            }
        }

        let query = SearchQuery {
            query: film.search_query(),
            scope: self.scope.clone(),
        };
        let raw = match self.searcher.search(&query).await {
            Ok(raw) => raw,
            Err(e) => {
                metrics::SEARCH_FAILURES.inc();
                warn!(
                    film_id = film.id,
                    name = %film.name,
                    year = film.year,
                    query = %query.query,
                    searcher = self.searcher.name(),
                    error = %e,
                    "Search failed"
                );
                return ("search_failed", None);
            }
        };

        let filtered = match self.filter.filter(&raw, film) {
            Ok(Some(releases)) => releases,
            Ok(None) => {
                info!(
                    film_id = film.id,
                    name = %film.name,
                    year = film.year,
                    "No matching releases"
                );
                return ("no_releases", None);
            }
            Err(e) => {
                warn!(film_id = film.id, name = %film.name, year = film.year, error = %e, "Cannot match film");
                return ("invalid_title", None);
            }
        };

        let classified = match self
            .classifier
            .classify(film, &filtered, mode, self.store.as_ref())
        {
            Ok(c) => c,
            Err(e) => {
                error!(
                    film_id = film.id,
                    name = %film.name,
                    year = film.year,
                    error = %e,
                    "Failed to record quality classification"
                );
                return ("store_failed", None);
            }
        };

        if classified.is_empty() {
            info!(
                film_id = film.id,
                name = %film.name,
                year = film.year,
                mode = %mode,
                candidates = filtered.len(),
                "No acceptable quality"
            );
            return ("no_quality", None);
        }
        let Some(best) = pick_best_seeded(&classified) else {
            return ("no_quality", None);
        };

        let release = best.release();
        let label = format!("magnet {}:{}", release.tracker, release.id);
        let magnet = retry_until_some(&self.magnet_retry, &label, |attempt| async move {
            let result = self.magnets.fetch_magnet(&release.tracker, &release.id).await;
            let kind = match &result {
                Ok(Some(_)) => "found",
                Ok(None) => "missing",
                Err(_) => "error",
            };
            metrics::MAGNET_ATTEMPTS.with_label_values(&[kind]).inc();
            debug!(attempt = attempt, tracker = %release.tracker, result = kind, "Magnet attempt");
            result
        })
        .await;

        let Some(magnet) = magnet else {
            warn!(
                film_id = film.id,
                name = %film.name,
                year = film.year,
                tracker = %release.tracker,
                release_id = %release.id,
                "No magnet link after retries"
            );
            return ("no_magnet", None);
        };

        let outcome = ProcessingOutcome::new(film, best, magnet);
        info!(
            film_id = film.id,
            mode = %mode,
            tracker = %release.tracker,
            seeders = release.seeder_count(),
            name_to_api = %outcome.name_to_api,
            "Release matched"
        );
        ("matched", Some(outcome))
    }

    /// Process films with at most `max_concurrent` in flight.
    ///
    /// Outcomes keep submission order; dropped films are omitted.
    pub async fn run_batch(
        &self,
        films: &[(Film, FilmMode)],
        snapshot: &DedupSnapshot,
        max_concurrent: usize,
    ) -> Vec<ProcessingOutcome> {
        let start = Instant::now();
        let permits = Arc::new(Semaphore::new(max_concurrent.max(1)));

        let tasks = films.iter().map(|(film, mode)| {
            let permits = Arc::clone(&permits);
            async move {
                let _permit = permits.acquire().await.ok()?;
                self.process_film(film, *mode, snapshot).await
            }
        });

        let outcomes: Vec<ProcessingOutcome> = join_all(tasks).await.into_iter().flatten().collect();

        info!(
            films = films.len(),
            matched = outcomes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Batch complete"
        );
        outcomes
    }
}
