//! Mock searcher and magnet source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::searcher::{MagnetSource, RawSearchResult, SearchError, SearchQuery, Searcher};

/// Mock implementation of the Searcher trait.
///
/// Returns a configurable result (optionally per exact query string),
/// records every query, and can fail the next search on demand.
///
/// # Example
///
/// ```rust,ignore
/// use kinoscout_core::testing::{fixtures, MockSearcher};
///
/// let searcher = MockSearcher::new();
/// searcher
///     .set_result(fixtures::search_result(&[fixtures::release_json(
///         "Alpha Original 2024 WEB-DL", "2.1 GB", 5, "101",
///     )]))
///     .await;
///
/// let queries = searcher.recorded_queries().await;
/// ```
#[derive(Debug, Default)]
pub struct MockSearcher {
    /// Result for queries without a specific entry.
    result: Arc<RwLock<RawSearchResult>>,
    /// Results keyed by exact query string.
    by_query: Arc<RwLock<HashMap<String, RawSearchResult>>>,
    /// Recorded search queries.
    queries: Arc<RwLock<Vec<SearchQuery>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<SearchError>>>,
}

impl MockSearcher {
    /// Create a new mock searcher with an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the result returned for every query without its own entry.
    pub async fn set_result(&self, result: RawSearchResult) {
        *self.result.write().await = result;
    }

    /// Set the result for one exact query string.
    pub async fn set_result_for(&self, query: &str, result: RawSearchResult) {
        self.by_query
            .write()
            .await
            .insert(query.to_string(), result);
    }

    /// Make the next search fail.
    pub async fn set_next_error(&self, error: SearchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get recorded search queries.
    pub async fn recorded_queries(&self) -> Vec<SearchQuery> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl Searcher for MockSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &SearchQuery) -> Result<RawSearchResult, SearchError> {
        self.queries.write().await.push(query.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if let Some(result) = self.by_query.read().await.get(&query.query) {
            return Ok(result.clone());
        }
        Ok(self.result.read().await.clone())
    }
}

/// Mock implementation of the MagnetSource trait.
///
/// Magnets are keyed by release id; an unknown id yields `Ok(None)`.
#[derive(Debug, Default)]
pub struct MockMagnetSource {
    magnets: Arc<RwLock<HashMap<String, String>>>,
    /// Recorded `(tracker, release_id)` requests.
    requests: Arc<RwLock<Vec<(String, String)>>>,
    /// Number of upcoming requests that fail before lookups succeed.
    failures_remaining: Arc<RwLock<u32>>,
}

impl MockMagnetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_magnet(&self, release_id: &str, magnet: &str) {
        self.magnets
            .write()
            .await
            .insert(release_id.to_string(), magnet.to_string());
    }

    /// Fail the next `count` requests with a connection error.
    pub async fn fail_next(&self, count: u32) {
        *self.failures_remaining.write().await = count;
    }

    pub async fn recorded_requests(&self) -> Vec<(String, String)> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl MagnetSource for MockMagnetSource {
    async fn fetch_magnet(
        &self,
        tracker: &str,
        release_id: &str,
    ) -> Result<Option<String>, SearchError> {
        self.requests
            .write()
            .await
            .push((tracker.to_string(), release_id.to_string()));

        {
            let mut failures = self.failures_remaining.write().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(SearchError::ConnectionFailed("mock failure".to_string()));
            }
        }

        Ok(self.magnets.read().await.get(release_id).cloned())
    }
}
