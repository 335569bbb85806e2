//! HTTP client for the torrent search API that fronts the trackers.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::TrackerApiConfig;

use super::{MagnetSource, RawSearchResult, SearchError, SearchQuery, Searcher};

/// Torrent search API client.
///
/// Title search: `GET {url}/api/search/title/{scope}?query=...`, answered with
/// an object keyed by tracker name. Magnet lookup:
/// `GET {url}/api/search/id/{tracker}?query={id}`, answered with a list whose
/// first element carries `Magnet`.
pub struct TorrentApiClient {
    client: Client,
    config: TrackerApiConfig,
}

impl TorrentApiClient {
    pub fn new(config: TrackerApiConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::ConnectionFailed(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}/api/search/title/{}?query={}",
            self.base_url(),
            urlencoding::encode(&query.scope),
            urlencoding::encode(&query.query)
        )
    }

    fn magnet_url(&self, tracker: &str, release_id: &str) -> String {
        format!(
            "{}/api/search/id/{}?query={}",
            self.base_url(),
            urlencoding::encode(&tracker.to_lowercase()),
            urlencoding::encode(release_id)
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, SearchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl Searcher for TorrentApiClient {
    fn name(&self) -> &str {
        "torrent-api"
    }

    async fn search(&self, query: &SearchQuery) -> Result<RawSearchResult, SearchError> {
        let start = Instant::now();
        let body = self.get_json(&self.search_url(query)).await?;
        let result = RawSearchResult::from_json(body)?;

        debug!(
            query = %query.query,
            trackers = result.tracker_count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Tracker search complete"
        );

        Ok(result)
    }
}

#[async_trait]
impl MagnetSource for TorrentApiClient {
    async fn fetch_magnet(
        &self,
        tracker: &str,
        release_id: &str,
    ) -> Result<Option<String>, SearchError> {
        let body = self.get_json(&self.magnet_url(tracker, release_id)).await?;
        Ok(extract_magnet(&body))
    }
}

/// `Magnet` of the first element of a list response.
fn extract_magnet(body: &Value) -> Option<String> {
    body.as_array()?
        .first()?
        .get("Magnet")?
        .as_str()
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
