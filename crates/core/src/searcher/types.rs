//! Types for the tracker search system.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::coerce::{value_to_i64, value_to_string};

/// Query parameters for a tracker search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    /// Free-text search query.
    pub query: String,
    /// Search scope ("all" or a single tracker).
    pub scope: String,
}

/// One release from a tracker's search response.
///
/// Upstream records are loosely typed; every field is coerced and missing or
/// unusable values become `None` / empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRelease {
    /// Tracker the release came from (the key of its result list).
    pub tracker: String,
    pub category: Option<String>,
    pub name: String,
    /// Unit-suffixed size, e.g. "1.46 GB".
    pub size: Option<String>,
    pub seeders: Option<i64>,
    /// Tracker-local release id.
    pub id: String,
    pub url: Option<String>,
}

impl RawRelease {
    /// Build a release from one element of a tracker list.
    ///
    /// Returns `None` for elements that are not release records (for example
    /// the bare `"Result"` marker some trackers append).
    pub fn from_value(tracker: &str, value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            tracker: tracker.to_string(),
            category: field(obj, &["Category", "category"]).and_then(value_to_string),
            name: field(obj, &["Name", "name"])
                .and_then(value_to_string)
                .unwrap_or_default(),
            size: field(obj, &["Size", "size"])
                .and_then(Value::as_str)
                .map(str::to_string),
            seeders: field(obj, &["Seeds", "Seeders", "seeders"]).and_then(value_to_i64),
            id: field(obj, &["Id", "id"])
                .and_then(value_to_string)
                .unwrap_or_default(),
            url: field(obj, &["Url", "url"]).and_then(value_to_string),
        })
    }

    /// Seeder count with missing or malformed values treated as zero.
    pub fn seeder_count(&self) -> i64 {
        self.seeders.unwrap_or(0)
    }
}

fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Raw multi-tracker search response: tracker name -> payload.
///
/// Payloads are kept untyped; a tracker whose payload is not a list is
/// skipped when iterating.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSearchResult {
    trackers: BTreeMap<String, Value>,
}

impl RawSearchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret a decoded response body. Fails unless it is a JSON object.
    pub fn from_json(value: Value) -> Result<Self, SearchError> {
        match value {
            Value::Object(map) => Ok(Self {
                trackers: map.into_iter().collect(),
            }),
            other => Err(SearchError::InvalidResponse(format!(
                "expected an object keyed by tracker, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Set one tracker's payload (builder style, mostly for tests).
    pub fn with_tracker(mut self, tracker: &str, payload: Value) -> Self {
        self.trackers.insert(tracker.to_string(), payload);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub fn tracker_count(&self) -> usize {
        self.trackers.len()
    }

    /// Releases per tracker, each tagged with its tracker name.
    ///
    /// Non-list payloads are skipped, as are list elements that are not
    /// release records.
    pub fn releases_by_tracker(&self) -> impl Iterator<Item = (&str, Vec<RawRelease>)> + '_ {
        self.trackers.iter().filter_map(|(tracker, payload)| {
            let items = payload.as_array()?;
            let releases = items
                .iter()
                .filter_map(|item| RawRelease::from_value(tracker, item))
                .collect();
            Some((tracker.as_str(), releases))
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Errors that can occur during search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search backend API error: {0}")]
    ApiError(String),

    #[error("Invalid search response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else if e.is_connect() {
            SearchError::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            SearchError::InvalidResponse(e.to_string())
        } else {
            SearchError::ApiError(e.to_string())
        }
    }
}

/// Trait for tracker search backends.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Search every tracker in the query's scope.
    async fn search(&self, query: &SearchQuery) -> Result<RawSearchResult, SearchError>;
}

/// Resolves a selected release to a magnet link.
#[async_trait]
pub trait MagnetSource: Send + Sync {
    /// Single attempt. `Ok(None)` when the response carries no magnet link.
    async fn fetch_magnet(
        &self,
        tracker: &str,
        release_id: &str,
    ) -> Result<Option<String>, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_reads_upstream_keys() {
        let value = json!({
            "Category": "Зарубежное кино",
            "Name": "Alpha Original 2024 WEB-DL",
            "Size": "2.1 GB",
            "Seeds": "5",
            "Id": 12345,
            "Url": "https://tracker.example/t/12345"
        });
        let release = RawRelease::from_value("Rutracker", &value).unwrap();
        assert_eq!(release.tracker, "Rutracker");
        assert_eq!(release.category.as_deref(), Some("Зарубежное кино"));
        assert_eq!(release.size.as_deref(), Some("2.1 GB"));
        assert_eq!(release.seeders, Some(5));
        assert_eq!(release.id, "12345");
        assert_eq!(release.url.as_deref(), Some("https://tracker.example/t/12345"));
    }

    #[test]
    fn test_from_value_coerces_bad_fields() {
        let value = json!({"Name": "X", "Size": 1024, "Seeds": "bad", "Category": null});
        let release = RawRelease::from_value("Kinozal", &value).unwrap();
        assert_eq!(release.size, None);
        assert_eq!(release.seeders, None);
        assert_eq!(release.seeder_count(), 0);
        assert_eq!(release.category, None);
        assert_eq!(release.id, "");
    }

    #[test]
    fn test_from_value_falls_back_to_seeders_key() {
        let value = json!({"Name": "X", "Seeders": 9});
        let release = RawRelease::from_value("Kinozal", &value).unwrap();
        assert_eq!(release.seeders, Some(9));
    }

    #[test]
    fn test_from_value_rejects_markers() {
        assert!(RawRelease::from_value("Rutracker", &json!("Result")).is_none());
        assert!(RawRelease::from_value("Rutracker", &json!(42)).is_none());
    }

    #[test]
    fn test_releases_by_tracker_skips_non_lists() {
        let result = RawSearchResult::from_json(json!({
            "Rutracker": [{"Name": "A"}, "Result", {"Name": "B"}],
            "Kinozal": {"error": "timeout"},
            "NoNameClub": null
        }))
        .unwrap();

        let trackers: Vec<_> = result.releases_by_tracker().collect();
        assert_eq!(trackers.len(), 1);
        let (tracker, releases) = &trackers[0];
        assert_eq!(*tracker, "Rutracker");
        assert_eq!(releases.len(), 2);
        assert!(releases.iter().all(|r| r.tracker == "Rutracker"));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = RawSearchResult::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, SearchError::InvalidResponse(_)));
    }
}
