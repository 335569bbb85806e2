//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every collaborator trait,
//! allowing the pipeline and run cycle to be tested without a catalog,
//! trackers or Telegram.
//!
//! # Example
//!
//! ```rust,ignore
//! use kinoscout_core::testing::{fixtures, MockCatalog, MockMagnetSource, MockSearcher};
//!
//! let catalog = MockCatalog::new();
//! catalog.set_films(vec![fixtures::alpha_film()]).await;
//!
//! let magnets = MockMagnetSource::new();
//! magnets.set_magnet("101", "magnet:?xt=urn:btih:alpha").await;
//! ```

mod mock_catalog;
mod mock_notifier;
mod mock_searcher;
mod mock_store;

pub use mock_catalog::MockCatalog;
pub use mock_notifier::MockNotifier;
pub use mock_searcher::{MockMagnetSource, MockSearcher};
pub use mock_store::MockDedupStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::config::{MatchingConfig, RetryConfig, TrackerApiConfig};
    use crate::film::Film;
    use crate::matching::CategoryAllowlists;
    use crate::searcher::RawSearchResult;

    /// Tracker used by [`search_result`].
    pub const TRACKER: &str = "Rutracker";
    /// Category allowed for films with an original title.
    pub const FOREIGN_CATEGORY: &str = "Зарубежное кино";
    /// Category allowed for films without one.
    pub const DOMESTIC_CATEGORY: &str = "Наше кино";

    /// Film `{id: 1, name: "Alpha", name_orig: "Alpha Original", year: 2024}`
    /// with enough views to clear [`matching_config`].
    pub fn alpha_film() -> Film {
        Film {
            id: 1,
            name: "Alpha".to_string(),
            name_orig: Some("Alpha Original".to_string()),
            year: 2024,
            views_cnt: 1000,
        }
    }

    /// Film with a localized title only.
    pub fn domestic_film(id: i64, name: &str, year: i32) -> Film {
        Film {
            id,
            name: name.to_string(),
            name_orig: None,
            year,
            views_cnt: 1000,
        }
    }

    pub fn allowlists() -> CategoryAllowlists {
        [
            (
                CategoryAllowlists::key_for(TRACKER, true),
                vec![FOREIGN_CATEGORY.to_string()],
            ),
            (
                CategoryAllowlists::key_for(TRACKER, false),
                vec![DOMESTIC_CATEGORY.to_string()],
            ),
        ]
        .into_iter()
        .collect()
    }

    /// 20 GB ceiling, 100 views minimum, WEB-DL > BDRip good, CAMRip > TS bad.
    pub fn matching_config() -> MatchingConfig {
        MatchingConfig {
            max_size_gb: 20.0,
            min_views: 100,
            good_quality: vec!["WEB-DL".to_string(), "BDRip".to_string()],
            bad_quality: vec!["CAMRip".to_string(), "TS".to_string()],
            categories: allowlists(),
        }
    }

    /// Three magnet attempts without delay.
    pub fn tracker_api_config() -> TrackerApiConfig {
        TrackerApiConfig {
            url: "http://localhost:8443".to_string(),
            scope: "all".to_string(),
            timeout_secs: 5,
            magnet_retry: RetryConfig {
                attempts: 3,
                delay_ms: 0,
            },
        }
    }

    /// Tracker record in the foreign-films category.
    pub fn release_json(name: &str, size: &str, seeds: i64, id: &str) -> Value {
        release_json_in(FOREIGN_CATEGORY, name, size, seeds, id)
    }

    pub fn release_json_in(category: &str, name: &str, size: &str, seeds: i64, id: &str) -> Value {
        json!({
            "Category": category,
            "Name": name,
            "Size": size,
            "Seeds": seeds,
            "Id": id,
            "Url": format!("https://tracker.example/t/{}", id),
        })
    }

    /// Search result with all `items` under [`TRACKER`].
    pub fn search_result(items: &[Value]) -> RawSearchResult {
        RawSearchResult::new().with_tracker(TRACKER, Value::Array(items.to_vec()))
    }
}
