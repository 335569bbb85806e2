use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::name::{MatchError, NameMatcher};
use super::size::parse_size;
use crate::config::MatchingConfig;
use crate::film::Film;
use crate::searcher::{RawRelease, RawSearchResult};

/// Per-tracker category allow-lists.
///
/// Keys are `CATEGORIES_<tracker>` (used when the film has an original
/// title) and `RUSSIAN_CATEGORIES_<tracker>` (used when it does not).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryAllowlists(BTreeMap<String, Vec<String>>);

impl CategoryAllowlists {
    /// Allow-list key for a tracker.
    ///
    /// A blank original title counts as absent, so `Some("")` selects
    /// `RUSSIAN_CATEGORIES_<tracker>` just like `None`. Name matching ignores
    /// blank titles the same way.
    pub fn key_for(tracker: &str, has_original_title: bool) -> String {
        if has_original_title {
            format!("CATEGORIES_{}", tracker)
        } else {
            format!("RUSSIAN_CATEGORIES_{}", tracker)
        }
    }

    /// Allow-list for a tracker, or `None` when the tracker is not
    /// configured for this kind of search.
    pub fn for_tracker(&self, tracker: &str, has_original_title: bool) -> Option<&[String]> {
        self.0
            .get(&Self::key_for(tracker, has_original_title))
            .map(Vec::as_slice)
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for CategoryAllowlists {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Reduce a raw multi-tracker result to the releases that plausibly belong
/// to the film.
///
/// A release survives when its category is allowed for its tracker, its
/// name satisfies the film's [`NameMatcher`] and its size parses to less
/// than `max_size_gb`. Trackers without an allow-list are skipped.
/// Returns `Ok(None)` rather than an empty list when nothing survives.
pub fn filter_releases(
    raw: &RawSearchResult,
    local_name: &str,
    orig_name: Option<&str>,
    year: Option<i32>,
    allowlists: &CategoryAllowlists,
    max_size_gb: f64,
) -> Result<Option<Vec<RawRelease>>, MatchError> {
    let matcher = NameMatcher::new(local_name, orig_name, year)?;
    let has_original_title = orig_name.is_some_and(|s| !s.trim().is_empty());

    let mut kept = Vec::new();
    for (tracker, releases) in raw.releases_by_tracker() {
        let Some(categories) = allowlists.for_tracker(tracker, has_original_title) else {
            debug!(
                tracker = tracker,
                key = %CategoryAllowlists::key_for(tracker, has_original_title),
                "No category allow-list, skipping tracker"
            );
            continue;
        };

        let before = kept.len();
        kept.extend(releases.into_iter().filter(|release| {
            release
                .category
                .as_ref()
                .is_some_and(|c| categories.contains(c))
                && matcher.is_match(&release.name)
                && release
                    .size
                    .as_deref()
                    .and_then(parse_size)
                    .is_some_and(|size| size < max_size_gb)
        }));
        debug!(tracker = tracker, kept = kept.len() - before, "Filtered tracker results");
    }

    Ok((!kept.is_empty()).then_some(kept))
}

/// [`filter_releases`] bound to the matching configuration.
#[derive(Debug, Clone)]
pub struct ReleaseFilter {
    allowlists: CategoryAllowlists,
    max_size_gb: f64,
}

impl ReleaseFilter {
    pub fn new(allowlists: CategoryAllowlists, max_size_gb: f64) -> Self {
        Self {
            allowlists,
            max_size_gb,
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.categories.clone(), config.max_size_gb)
    }

    pub fn filter(
        &self,
        raw: &RawSearchResult,
        film: &Film,
    ) -> Result<Option<Vec<RawRelease>>, MatchError> {
        filter_releases(
            raw,
            &film.name,
            film.original_title(),
            film.known_year(),
            &self.allowlists,
            self.max_size_gb,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn allowlists() -> CategoryAllowlists {
        [
            ("CATEGORIES_Rutracker", vec!["Зарубежное кино".to_string()]),
            ("RUSSIAN_CATEGORIES_Rutracker", vec!["Наше кино".to_string()]),
        ]
        .into_iter()
        .collect()
    }

    fn item(category: &str, name: &str, size: &str) -> Value {
        json!({"Category": category, "Name": name, "Size": size, "Seeds": 5, "Id": "1"})
    }

    fn filter(raw: &RawSearchResult, orig: Option<&str>) -> Option<Vec<RawRelease>> {
        filter_releases(raw, "Альфа", orig, Some(2024), &allowlists(), 20.0).unwrap()
    }

    #[test]
    fn test_keeps_matching_release() {
        let raw = RawSearchResult::new().with_tracker(
            "Rutracker",
            json!([item("Зарубежное кино", "Альфа / Alpha (2024) WEB-DL", "2.1 GB")]),
        );
        let kept = filter(&raw, Some("Alpha")).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].tracker, "Rutracker");
    }

    #[test]
    fn test_size_ceiling_is_strict() {
        let raw = RawSearchResult::new().with_tracker(
            "Rutracker",
            json!([
                item("Зарубежное кино", "Альфа / Alpha (2024)", "20 GB"),
                item("Зарубежное кино", "Альфа / Alpha (2024)", "25.3 GB"),
                item("Зарубежное кино", "Альфа / Alpha (2024)", "unknown"),
            ]),
        );
        assert!(filter(&raw, Some("Alpha")).is_none());
    }

    #[test]
    fn test_megabyte_sizes_pass() {
        let raw = RawSearchResult::new().with_tracker(
            "Rutracker",
            json!([item("Зарубежное кино", "Альфа / Alpha (2024)", "700\u{a0}MB")]),
        );
        assert!(filter(&raw, Some("Alpha")).is_some());
    }

    #[test]
    fn test_category_outside_allowlist_removed() {
        let raw = RawSearchResult::new().with_tracker(
            "Rutracker",
            json!([item("Наше кино", "Альфа / Alpha (2024)", "2.1 GB")]),
        );
        assert!(filter(&raw, Some("Alpha")).is_none());
    }

    #[test]
    fn test_missing_original_title_selects_russian_categories() {
        let raw = RawSearchResult::new().with_tracker(
            "Rutracker",
            json!([
                item("Наше кино", "Альфа (2024)", "2.1 GB"),
                item("Зарубежное кино", "Альфа (2024)", "2.1 GB"),
            ]),
        );
        let kept = filter(&raw, None).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].category.as_deref(), Some("Наше кино"));
    }

    #[test]
    fn test_blank_original_title_selects_russian_categories() {
        let raw = RawSearchResult::new().with_tracker(
            "Rutracker",
            json!([
                item("Наше кино", "Альфа (2024)", "2.1 GB"),
                item("Зарубежное кино", "Альфа (2024)", "2.1 GB"),
            ]),
        );
        let kept = filter(&raw, Some("  ")).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].category.as_deref(), Some("Наше кино"));
    }

    #[test]
    fn test_unconfigured_tracker_and_bad_payloads_skipped() {
        let raw = RawSearchResult::new()
            .with_tracker(
                "Kinozal",
                json!([item("Зарубежное кино", "Альфа / Alpha (2024)", "2.1 GB")]),
            )
            .with_tracker("Rutracker", Value::Null)
            .with_tracker("NoNameClub", json!({"error": "down"}));
        assert!(filter(&raw, Some("Alpha")).is_none());
    }

    #[test]
    fn test_markers_do_not_abort_tracker() {
        let raw = RawSearchResult::new().with_tracker(
            "Rutracker",
            json!([
                "Result",
                item("Зарубежное кино", "Альфа / Alpha (2024)", "2.1 GB"),
            ]),
        );
        assert_eq!(filter(&raw, Some("Alpha")).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_result_is_none() {
        assert!(filter(&RawSearchResult::new(), Some("Alpha")).is_none());
    }

    #[test]
    fn test_release_filter_uses_film_fields() {
        let rf = ReleaseFilter::new(allowlists(), 20.0);
        let film = Film {
            id: 1,
            name: "Альфа".to_string(),
            name_orig: Some("Alpha".to_string()),
            year: 2024,
            views_cnt: 10,
        };
        let raw = RawSearchResult::new().with_tracker(
            "Rutracker",
            json!([
                item("Зарубежное кино", "Альфа / Alpha (2024)", "2.1 GB"),
                item("Зарубежное кино", "Альфа / Alpha (2023)", "2.1 GB"),
            ]),
        );
        assert_eq!(rf.filter(&raw, &film).unwrap().unwrap().len(), 1);
    }
}
