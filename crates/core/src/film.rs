//! Catalog films and their dedup records.

use serde::{Deserialize, Serialize};

use crate::coerce;

/// A catalog entry awaiting a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
    #[serde(deserialize_with = "coerce::required_int")]
    pub id: i64,
    /// Localized title.
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub name: String,
    /// Original-language title; `None` when absent or blank.
    #[serde(default, deserialize_with = "coerce::non_empty_string")]
    pub name_orig: Option<String>,
    /// 0 means unknown.
    #[serde(default, deserialize_with = "coerce::int_or_zero")]
    pub year: i32,
    #[serde(default, deserialize_with = "coerce::int_or_zero")]
    pub views_cnt: i64,
}

impl Film {
    pub fn original_title(&self) -> Option<&str> {
        self.name_orig
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn known_year(&self) -> Option<i32> {
        (self.year != 0).then_some(self.year)
    }

    /// Non-empty title parts followed by the year, in display order.
    fn name_parts(&self) -> Vec<String> {
        let mut parts = Vec::with_capacity(3);
        if !self.name.trim().is_empty() {
            parts.push(self.name.clone());
        }
        if let Some(orig) = self.original_title() {
            parts.push(orig.to_string());
        }
        if let Some(year) = self.known_year() {
            parts.push(year.to_string());
        }
        parts
    }

    /// Query sent to the tracker search, e.g. `"Альфа / Alpha / 2024"`.
    pub fn search_query(&self) -> String {
        self.name_parts().join(" / ")
    }

    /// Title used on the catalog, e.g. `"Альфа | Alpha | 2024"`.
    pub fn display_name(&self) -> String {
        self.name_parts().join(" | ")
    }
}

impl From<DedupRecord> for Film {
    fn from(record: DedupRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            name_orig: record.name_orig.filter(|s| !s.trim().is_empty()),
            year: record.year.unwrap_or(0),
            views_cnt: 0,
        }
    }
}

/// A row in one of the dedup tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupRecord {
    pub id: i64,
    pub name: String,
    pub name_orig: Option<String>,
    pub year: Option<i32>,
}

impl From<&Film> for DedupRecord {
    fn from(film: &Film) -> Self {
        Self {
            id: film.id,
            name: film.name.clone(),
            name_orig: film.original_title().map(str::to_string),
            year: film.known_year(),
        }
    }
}

/// How a film enters the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilmMode {
    /// Not seen before; any quality that clears the bar is recorded.
    Fresh,
    /// Recorded at bad quality; only an upgrade is accepted.
    Recheck,
}

impl FilmMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilmMode::Fresh => "fresh",
            FilmMode::Recheck => "recheck",
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, FilmMode::Recheck)
    }
}

impl std::fmt::Display for FilmMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
