use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::MatchingConfig;
use crate::dedup::{DedupError, DedupStore, DedupTable};
use crate::film::{DedupRecord, Film, FilmMode};
use crate::metrics;
use crate::searcher::RawRelease;

/// One configured quality tag with its rank (0 = best).
#[derive(Debug, Clone)]
struct QualityTag {
    name: String,
    rank: usize,
    pattern: Regex,
}

/// Ordered quality tags, best first.
///
/// Whitespace runs inside a tag match one or more whitespace characters;
/// everything else is literal. Matching is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct QualityTable {
    tags: Vec<QualityTag>,
}

impl QualityTable {
    /// Compile the tags. Blank or uncompilable tags are logged and skipped;
    /// the remaining tags keep their original list position as rank.
    pub fn new<S: AsRef<str>>(tags: &[S]) -> Self {
        let tags = tags
            .iter()
            .enumerate()
            .filter_map(|(rank, tag)| {
                let tag = tag.as_ref().trim();
                match compile_tag(tag) {
                    Some(Ok(pattern)) => Some(QualityTag {
                        name: tag.to_string(),
                        rank,
                        pattern,
                    }),
                    Some(Err(e)) => {
                        warn!(tag = tag, error = %e, "Skipping invalid quality tag");
                        None
                    }
                    None => {
                        warn!(rank = rank, "Skipping blank quality tag");
                        None
                    }
                }
            })
            .collect();
        Self { tags }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// First tag, in rank order, that occurs in the release name.
    fn tag_for(&self, name: &str) -> Option<&QualityTag> {
        self.tags.iter().find(|t| t.pattern.is_match(name))
    }

    /// Releases sharing the best matched rank, in input order.
    pub fn best_matches(&self, releases: &[RawRelease]) -> Vec<CandidateRelease> {
        let tagged: Vec<CandidateRelease> = releases
            .iter()
            .filter_map(|release| {
                self.tag_for(&release.name).map(|tag| CandidateRelease {
                    release: release.clone(),
                    tag: tag.name.clone(),
                    priority: tag.rank,
                })
            })
            .collect();

        let Some(best) = tagged.iter().map(|c| c.priority).min() else {
            return Vec::new();
        };
        tagged.into_iter().filter(|c| c.priority == best).collect()
    }
}

fn compile_tag(tag: &str) -> Option<Result<Regex, regex::Error>> {
    let tokens: Vec<String> = tag.split_whitespace().map(regex::escape).collect();
    if tokens.is_empty() {
        return None;
    }
    Some(
        RegexBuilder::new(&tokens.join(r"\s+"))
            .case_insensitive(true)
            .build(),
    )
}

/// A release that matched a quality tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRelease {
    release: RawRelease,
    tag: String,
    priority: usize,
}

impl CandidateRelease {
    pub fn release(&self) -> &RawRelease {
        &self.release
    }

    /// The matched tag, trimmed.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Position of the tag in its list; lower is better.
    pub fn priority(&self) -> usize {
        self.priority
    }
}

/// Ranks filtered releases against the good and bad quality tables and
/// records the outcome in the dedup store.
#[derive(Debug, Clone)]
pub struct QualityClassifier {
    good: QualityTable,
    bad: QualityTable,
}

impl QualityClassifier {
    pub fn new<S: AsRef<str>>(good: &[S], bad: &[S]) -> Self {
        Self {
            good: QualityTable::new(good),
            bad: QualityTable::new(bad),
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.good_quality.as_slice(), config.bad_quality.as_slice())
    }

    /// Pick the best-ranked candidates and persist the film's new state.
    ///
    /// - A good match is returned and the film recorded as good; in
    ///   [`FilmMode::Recheck`] its bad-quality row is removed first.
    /// - A recheck without a good match returns nothing and writes nothing.
    /// - A fresh film falls back to the bad table and is recorded there.
    ///
    /// A storage error is returned as-is. If the good insert fails after a
    /// recheck removed the bad row, the film is left in neither table.
    pub fn classify(
        &self,
        film: &Film,
        candidates: &[RawRelease],
        mode: FilmMode,
        store: &dyn DedupStore,
    ) -> Result<Vec<CandidateRelease>, DedupError> {
        let record = DedupRecord::from(film);

        let good = self.good.best_matches(candidates);
        if !good.is_empty() {
            if mode.is_update() {
                store.remove(DedupTable::BadQuality, film.id)?;
                if let Err(e) = store.record(DedupTable::GoodQuality, &record) {
                    error!(
                        film_id = film.id,
                        name = %film.name,
                        year = film.year,
                        error = %e,
                        "Promotion failed after removing bad-quality record; film is now unrecorded"
                    );
                    return Err(e);
                }
            } else {
                store.record(DedupTable::GoodQuality, &record)?;
            }
            metrics::QUALITY_CLASSIFICATIONS
                .with_label_values(&[DedupTable::GoodQuality.as_str()])
                .inc();
            debug!(
                film_id = film.id,
                mode = %mode,
                tag = good[0].tag(),
                matches = good.len(),
                "Good quality release found"
            );
            return Ok(good);
        }

        if mode.is_update() {
            metrics::QUALITY_CLASSIFICATIONS
                .with_label_values(&["none"])
                .inc();
            return Ok(Vec::new());
        }

        let bad = self.bad.best_matches(candidates);
        if bad.is_empty() {
            metrics::QUALITY_CLASSIFICATIONS
                .with_label_values(&["none"])
                .inc();
            return Ok(bad);
        }

        store.record(DedupTable::BadQuality, &record)?;
        metrics::QUALITY_CLASSIFICATIONS
            .with_label_values(&[DedupTable::BadQuality.as_str()])
            .inc();
        debug!(
            film_id = film.id,
            tag = bad[0].tag(),
            matches = bad.len(),
            "Only bad quality releases found"
        );
        Ok(bad)
    }
}
