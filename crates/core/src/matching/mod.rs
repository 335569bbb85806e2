//! Release matching and quality classification.
//!
//! Pure pieces (size parsing, title matching, filtering, seed selection)
//! plus the [`QualityClassifier`], which also records its verdict in the
//! dedup store.

mod filter;
mod name;
mod quality;
mod seeds;
mod size;

pub use filter::{filter_releases, CategoryAllowlists, ReleaseFilter};
pub use name::{build_matcher, MatchError, NameMatcher};
pub use quality::{CandidateRelease, QualityClassifier, QualityTable};
pub use seeds::pick_best_seeded;
pub use size::parse_size;
