pub mod catalog;
pub(crate) mod coerce;
pub mod config;
pub mod dedup;
pub mod film;
pub mod matching;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod retry;
pub mod scheduler;
pub mod searcher;
pub mod testing;

pub use catalog::{CatalogError, ContentKind, FilmCatalog, KinotamClient, UploadStatus};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use dedup::{DedupError, DedupSnapshot, DedupStore, DedupTable, SqliteDedupStore};
pub use film::{DedupRecord, Film, FilmMode};
pub use matching::{
    build_matcher, filter_releases, parse_size, pick_best_seeded, CandidateRelease,
    CategoryAllowlists, MatchError, NameMatcher, QualityClassifier, QualityTable, ReleaseFilter,
};
pub use notify::{Notifier, NotifyError, TelegramNotifier};
pub use pipeline::{FilmPipeline, ProcessingOutcome};
pub use scheduler::{RunCycle, RunError, RunReport, UploadRecord};
pub use searcher::{
    MagnetSource, RawRelease, RawSearchResult, SearchError, SearchQuery, Searcher,
    TorrentApiClient,
};
