//! Per-film matching pipeline.
//!
//! search -> filter -> classify (and record) -> pick by seeders -> magnet.

mod runner;
mod types;

pub use runner::FilmPipeline;
pub use types::ProcessingOutcome;
