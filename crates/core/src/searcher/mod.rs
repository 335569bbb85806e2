//! Tracker search abstraction.
//!
//! A `Searcher` returns the raw, per-tracker result lists for a free-text
//! query; a `MagnetSource` resolves a tracker-local release id into a magnet
//! link. Both are implemented over HTTP by [`TorrentApiClient`].

mod torrent_api;
mod types;

pub use torrent_api::TorrentApiClient;
pub use types::*;
