//! Dedup state: films already matched at good or bad quality.
//!
//! Two disjoint tables keyed by film id. A film id is present in at most one
//! of them; moving a film from bad to good is a `remove` followed by a
//! `record`, each call atomic on its own.

mod sqlite;

pub use sqlite::{SqliteDedupStore, TableNames};

use std::collections::HashSet;
use thiserror::Error;

use crate::film::DedupRecord;

/// Which dedup table to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DedupTable {
    /// Fully processed; never evaluated as fresh again.
    GoodQuality,
    /// Processed at inferior quality; rechecked every run.
    BadQuality,
}

impl DedupTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            DedupTable::GoodQuality => "good",
            DedupTable::BadQuality => "bad",
        }
    }
}

impl std::fmt::Display for DedupTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from dedup storage.
#[derive(Debug, Error)]
pub enum DedupError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),
}

impl From<rusqlite::Error> for DedupError {
    fn from(e: rusqlite::Error) -> Self {
        DedupError::Database(e.to_string())
    }
}

/// Persistent dedup tables.
///
/// Implementations serialize individual calls; callers never need a
/// transaction spanning more than one call.
pub trait DedupStore: Send + Sync {
    /// Insert a record. A duplicate id is a silent no-op.
    fn record(&self, table: DedupTable, record: &DedupRecord) -> Result<(), DedupError>;

    /// Every record in a table, in no particular order.
    fn all(&self, table: DedupTable) -> Result<Vec<DedupRecord>, DedupError>;

    /// Delete by film id. Removing a missing id is a silent no-op.
    fn remove(&self, table: DedupTable, film_id: i64) -> Result<(), DedupError>;
}

/// Point-in-time view of both tables, taken once per run before fan-out.
#[derive(Debug, Clone, Default)]
pub struct DedupSnapshot {
    processed: HashSet<i64>,
    pending_recheck: Vec<DedupRecord>,
}

impl DedupSnapshot {
    pub fn load(store: &dyn DedupStore) -> Result<Self, DedupError> {
        let good = store.all(DedupTable::GoodQuality)?;
        let bad = store.all(DedupTable::BadQuality)?;

        let mut processed: HashSet<i64> = good.iter().map(|r| r.id).collect();
        processed.extend(bad.iter().map(|r| r.id));

        Ok(Self {
            processed,
            pending_recheck: bad,
        })
    }

    /// True when the id is recorded in either table.
    pub fn contains(&self, film_id: i64) -> bool {
        self.processed.contains(&film_id)
    }

    /// Bad-quality records awaiting a recheck.
    pub fn pending_recheck(&self) -> &[DedupRecord] {
        &self.pending_recheck
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> DedupRecord {
        DedupRecord {
            id,
            name: format!("Film {}", id),
            name_orig: None,
            year: Some(2020),
        }
    }

    #[test]
    fn test_snapshot_covers_both_tables() {
        let store = SqliteDedupStore::in_memory().unwrap();
        store.record(DedupTable::GoodQuality, &record(1)).unwrap();
        store.record(DedupTable::BadQuality, &record(2)).unwrap();

        let snapshot = DedupSnapshot::load(&store).unwrap();
        assert!(snapshot.contains(1));
        assert!(snapshot.contains(2));
        assert!(!snapshot.contains(3));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.pending_recheck().len(), 1);
        assert_eq!(snapshot.pending_recheck()[0].id, 2);
    }

    #[test]
    fn test_snapshot_is_not_live() {
        let store = SqliteDedupStore::in_memory().unwrap();
        let snapshot = DedupSnapshot::load(&store).unwrap();
        store.record(DedupTable::GoodQuality, &record(1)).unwrap();
        assert!(snapshot.is_empty());
        assert!(!snapshot.contains(1));
    }
}
