//! Mock dedup store for testing.

use std::sync::Mutex;

use crate::dedup::{DedupError, DedupStore, DedupTable, SqliteDedupStore};
use crate::film::DedupRecord;

/// In-memory SQLite store that can be told to reject inserts into one table.
///
/// Reads and removals always go through to the real store, so a failed
/// insert leaves the tables exactly as a real storage fault would.
pub struct MockDedupStore {
    inner: SqliteDedupStore,
    failing_table: Mutex<Option<DedupTable>>,
}

impl MockDedupStore {
    pub fn new() -> Result<Self, DedupError> {
        Ok(Self {
            inner: SqliteDedupStore::in_memory()?,
            failing_table: Mutex::new(None),
        })
    }

    /// Make every later insert into `table` fail.
    pub fn fail_records_into(&self, table: DedupTable) {
        if let Ok(mut failing) = self.failing_table.lock() {
            *failing = Some(table);
        }
    }

    fn fails(&self, table: DedupTable) -> bool {
        self.failing_table
            .lock()
            .map(|failing| *failing == Some(table))
            .unwrap_or(false)
    }
}

impl DedupStore for MockDedupStore {
    fn record(&self, table: DedupTable, record: &DedupRecord) -> Result<(), DedupError> {
        if self.fails(table) {
            return Err(DedupError::Database(format!(
                "mock insert failure in {} table",
                table
            )));
        }
        self.inner.record(table, record)
    }

    fn all(&self, table: DedupTable) -> Result<Vec<DedupRecord>, DedupError> {
        self.inner.all(table)
    }

    fn remove(&self, table: DedupTable, film_id: i64) -> Result<(), DedupError> {
        self.inner.remove(table, film_id)
    }
}
