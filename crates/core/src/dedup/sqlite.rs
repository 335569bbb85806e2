//! SQLite-backed dedup store.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use super::{DedupError, DedupStore, DedupTable};
use crate::config::{is_plain_identifier, DatabaseConfig};
use crate::film::DedupRecord;

/// Table names for the two dedup tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub good_quality: String,
    pub bad_quality: String,
}

impl Default for TableNames {
    fn default() -> Self {
        let config = DatabaseConfig::default();
        Self {
            good_quality: config.good_quality_table,
            bad_quality: config.bad_quality_table,
        }
    }
}

impl From<&DatabaseConfig> for TableNames {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            good_quality: config.good_quality_table.clone(),
            bad_quality: config.bad_quality_table.clone(),
        }
    }
}

/// SQLite-backed dedup store.
pub struct SqliteDedupStore {
    conn: Mutex<Connection>,
    tables: TableNames,
}

impl SqliteDedupStore {
    /// Open (or create) the database file and both tables.
    pub fn new(path: &Path, tables: TableNames) -> Result<Self, DedupError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, tables)
    }

    /// In-memory store with the default table names (useful for testing).
    pub fn in_memory() -> Result<Self, DedupError> {
        Self::with_connection(Connection::open_in_memory()?, TableNames::default())
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self, DedupError> {
        Self::new(&config.path, TableNames::from(config))
    }

    fn with_connection(conn: Connection, tables: TableNames) -> Result<Self, DedupError> {
        for name in [&tables.good_quality, &tables.bad_quality] {
            if !is_plain_identifier(name) {
                return Err(DedupError::InvalidTableName(name.clone()));
            }
        }
        if tables.good_quality == tables.bad_quality {
            return Err(DedupError::InvalidTableName(format!(
                "{} used for both tables",
                tables.good_quality
            )));
        }

        for name in [&tables.good_quality, &tables.bad_quality] {
            conn.execute_batch(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS "{}" (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    name_orig TEXT,
                    year INTEGER
                );
                "#,
                name
            ))?;
        }

        Ok(Self {
            conn: Mutex::new(conn),
            tables,
        })
    }

    fn table_name(&self, table: DedupTable) -> &str {
        match table {
            DedupTable::GoodQuality => &self.tables.good_quality,
            DedupTable::BadQuality => &self.tables.bad_quality,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DedupError> {
        self.conn
            .lock()
            .map_err(|e| DedupError::Database(format!("Lock poisoned: {}", e)))
    }
}

impl DedupStore for SqliteDedupStore {
    fn record(&self, table: DedupTable, record: &DedupRecord) -> Result<(), DedupError> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                r#"INSERT OR IGNORE INTO "{}" (id, name, name_orig, year) VALUES (?1, ?2, ?3, ?4)"#,
                self.table_name(table)
            ),
            params![record.id, record.name, record.name_orig, record.year],
        )?;
        Ok(())
    }

    fn all(&self, table: DedupTable) -> Result<Vec<DedupRecord>, DedupError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            r#"SELECT id, name, name_orig, year FROM "{}""#,
            self.table_name(table)
        ))?;

        let records = stmt
            .query_map([], |row| {
                Ok(DedupRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    name_orig: row.get(2)?,
                    year: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn remove(&self, table: DedupTable, film_id: i64) -> Result<(), DedupError> {
        let conn = self.lock()?;
        conn.execute(
            &format!(r#"DELETE FROM "{}" WHERE id = ?1"#, self.table_name(table)),
            params![film_id],
        )?;
        Ok(())
    }
}
