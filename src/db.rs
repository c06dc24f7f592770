// 💾 SQLite Bank Data Store - BANK_DATA facts keyed by DATA_SOURCE ids
// Source names are resolved through DATA_SOURCE; an unknown name clears to -1

use crate::model::{BankInfo, DataSource};
use crate::repository::BankDataRepository;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Persistent repository backed by a SQLite database
pub struct SqliteRepository {
    conn: Connection,
    /// DATA_SOURCE name → id, filled lazily
    source_ids: HashMap<String, i64>,
}

impl SqliteRepository {
    /// Open (or create) the database file at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        // Enable WAL mode for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(SqliteRepository {
            conn,
            source_ids: HashMap::new(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the schema and register the built-in sources. Safe to run twice.
    pub fn setup_database(&mut self) -> Result<()> {
        // ==========================================================================
        // Data Sources (lookup table)
        // ==========================================================================
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS DATA_SOURCE (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL
            )",
            [],
        )?;

        // ==========================================================================
        // Bank Data (one row per bank code and source)
        // ==========================================================================
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS BANK_DATA (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source INTEGER NOT NULL REFERENCES DATA_SOURCE(id),
                bankcode TEXT NOT NULL,
                name TEXT NOT NULL,
                zip TEXT NOT NULL,
                city TEXT NOT NULL,
                bic TEXT NOT NULL,
                country TEXT NOT NULL,
                algorithm TEXT NOT NULL,
                created TEXT,
                last_update TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_bank_data_source ON BANK_DATA(source)",
            [],
        )?;

        for source in DataSource::ALL {
            self.register_source(source.name())?;
        }

        Ok(())
    }

    /// Add a DATA_SOURCE row (no-op when it exists) and return its id
    pub fn register_source(&mut self, name: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT OR IGNORE INTO DATA_SOURCE (name) VALUES (?1)",
            params![name],
        )?;

        self.source_id(name)?
            .ok_or_else(|| anyhow!("data source {} missing after insert", name))
    }

    /// Resolve a source name, `None` when it is not registered
    pub fn source_id(&mut self, name: &str) -> Result<Option<i64>> {
        if let Some(id) = self.source_ids.get(name) {
            return Ok(Some(*id));
        }

        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM DATA_SOURCE WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to look up data source {}", name))?;

        if let Some(id) = id {
            self.source_ids.insert(name.to_string(), id);
        }

        Ok(id)
    }

    /// Number of BANK_DATA rows attributed to `source`
    pub fn count_for_source(&mut self, source: &str) -> Result<i64> {
        let Some(id) = self.source_id(source)? else {
            return Ok(0);
        };

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM BANK_DATA WHERE source = ?1",
            params![id],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    /// All rows of `source`, ordered by bank code
    pub fn bank_data_for_source(&mut self, source: &str) -> Result<Vec<BankInfo>> {
        let Some(id) = self.source_id(source)? else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(
            "SELECT bankcode, name, zip, city, bic, algorithm, country
             FROM BANK_DATA
             WHERE source = ?1
             ORDER BY bankcode, id",
        )?;

        let rows = stmt
            .query_map(params![id], |row| {
                Ok(BankInfo {
                    bankcode: row.get(0)?,
                    name: row.get(1)?,
                    zip: row.get(2)?,
                    city: row.get(3)?,
                    bic: row.get(4)?,
                    check_algo: row.get(5)?,
                    country: row.get(6)?,
                    source: source.to_string(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

impl BankDataRepository for SqliteRepository {
    fn clear(&mut self, source: &str) -> Result<i64> {
        let Some(id) = self.source_id(source)? else {
            return Ok(-1);
        };

        debug!(source, id, "removing entries");
        let deleted = self
            .conn
            .execute("DELETE FROM BANK_DATA WHERE source = ?1", params![id])
            .with_context(|| format!("Failed to delete entries for {}", source))?;

        Ok(deleted as i64)
    }

    fn store(&mut self, info: &BankInfo) -> Result<bool> {
        let id = self
            .source_id(&info.source)?
            .ok_or_else(|| anyhow!("data source {} not found", info.source))?;
        let now = Utc::now().to_rfc3339();

        let inserted = self.conn.execute(
            "INSERT INTO BANK_DATA (
                source, bankcode, name, zip, city, bic, country, algorithm, created, last_update
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                id,
                info.bankcode,
                info.name,
                info.zip,
                info.city,
                info.bic,
                info.country,
                info.check_algo,
                now,
            ],
        )?;

        Ok(inserted == 1)
    }
}
