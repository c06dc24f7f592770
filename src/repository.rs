// 🗄️ Bank Data Repository - persistence contract used by the loader
// Two implementations: InMemoryRepository (here) and SqliteRepository (db.rs)

use crate::model::{BankInfo, DataSource};
use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};

// ============================================================================
// REPOSITORY TRAIT
// ============================================================================

/// BankDataRepository - the only capabilities the loader needs
pub trait BankDataRepository {
    /// Delete every stored fact for `source`.
    ///
    /// Returns the number of deleted rows, or a negative count when the
    /// source is not known to the store.
    fn clear(&mut self, source: &str) -> Result<i64>;

    /// Insert one normalized record. Not idempotent: the loader relies on
    /// `clear` plus deduplication to avoid duplicate rows.
    fn store(&mut self, info: &BankInfo) -> Result<bool>;
}

// ============================================================================
// IN-MEMORY REPOSITORY
// ============================================================================

/// In-memory store for tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    known_sources: HashSet<String>,
    records: HashMap<String, Vec<BankInfo>>,
    clear_calls: usize,
    store_calls: usize,
    fail_store_after: Option<usize>,
}

impl InMemoryRepository {
    /// Repository that knows every built-in source
    pub fn new() -> Self {
        Self::with_sources(DataSource::ALL.iter().map(|s| s.name()))
    }

    /// Repository that only knows the given source names
    pub fn with_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InMemoryRepository {
            known_sources: sources.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Builder: every `store` call after the first `n` fails
    pub fn fail_store_after(mut self, n: usize) -> Self {
        self.fail_store_after = Some(n);
        self
    }

    pub fn records(&self, source: &str) -> &[BankInfo] {
        self.records.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, source: &str) -> usize {
        self.records(source).len()
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls
    }

    pub fn store_calls(&self) -> usize {
        self.store_calls
    }
}

impl BankDataRepository for InMemoryRepository {
    fn clear(&mut self, source: &str) -> Result<i64> {
        self.clear_calls += 1;

        if !self.known_sources.contains(source) {
            return Ok(-1);
        }

        let deleted = self.records.remove(source).map(|r| r.len()).unwrap_or(0);
        Ok(deleted as i64)
    }

    fn store(&mut self, info: &BankInfo) -> Result<bool> {
        self.store_calls += 1;

        if let Some(limit) = self.fail_store_after {
            if self.store_calls > limit {
                bail!("simulated store failure for bank {}", info.bankcode);
            }
        }

        if !self.known_sources.contains(&info.source) {
            bail!("data source {} not found", info.source);
        }

        self.records
            .entry(info.source.clone())
            .or_default()
            .push(info.clone());
        Ok(true)
    }
}
