// 🔍 Deduplication - collapse records sharing a bank code
// Strategy: last write wins. Only used by sources that publish a code more than once.

use crate::model::BankInfo;
use std::collections::HashMap;

// ============================================================================
// DEDUP MAP
// ============================================================================

/// Bank code → latest record seen for it
///
/// Owned by the consumer for the duration of one load; iteration order is
/// irrelevant because every entry is stored exactly once.
#[derive(Debug, Default)]
pub struct DedupMap {
    entries: HashMap<String, BankInfo>,
}

impl DedupMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any earlier one with the same bank code.
    /// Returns true when an earlier record was replaced.
    pub fn insert(&mut self, info: BankInfo) -> bool {
        self.entries.insert(info.bankcode.clone(), info).is_some()
    }

    /// Consume the map for the final storage pass
    pub fn into_records(self) -> impl Iterator<Item = BankInfo> {
        self.entries.into_values()
    }
}
