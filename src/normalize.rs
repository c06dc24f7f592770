// 🧹 Normalizer - raw record → canonical BankInfo
// Trims fields, condenses the BIC, applies the per-source mandatory-field gate

use crate::model::{BankInfo, DataSource};
use crate::records::RawRecord;
use std::fmt;

// ============================================================================
// OUTCOME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingBankcode,
    MissingBic,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingBankcode => f.write_str("without Bankcode"),
            SkipReason::MissingBic => f.write_str("without BIC"),
        }
    }
}

/// What the normalizer decided for one raw record.
/// Rejected records are handed back so the caller can log them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized<R> {
    /// Ready to be stored (or deduplicated)
    Accepted(BankInfo),

    /// Upstream inclusion flag not set
    Excluded(R),

    /// Failed the mandatory-field gate
    Skipped(R, SkipReason),
}

// ============================================================================
// FIELD CLEANUP
// ============================================================================

/// Remove every whitespace character from a BIC: "ABCD DE FF" → "ABCDDEFF"
pub fn condense_bic(bic: &str) -> String {
    bic.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn trimmed(value: String) -> String {
    let t = value.trim();
    if t.len() == value.len() {
        value
    } else {
        t.to_string()
    }
}

// ============================================================================
// NORMALIZE
// ============================================================================

/// Normalize one raw record for `source`
///
/// The gate only applies to sources that require mandatory fields
/// (LU, CH, LI, AT). The Bundesbank, NBB and NL files are trusted as-is,
/// apart from the Bundesbank's own inclusion flag.
pub fn normalize<R: RawRecord>(record: R, source: DataSource) -> Normalized<R> {
    if !record.is_included() {
        return Normalized::Excluded(record);
    }

    if source.requires_mandatory_fields() {
        if is_blank(record.bankcode()) {
            return Normalized::Skipped(record, SkipReason::MissingBankcode);
        }

        if is_blank(record.bic()) {
            return Normalized::Skipped(record, SkipReason::MissingBic);
        }
    }

    let raw = record.into_bank_info();

    Normalized::Accepted(BankInfo {
        bankcode: trimmed(raw.bankcode),
        name: trimmed(raw.name),
        zip: trimmed(raw.zip),
        city: trimmed(raw.city),
        bic: condense_bic(&raw.bic),
        check_algo: trimmed(raw.check_algo),
        country: source.country().to_string(),
        source: source.name().to_string(),
    })
}
