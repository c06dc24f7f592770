// 📄 Raw Records - as-parsed shapes, one per source format
// Fields are kept exactly as they appear in the file; cleanup happens in normalize

use crate::model::BankInfo;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;

// ============================================================================
// RAW RECORD TRAIT
// ============================================================================

/// RawRecord - what the loader needs from any as-parsed record
///
/// Records move from the producer thread to the consumer, hence `Send + 'static`.
pub trait RawRecord: Debug + Send + 'static {
    fn bankcode(&self) -> &str;

    fn bic(&self) -> &str;

    /// Upstream row-inclusion flag. Only the Bundesbank file carries one.
    fn is_included(&self) -> bool {
        true
    }

    /// Map the source fields onto the canonical layout.
    /// Country and source are filled in by the normalizer.
    fn into_bank_info(self) -> BankInfo;
}

/// Read a cell that may be absent from a short row as "".
///
/// Exporters drop trailing empty cells; the row still has to reach the
/// mandatory-field gate instead of failing the whole file. A missing header
/// column is still an error.
fn empty_if_missing<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// GERMANY - Bundesbank Bankleitzahlendatei (fixed width)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundesbankEntry {
    pub bankcode: String,
    /// Merkmal: 1 = institution owning the bank code, 2 = branch row
    pub m: u8,
    pub name: String,
    pub zip: String,
    pub city: String,
    pub short_name: String,
    pub pan: String,
    pub bic: String,
    pub check_algo: String,
}

impl RawRecord for BundesbankEntry {
    fn bankcode(&self) -> &str {
        &self.bankcode
    }

    fn bic(&self) -> &str {
        &self.bic
    }

    fn is_included(&self) -> bool {
        self.m == 1
    }

    fn into_bank_info(self) -> BankInfo {
        BankInfo {
            bankcode: self.bankcode,
            name: self.name,
            zip: self.zip,
            city: self.city,
            bic: self.bic,
            check_algo: self.check_algo,
            ..BankInfo::default()
        }
    }
}

// ============================================================================
// BELGIUM - NBB bank code ranges
// ============================================================================

/// One row of the NBB table: a range of bank codes sharing one institution
#[derive(Debug, Clone, Deserialize)]
pub struct BelgiumRow {
    #[serde(rename = "From", alias = "from")]
    pub from: String,

    #[serde(rename = "To", alias = "to", deserialize_with = "empty_if_missing")]
    pub to: String,

    #[serde(rename = "Biccode", alias = "BIC", alias = "bic")]
    pub bic: String,

    #[serde(
        rename = "T_Institutions_English",
        alias = "T_Institutions_Dutch",
        alias = "Name",
        default,
        deserialize_with = "empty_if_missing"
    )]
    pub name: String,
}

/// A single Belgian bank code, expanded from a `BelgiumRow`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BelgiumEntry {
    pub bankcode: String,
    pub name: String,
    pub bic: String,
}

impl RawRecord for BelgiumEntry {
    fn bankcode(&self) -> &str {
        &self.bankcode
    }

    fn bic(&self) -> &str {
        &self.bic
    }

    fn into_bank_info(self) -> BankInfo {
        BankInfo {
            bankcode: self.bankcode,
            name: self.name,
            bic: self.bic,
            ..BankInfo::default()
        }
    }
}

// ============================================================================
// NETHERLANDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetherlandsEntry {
    #[serde(
        rename = "Identifier",
        alias = "Bankcode",
        alias = "bankcode",
        deserialize_with = "empty_if_missing"
    )]
    pub bankcode: String,

    #[serde(rename = "BIC", alias = "bic", deserialize_with = "empty_if_missing")]
    pub bic: String,

    #[serde(
        rename = "Naam betaaldienstverlener",
        alias = "Name",
        alias = "name",
        default,
        deserialize_with = "empty_if_missing"
    )]
    pub name: String,
}

impl RawRecord for NetherlandsEntry {
    fn bankcode(&self) -> &str {
        &self.bankcode
    }

    fn bic(&self) -> &str {
        &self.bic
    }

    fn into_bank_info(self) -> BankInfo {
        BankInfo {
            bankcode: self.bankcode,
            name: self.name,
            bic: self.bic,
            ..BankInfo::default()
        }
    }
}

// ============================================================================
// LUXEMBOURG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LuxembourgEntry {
    #[serde(
        rename = "Code",
        alias = "Bank code",
        alias = "IBAN ID",
        deserialize_with = "empty_if_missing"
    )]
    pub bankcode: String,

    #[serde(rename = "Institution", alias = "Name", default, deserialize_with = "empty_if_missing")]
    pub name: String,

    #[serde(rename = "BIC", alias = "SWIFT", deserialize_with = "empty_if_missing")]
    pub bic: String,
}

impl RawRecord for LuxembourgEntry {
    fn bankcode(&self) -> &str {
        &self.bankcode
    }

    fn bic(&self) -> &str {
        &self.bic
    }

    fn into_bank_info(self) -> BankInfo {
        BankInfo {
            bankcode: self.bankcode,
            name: self.name,
            bic: self.bic,
            ..BankInfo::default()
        }
    }
}

// ============================================================================
// SWITZERLAND - SIX bank master
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SwitzerlandEntry {
    #[serde(
        rename = "IID",
        alias = "BC-Nummer",
        alias = "Bankcode",
        deserialize_with = "empty_if_missing"
    )]
    pub bankcode: String,

    #[serde(rename = "Bankname", alias = "Name", default, deserialize_with = "empty_if_missing")]
    pub name: String,

    #[serde(rename = "PLZ", alias = "Zip", default, deserialize_with = "empty_if_missing")]
    pub zip: String,

    #[serde(rename = "Ort", alias = "Place", default, deserialize_with = "empty_if_missing")]
    pub place: String,

    #[serde(rename = "SWIFT", alias = "BIC", deserialize_with = "empty_if_missing")]
    pub bic: String,
}

impl RawRecord for SwitzerlandEntry {
    fn bankcode(&self) -> &str {
        &self.bankcode
    }

    fn bic(&self) -> &str {
        &self.bic
    }

    fn into_bank_info(self) -> BankInfo {
        BankInfo {
            bankcode: self.bankcode,
            name: self.name,
            zip: self.zip,
            city: self.place,
            bic: self.bic,
            ..BankInfo::default()
        }
    }
}

// ============================================================================
// LIECHTENSTEIN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LiechtensteinEntry {
    #[serde(rename = "Bankleitzahl", alias = "Bankcode", deserialize_with = "empty_if_missing")]
    pub bankcode: String,

    #[serde(rename = "Name", alias = "Bankname", default, deserialize_with = "empty_if_missing")]
    pub name: String,

    #[serde(rename = "BIC", alias = "SWIFT", deserialize_with = "empty_if_missing")]
    pub bic: String,
}

impl RawRecord for LiechtensteinEntry {
    fn bankcode(&self) -> &str {
        &self.bankcode
    }

    fn bic(&self) -> &str {
        &self.bic
    }

    fn into_bank_info(self) -> BankInfo {
        BankInfo {
            bankcode: self.bankcode,
            name: self.name,
            bic: self.bic,
            ..BankInfo::default()
        }
    }
}

// ============================================================================
// AUSTRIA - OeNB SEPA directory (CSV)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AustriaEntry {
    #[serde(rename = "Bankleitzahl", alias = "Bankcode", deserialize_with = "empty_if_missing")]
    pub bankcode: String,

    #[serde(rename = "Bankenname", alias = "Name", default, deserialize_with = "empty_if_missing")]
    pub name: String,

    #[serde(rename = "SWIFT-Code", alias = "BIC", deserialize_with = "empty_if_missing")]
    pub bic: String,
}

impl RawRecord for AustriaEntry {
    fn bankcode(&self) -> &str {
        &self.bankcode
    }

    fn bic(&self) -> &str {
        &self.bic
    }

    fn into_bank_info(self) -> BankInfo {
        BankInfo {
            bankcode: self.bankcode,
            name: self.name,
            bic: self.bic,
            ..BankInfo::default()
        }
    }
}
