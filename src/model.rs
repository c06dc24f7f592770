// 🏦 Bank Data Model - canonical record + known sources
// Every source file ends up as a list of BankInfo rows attributed to one DataSource

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// BANK INFO
// ============================================================================

/// Canonical bank record, one row in the shared bank data store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BankInfo {
    pub bankcode: String,
    pub name: String,
    pub zip: String,
    pub city: String,

    /// Never contains whitespace (see `normalize::condense_bic`)
    pub bic: String,

    /// Check digit algorithm code, only provided by the Bundesbank
    pub check_algo: String,

    /// ISO 3166-1 alpha-2
    pub country: String,

    /// Store name of the source, e.g. "German Bundesbank"
    pub source: String,
}

// ============================================================================
// DATA SOURCE
// ============================================================================

/// DataSource - the national registries we know how to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSource {
    Bundesbank,
    Nbb,
    Netherlands,
    Luxembourg,
    Switzerland,
    Liechtenstein,
    Austria,
}

impl DataSource {
    pub const ALL: [DataSource; 7] = [
        DataSource::Bundesbank,
        DataSource::Nbb,
        DataSource::Netherlands,
        DataSource::Luxembourg,
        DataSource::Switzerland,
        DataSource::Liechtenstein,
        DataSource::Austria,
    ];

    /// Name of the source row in the DATA_SOURCE table
    pub fn name(&self) -> &'static str {
        match self {
            DataSource::Bundesbank => "German Bundesbank",
            DataSource::Nbb => "NBB",
            DataSource::Netherlands => "NL",
            DataSource::Luxembourg => "LU",
            DataSource::Switzerland => "CH",
            DataSource::Liechtenstein => "LI",
            DataSource::Austria => "AT",
        }
    }

    /// Short code used on the command line
    pub fn code(&self) -> &'static str {
        match self {
            DataSource::Bundesbank => "bundesbank",
            DataSource::Nbb => "nbb",
            DataSource::Netherlands => "nl",
            DataSource::Luxembourg => "lu",
            DataSource::Switzerland => "ch",
            DataSource::Liechtenstein => "li",
            DataSource::Austria => "at",
        }
    }

    pub fn country(&self) -> &'static str {
        match self {
            DataSource::Bundesbank => "DE",
            DataSource::Nbb => "BE",
            DataSource::Netherlands => "NL",
            DataSource::Luxembourg => "LU",
            DataSource::Switzerland => "CH",
            DataSource::Liechtenstein => "LI",
            DataSource::Austria => "AT",
        }
    }

    /// Records with a blank bank code or BIC are rejected for these sources.
    /// The others trust the upstream file.
    pub fn requires_mandatory_fields(&self) -> bool {
        matches!(
            self,
            DataSource::Luxembourg
                | DataSource::Switzerland
                | DataSource::Liechtenstein
                | DataSource::Austria
        )
    }

    /// Sources known to publish the same bank code more than once
    pub fn deduplicates(&self) -> bool {
        self.requires_mandatory_fields()
    }

    /// File name looked up in the data directory when no file is given
    pub fn default_file_name(&self) -> &'static str {
        match self {
            DataSource::Bundesbank => "bundesbank.txt",
            DataSource::Nbb => "nbb.csv",
            DataSource::Netherlands => "nl.csv",
            DataSource::Luxembourg => "lu.csv",
            DataSource::Switzerland => "ch.csv",
            DataSource::Liechtenstein => "li.csv",
            DataSource::Austria => "at.csv",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();

        DataSource::ALL
            .iter()
            .copied()
            .find(|source| source.code() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = DataSource::ALL.iter().map(|s| s.code()).collect();
                format!("unknown source '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_codes() {
        assert_eq!("bundesbank".parse::<DataSource>().unwrap(), DataSource::Bundesbank);
        assert_eq!("NBB".parse::<DataSource>().unwrap(), DataSource::Nbb);
        assert_eq!(" at ".parse::<DataSource>().unwrap(), DataSource::Austria);

        let err = "fr".parse::<DataSource>().unwrap_err();
        assert!(err.contains("unknown source 'fr'"));
        assert!(err.contains("bundesbank, nbb, nl, lu, ch, li, at"));
    }

    #[test]
    fn test_source_table() {
        let gated: Vec<&str> = DataSource::ALL
            .iter()
            .filter(|s| s.requires_mandatory_fields())
            .map(|s| s.name())
            .collect();
        assert_eq!(gated, vec!["LU", "CH", "LI", "AT"]);

        for source in DataSource::ALL {
            assert_eq!(source.deduplicates(), source.requires_mandatory_fields());
        }

        assert_eq!(DataSource::Bundesbank.country(), "DE");
        assert_eq!(DataSource::Nbb.country(), "BE");
        assert_eq!(DataSource::Bundesbank.to_string(), "German Bundesbank");
    }
}
