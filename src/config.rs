// ⚙️ Configuration - where the registry files live
// Defaults to ./data, overridable with BANKDATA_DIR or the --data-dir flag

use crate::model::DataSource;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable holding the data directory
pub const DATA_DIR_ENV: &str = "BANKDATA_DIR";

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub data_dir: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl LoaderConfig {
    /// Read `BANKDATA_DIR`, falling back to `./data`
    pub fn from_env() -> Self {
        match env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => Self::with_data_dir(dir),
            _ => Self::default(),
        }
    }

    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        LoaderConfig {
            data_dir: dir.into(),
        }
    }

    /// Default input file of `source` inside the data directory
    pub fn default_path(&self, source: DataSource) -> PathBuf {
        self.data_dir.join(source.default_file_name())
    }

    /// `explicit` when given, the default file of `source` otherwise
    pub fn resolve_path(&self, source: DataSource, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => self.default_path(source),
        }
    }
}
