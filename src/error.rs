// 🚨 Load Errors - why a loader run was aborted
// The underlying cause is kept as the error source, not repeated in the message

use thiserror::Error;

/// Result type alias for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Why a load was aborted.
///
/// Every variant is fatal for the run: the caller decides how to exit.
/// Record-level validation failures are not errors, they are counted in the
/// `LoadReport` instead.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The repository could not delete the previous facts for the source.
    #[error("failed to clear entries for {data_source}")]
    Clear {
        data_source: String,
        #[source]
        error: anyhow::Error,
    },

    /// `clear` reported a negative count: the source is not registered in the store.
    #[error("data source '{0}' is unknown to the bank data store")]
    UnknownSource(String),

    /// Storing a record failed; `stored` rows were written before the failure.
    #[error("failed to store bank {bankcode} for {data_source} after {stored} rows")]
    Store {
        data_source: String,
        bankcode: String,
        stored: usize,
        #[source]
        error: anyhow::Error,
    },

    /// The reader could not produce the records of the input file.
    #[error("failed to read {data_source} file after {stored} stored rows")]
    Source {
        data_source: String,
        stored: usize,
        #[source]
        error: anyhow::Error,
    },
}

impl LoadError {
    /// Rows already written to the repository when the load was aborted
    pub fn rows_stored(&self) -> usize {
        match self {
            LoadError::Clear { .. } | LoadError::UnknownSource(_) => 0,
            LoadError::Store { stored, .. } | LoadError::Source { stored, .. } => *stored,
        }
    }
}
