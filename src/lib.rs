// Bank Registry Loader - Core Library
// Exposes all modules for use in the CLI and tests

pub mod config;
pub mod db;
pub mod deduplication;
pub mod error;
pub mod loader;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod records;
pub mod repository;

// Re-export commonly used types
pub use config::LoaderConfig;
pub use db::SqliteRepository;
pub use deduplication::DedupMap;
pub use error::LoadError;
pub use loader::{load_source, LoadReport, Loader};
pub use model::{BankInfo, DataSource};
pub use normalize::{condense_bic, normalize, Normalized, SkipReason};
pub use parser::{
    spawn_producer, BelgiumReader, BundesbankReader, RecordReader, RecordSink, SourceMessage,
    TableReader, TableRecord,
};
pub use records::{
    AustriaEntry, BelgiumEntry, BundesbankEntry, LiechtensteinEntry, LuxembourgEntry,
    NetherlandsEntry, RawRecord, SwitzerlandEntry,
};
pub use repository::{BankDataRepository, InMemoryRepository};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
