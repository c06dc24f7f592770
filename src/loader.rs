// 🚚 Loader - reader → normalizer → (dedup) → repository
// One loader run per source: clear, stream the file, store, report

use crate::deduplication::DedupMap;
use crate::error::{LoadError, Result};
use crate::model::{BankInfo, DataSource};
use crate::normalize::{normalize, Normalized};
use crate::parser::{
    spawn_producer, BelgiumReader, BundesbankReader, RecordReader, SourceMessage, TableReader,
    TableRecord,
};
use crate::records::{
    AustriaEntry, LiechtensteinEntry, LuxembourgEntry, NetherlandsEntry, RawRecord,
    SwitzerlandEntry,
};
use crate::repository::BankDataRepository;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

// ============================================================================
// LOAD REPORT
// ============================================================================

/// Outcome of a successful load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub source: String,
    pub country: String,

    /// Rows deleted by the initial clear
    pub cleared: i64,

    /// Raw records received from the reader (batch members counted one by one)
    pub received: usize,

    /// Dropped by the upstream inclusion flag
    pub excluded: usize,

    /// Rejected by the mandatory-field gate
    pub skipped: usize,

    /// Earlier records replaced by a later one with the same bank code
    pub duplicates: usize,

    /// Rows successfully stored
    pub stored: usize,
}

// ============================================================================
// LOADER
// ============================================================================

/// Generic loader, specialized by the reader it drives
pub struct Loader<P: RecordReader> {
    reader: P,
    source: DataSource,
}

impl<P: RecordReader> Loader<P> {
    pub fn new(reader: P) -> Self {
        let source = reader.source();
        Loader { reader, source }
    }

    /// Replace every fact of this loader's source with the contents of `path`
    pub fn load<B>(self, path: &Path, repo: &mut B) -> Result<LoadReport>
    where
        B: BankDataRepository + ?Sized,
    {
        let source = self.source;
        let name = source.name();

        // 1. Clear: nothing is read or stored for an unclearable source
        let cleared = repo.clear(name).map_err(|error| LoadError::Clear {
            data_source: name.to_string(),
            error,
        })?;
        if cleared < 0 {
            return Err(LoadError::UnknownSource(name.to_string()));
        }
        info!(source = name, deleted = cleared, "cleared previous entries");

        let mut run = Run {
            source,
            repo,
            dedup: source.deduplicates().then(DedupMap::new),
            report: LoadReport {
                source: name.to_string(),
                country: source.country().to_string(),
                cleared,
                ..LoadReport::default()
            },
        };

        // 2. Produce
        let producer = spawn_producer(self.reader, path).map_err(|error| LoadError::Source {
            data_source: name.to_string(),
            stored: 0,
            error,
        })?;

        // 3. Consume until the channel closes
        let mut failure = None;
        for message in producer.receiver().iter() {
            match message {
                SourceMessage::Record(record) => run.accept(record)?,
                SourceMessage::Batch(records) => {
                    for record in records {
                        run.accept(record)?;
                    }
                }
                SourceMessage::Failed(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }

        if let Err(error) = producer.join() {
            if failure.is_none() {
                failure = Some(error);
            }
        }

        if let Some(error) = failure {
            return Err(LoadError::Source {
                data_source: name.to_string(),
                stored: run.report.stored,
                error,
            });
        }

        // 4. Store the deduplicated records
        run.flush()?;

        info!(
            source = name,
            rows = run.report.stored,
            skipped = run.report.skipped,
            "loaded rows"
        );
        Ok(run.report)
    }
}

/// State of one load, owned by the consumer
struct Run<'r, B: ?Sized> {
    source: DataSource,
    repo: &'r mut B,
    dedup: Option<DedupMap>,
    report: LoadReport,
}

impl<B: BankDataRepository + ?Sized> Run<'_, B> {
    fn accept<R: RawRecord>(&mut self, record: R) -> Result<()> {
        self.report.received += 1;

        match normalize(record, self.source) {
            Normalized::Excluded(record) => {
                self.report.excluded += 1;
                debug!(source = self.source.name(), ?record, "excluded by inclusion flag");
                Ok(())
            }
            Normalized::Skipped(record, reason) => {
                self.report.skipped += 1;
                warn!(source = self.source.name(), ?record, "skipping invalid entry {}", reason);
                Ok(())
            }
            Normalized::Accepted(info) => {
                if let Some(dedup) = self.dedup.as_mut() {
                    if dedup.insert(info) {
                        self.report.duplicates += 1;
                    }
                    return Ok(());
                }
                self.store(&info)
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(dedup) = self.dedup.take() {
            for info in dedup.into_records() {
                self.store(&info)?;
            }
        }
        Ok(())
    }

    /// Any failure aborts the run; a rejected row counts as a failure
    fn store(&mut self, info: &BankInfo) -> Result<()> {
        let outcome = self.repo.store(info).and_then(|ok| {
            if ok {
                Ok(())
            } else {
                Err(anyhow::anyhow!("repository rejected the record"))
            }
        });

        match outcome {
            Ok(()) => {
                self.report.stored += 1;
                Ok(())
            }
            Err(error) => Err(LoadError::Store {
                data_source: self.source.name().to_string(),
                bankcode: info.bankcode.clone(),
                stored: self.report.stored,
                error,
            }),
        }
    }
}

// ============================================================================
// PER-SOURCE DISPATCH
// ============================================================================

/// Load `path` for `source` with the matching reader
pub fn load_source<B>(source: DataSource, path: &Path, repo: &mut B) -> Result<LoadReport>
where
    B: BankDataRepository + ?Sized,
{
    debug!(source = source.name(), path = %path.display(), "starting load");

    match source {
        DataSource::Bundesbank => Loader::new(BundesbankReader::new()).load(path, repo),
        DataSource::Nbb => Loader::new(BelgiumReader::new()).load(path, repo),
        DataSource::Netherlands => table::<NetherlandsEntry, B>(path, repo),
        DataSource::Luxembourg => table::<LuxembourgEntry, B>(path, repo),
        DataSource::Switzerland => table::<SwitzerlandEntry, B>(path, repo),
        DataSource::Liechtenstein => table::<LiechtensteinEntry, B>(path, repo),
        DataSource::Austria => table::<AustriaEntry, B>(path, repo),
    }
}

fn table<R, B>(path: &Path, repo: &mut B) -> Result<LoadReport>
where
    R: TableRecord,
    B: BankDataRepository + ?Sized,
{
    Loader::new(TableReader::<R>::new()).load(path, repo)
}
