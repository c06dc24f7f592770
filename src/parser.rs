// 🏗️ Record Readers - per-country file formats → stream of raw records
// Each reader runs on its own producer thread and pushes records into a channel

use crate::model::DataSource;
use crate::records::{
    AustriaEntry, BelgiumEntry, BelgiumRow, BundesbankEntry, LiechtensteinEntry,
    LuxembourgEntry, NetherlandsEntry, RawRecord, SwitzerlandEntry,
};
use anyhow::{anyhow, bail, Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use tracing::debug;

// ============================================================================
// CHANNEL PAYLOAD
// ============================================================================

/// What a producer sends to the loader
#[derive(Debug)]
pub enum SourceMessage<R> {
    /// One record per physical line/row
    Record(R),

    /// Several records produced from one row (NBB code ranges)
    Batch(Vec<R>),

    /// Terminal: the file could not be read to the end
    Failed(anyhow::Error),
}

/// Sending half handed to a reader
pub struct RecordSink<R> {
    sender: Sender<SourceMessage<R>>,
    sent: usize,
}

impl<R> RecordSink<R> {
    fn new(sender: Sender<SourceMessage<R>>) -> Self {
        RecordSink { sender, sent: 0 }
    }

    pub fn emit(&mut self, record: R) -> Result<()> {
        self.send(SourceMessage::Record(record))?;
        self.sent += 1;
        Ok(())
    }

    pub fn emit_batch(&mut self, records: Vec<R>) -> Result<()> {
        let len = records.len();
        self.send(SourceMessage::Batch(records))?;
        self.sent += len;
        Ok(())
    }

    /// Number of records sent so far (batch members counted one by one)
    pub fn sent(&self) -> usize {
        self.sent
    }

    fn fail(&self, error: anyhow::Error) {
        // Consumer already gone: nobody left to tell
        let _ = self.sender.send(SourceMessage::Failed(error));
    }

    fn send(&self, message: SourceMessage<R>) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| anyhow!("record consumer disconnected"))
    }
}

// ============================================================================
// READER TRAIT + PRODUCER
// ============================================================================

/// RecordReader - parses one source format
///
/// `read` pushes every record into the sink and returns once the file is
/// exhausted. An `Err` is forwarded to the loader as `SourceMessage::Failed`.
pub trait RecordReader: Send + 'static {
    type Record: RawRecord;

    fn read(&self, path: &Path, sink: &mut RecordSink<Self::Record>) -> Result<()>;

    /// Source this reader handles
    fn source(&self) -> DataSource;
}

/// Handle on a running producer thread
pub struct Producer<R> {
    receiver: Receiver<SourceMessage<R>>,
    handle: JoinHandle<()>,
}

impl<R> Producer<R> {
    pub fn receiver(&self) -> &Receiver<SourceMessage<R>> {
        &self.receiver
    }

    /// Wait for the producer thread; a panic inside the reader becomes an error
    pub fn join(self) -> Result<()> {
        drop(self.receiver);
        self.handle
            .join()
            .map_err(|_| anyhow!("record reader thread panicked"))
    }
}

/// Start `reader` on a new thread, feeding an unbounded channel.
/// The channel closes when the reader returns (successfully or not).
pub fn spawn_producer<P: RecordReader>(reader: P, path: &Path) -> Result<Producer<P::Record>> {
    let (sender, receiver) = unbounded();
    let path: PathBuf = path.to_path_buf();
    let source = reader.source();

    let handle = thread::Builder::new()
        .name(format!("reader-{}", source.code()))
        .spawn(move || {
            let mut sink = RecordSink::new(sender);
            match reader.read(&path, &mut sink) {
                Ok(()) => debug!(source = %source, records = sink.sent(), "reader finished"),
                Err(error) => sink.fail(error),
            }
        })
        .context("Failed to spawn record reader thread")?;

    Ok(Producer { receiver, handle })
}

// ============================================================================
// SHARED HELPERS
// ============================================================================

/// Read a whole text file. Registry files come either as UTF-8 or as
/// ISO-8859-1; anything that is not valid UTF-8 is decoded as Latin-1.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

// ============================================================================
// BUNDESBANK - fixed width
// ============================================================================

/// Reader for the Bundesbank Bankleitzahlendatei
pub struct BundesbankReader;

impl BundesbankReader {
    /// Characters up to and including the check algorithm column
    pub const MIN_LINE_LEN: usize = 152;

    pub fn new() -> Self {
        BundesbankReader
    }

    /// Parse one fixed-width line (`line_number` is 1-based, for messages)
    pub fn parse_line(line: &str, line_number: usize) -> Result<BundesbankEntry> {
        let chars: Vec<char> = line.chars().collect();
        if chars.len() < Self::MIN_LINE_LEN {
            bail!(
                "line {} is {} characters long, expected at least {}",
                line_number,
                chars.len(),
                Self::MIN_LINE_LEN
            );
        }

        let field = |start: usize, len: usize| -> String {
            chars[start..start + len]
                .iter()
                .collect::<String>()
                .trim()
                .to_string()
        };

        let m = chars[8]
            .to_digit(10)
            .ok_or_else(|| anyhow!("line {}: invalid Merkmal '{}'", line_number, chars[8]))?;

        Ok(BundesbankEntry {
            bankcode: field(0, 8),
            m: m as u8,
            name: field(9, 58),
            zip: field(67, 5),
            city: field(72, 35),
            short_name: field(107, 27),
            pan: field(134, 5),
            bic: field(139, 11),
            check_algo: field(150, 2),
        })
    }
}

impl Default for BundesbankReader {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordReader for BundesbankReader {
    type Record = BundesbankEntry;

    fn read(&self, path: &Path, sink: &mut RecordSink<BundesbankEntry>) -> Result<()> {
        let text = read_text(path)?;
        let filename = file_name(path);

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let entry = Self::parse_line(line, idx + 1)
                .with_context(|| format!("Failed to parse {}", filename))?;
            sink.emit(entry)?;
        }

        Ok(())
    }

    fn source(&self) -> DataSource {
        DataSource::Bundesbank
    }
}

// ============================================================================
// DELIMITED TABLES (CSV + spreadsheet exports)
// ============================================================================

/// Format knowledge for a header-based table source
pub trait TableRecord: RawRecord + DeserializeOwned {
    const SOURCE: DataSource;
    const DELIMITER: u8;
    /// Lines before the header row
    const PREAMBLE_LINES: usize = 0;
}

impl TableRecord for NetherlandsEntry {
    const SOURCE: DataSource = DataSource::Netherlands;
    const DELIMITER: u8 = b',';
}

impl TableRecord for LuxembourgEntry {
    const SOURCE: DataSource = DataSource::Luxembourg;
    const DELIMITER: u8 = b';';
}

impl TableRecord for SwitzerlandEntry {
    const SOURCE: DataSource = DataSource::Switzerland;
    const DELIMITER: u8 = b';';
}

impl TableRecord for LiechtensteinEntry {
    const SOURCE: DataSource = DataSource::Liechtenstein;
    const DELIMITER: u8 = b';';
}

impl TableRecord for AustriaEntry {
    const SOURCE: DataSource = DataSource::Austria;
    const DELIMITER: u8 = b';';
    const PREAMBLE_LINES: usize = 5;
}

/// Build a csv reader over `text`, skipping `preamble` lines first
fn table_reader(text: &str, delimiter: u8, preamble: usize) -> csv::Reader<&[u8]> {
    let mut body = text;
    for _ in 0..preamble {
        body = match body.find('\n') {
            Some(pos) => &body[pos + 1..],
            None => "",
        };
    }

    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(body.as_bytes())
}

/// Deserialize every data row and hand it to `handle`.
///
/// Errors name the physical line of the row in the file: csv positions are
/// relative to the header, `preamble` lines come before it.
fn for_each_row<T, F>(
    reader: &mut csv::Reader<&[u8]>,
    preamble: usize,
    filename: &str,
    mut handle: F,
) -> Result<()>
where
    T: DeserializeOwned,
    F: FnMut(T) -> Result<()>,
{
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", filename))?
        .clone();
    let mut record = csv::StringRecord::new();

    while reader
        .read_record(&mut record)
        .with_context(|| format!("Failed to read {}", filename))?
    {
        let line = record.position().map_or(0, |pos| pos.line() as usize) + preamble;

        record
            .deserialize::<T>(Some(&headers))
            .map_err(anyhow::Error::from)
            .and_then(&mut handle)
            .with_context(|| format!("Failed to parse line {} in {}", line, filename))?;
    }

    Ok(())
}

/// Generic reader for every `TableRecord`
pub struct TableReader<R> {
    _record: PhantomData<fn() -> R>,
}

impl<R: TableRecord> TableReader<R> {
    pub fn new() -> Self {
        TableReader {
            _record: PhantomData,
        }
    }
}

impl<R: TableRecord> Default for TableReader<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: TableRecord> RecordReader for TableReader<R> {
    type Record = R;

    fn read(&self, path: &Path, sink: &mut RecordSink<R>) -> Result<()> {
        let text = read_text(path)?;
        let filename = file_name(path);
        let mut reader = table_reader(&text, R::DELIMITER, R::PREAMBLE_LINES);

        for_each_row(&mut reader, R::PREAMBLE_LINES, &filename, |record: R| {
            sink.emit(record)
        })
    }

    fn source(&self) -> DataSource {
        R::SOURCE
    }
}

// ============================================================================
// BELGIUM - NBB ranges, emitted as batches
// ============================================================================

/// Reader for the NBB table; every row becomes one batch
pub struct BelgiumReader;

impl BelgiumReader {
    pub const DELIMITER: u8 = b';';

    pub fn new() -> Self {
        BelgiumReader
    }

    /// Expand `From..=To` into one entry per three-digit bank code
    pub fn expand(row: BelgiumRow) -> Result<Vec<BelgiumEntry>> {
        let from: u32 = row
            .from
            .trim()
            .parse()
            .with_context(|| format!("invalid range start '{}'", row.from))?;
        let to: u32 = match row.to.trim() {
            "" => from,
            to => to
                .parse()
                .with_context(|| format!("invalid range end '{}'", row.to))?,
        };

        if to < from || to > 999 {
            bail!("invalid bank code range {}-{}", row.from.trim(), row.to.trim());
        }

        Ok((from..=to)
            .map(|code| BelgiumEntry {
                bankcode: format!("{:03}", code),
                name: row.name.clone(),
                bic: row.bic.clone(),
            })
            .collect())
    }
}

impl Default for BelgiumReader {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordReader for BelgiumReader {
    type Record = BelgiumEntry;

    fn read(&self, path: &Path, sink: &mut RecordSink<BelgiumEntry>) -> Result<()> {
        let text = read_text(path)?;
        let filename = file_name(path);
        let mut reader = table_reader(&text, Self::DELIMITER, 0);

        for_each_row(&mut reader, 0, &filename, |row: BelgiumRow| {
            sink.emit_batch(Self::expand(row)?)
        })
    }

    fn source(&self) -> DataSource {
        DataSource::Nbb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn bundesbank_line(bankcode: &str, m: char, name: &str, bic: &str) -> String {
        format!(
            "{:<8}{}{:<58}{:<5}{:<35}{:<27}{:<5}{:<11}{:<2}{:0>6}{}{}{:0>8}",
            bankcode, m, name, "10591", "Berlin", "BBk Berlin", "20100", bic, "09", 1, "U", "0", 0
        )
    }

    fn write_fixture(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    fn collect<P: RecordReader>(reader: P, path: &Path) -> (Vec<P::Record>, Option<String>) {
        let producer = spawn_producer(reader, path).unwrap();
        let mut records = Vec::new();
        let mut failure = None;

        for message in producer.receiver().iter() {
            match message {
                SourceMessage::Record(r) => records.push(r),
                SourceMessage::Batch(batch) => records.extend(batch),
                SourceMessage::Failed(e) => failure = Some(format!("{:#}", e)),
            }
        }
        producer.join().unwrap();

        (records, failure)
    }

    #[test]
    fn test_bundesbank_parse_line() {
        let line = bundesbank_line("10000000", '1', "Bundesbank", "MARKDEF1100");
        assert_eq!(line.chars().count(), 168);

        let entry = BundesbankReader::parse_line(&line, 1).unwrap();
        assert_eq!(entry.bankcode, "10000000");
        assert_eq!(entry.m, 1);
        assert_eq!(entry.name, "Bundesbank");
        assert_eq!(entry.zip, "10591");
        assert_eq!(entry.city, "Berlin");
        assert_eq!(entry.bic, "MARKDEF1100");
        assert_eq!(entry.check_algo, "09");
    }

    #[test]
    fn test_bundesbank_short_line_is_an_error() {
        let err = BundesbankReader::parse_line("10000000 1 Bundesbank", 7).unwrap_err();
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_bundesbank_latin1_file() {
        // "Münster" with ü as a single ISO-8859-1 byte
        let mut bytes = bundesbank_line("40000000", '1', "Bundesbank M", "MARKDEF1400")
            .into_bytes();
        bytes[20] = 0xFC;
        bytes.push(b'\n');
        let file = write_fixture(&bytes);

        let (records, failure) = collect(BundesbankReader::new(), file.path());
        assert!(failure.is_none());
        assert_eq!(records.len(), 1);
        assert!(records[0].name.contains('ü'));
    }

    #[test]
    fn test_missing_file_is_reported_as_failure() {
        let (records, failure) = collect(
            BundesbankReader::new(),
            Path::new("/nonexistent/bundesbank.txt"),
        );
        assert!(records.is_empty());
        assert!(failure.unwrap().contains("Failed to open file"));
    }

    #[test]
    fn test_table_reader_with_preamble() {
        let file = write_fixture(
            b"OeNB SEPA\nStand: 2024\n\n\n\nKennzeichen;Bankleitzahl;Bankenname;PLZ;SWIFT-Code\n\
              H;10000;Oesterreichische Nationalbank;1090;NABAATWW\n\
              H;12000;UniCredit Bank Austria AG;1020;BKAUATWW\n",
        );

        let (records, failure) = collect(TableReader::<AustriaEntry>::new(), file.path());
        assert!(failure.is_none(), "{:?}", failure);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].bankcode, "12000");
        assert_eq!(records[1].bic, "BKAUATWW");
    }

    #[test]
    fn test_table_reader_missing_column() {
        let file = write_fixture(b"Identifier,Naam betaaldienstverlener\nINGB,ING Bank\n");

        let (records, failure) = collect(TableReader::<NetherlandsEntry>::new(), file.path());
        assert!(records.is_empty());
        assert!(failure.unwrap().contains("line 2"));
    }

    #[test]
    fn test_error_line_counts_blank_lines_and_preamble() {
        let file = write_fixture(
            b"OeNB SEPA\nStand: 2024\n\n\n\nKennzeichen;Bankleitzahl;Bankenname\n\nH;10000;OeNB\n",
        );

        let (records, failure) = collect(TableReader::<AustriaEntry>::new(), file.path());
        assert!(records.is_empty());
        let failure = failure.unwrap();
        assert!(failure.contains("line 8"), "{}", failure);
    }

    #[test]
    fn test_belgium_error_line_skips_blank_lines() {
        let file = write_fixture(
            b"From;To;Biccode;T_Institutions_English\n000;000;BPOTBEB1;bpost bank\n\n\n001;abc;GEBABEBB;BNP\n",
        );

        let (records, failure) = collect(BelgiumReader::new(), file.path());
        assert_eq!(records.len(), 1);
        let failure = failure.unwrap();
        assert!(failure.contains("line 5"), "{}", failure);
    }

    #[test]
    fn test_short_row_reaches_the_consumer() {
        let file = write_fixture(b"Code;Institution;BIC\n0001;BCEE;BCEELULL\n0002;Banque sans BIC\n");

        let (records, failure) = collect(TableReader::<LuxembourgEntry>::new(), file.path());
        assert!(failure.is_none(), "{:?}", failure);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].bankcode, "0002");
        assert_eq!(records[1].bic, "");
    }

    #[test]
    fn test_belgium_expand_range() {
        let row = BelgiumRow {
            from: "000".to_string(),
            to: "002".to_string(),
            bic: "BPOT BE B1".to_string(),
            name: "bpost bank".to_string(),
        };

        let entries = BelgiumReader::expand(row).unwrap();
        let codes: Vec<&str> = entries.iter().map(|e| e.bankcode.as_str()).collect();
        assert_eq!(codes, vec!["000", "001", "002"]);
        assert!(entries.iter().all(|e| e.bic == "BPOT BE B1"));
    }

    #[test]
    fn test_belgium_rejects_reversed_range() {
        let row = BelgiumRow {
            from: "050".to_string(),
            to: "049".to_string(),
            bic: "GKCCBEBB".to_string(),
            name: "Belfius".to_string(),
        };
        assert!(BelgiumReader::expand(row).is_err());
    }

    #[test]
    fn test_belgium_reader_emits_batches() {
        let file = write_fixture(
            b"From;To;Biccode;T_Institutions_English\n000;000;BPOTBEB1;bpost bank\n001;003;GEBABEBB;BNP Paribas Fortis\n",
        );

        let producer = spawn_producer(BelgiumReader::new(), file.path()).unwrap();
        let sizes: Vec<usize> = producer
            .receiver()
            .iter()
            .map(|m| match m {
                SourceMessage::Batch(batch) => batch.len(),
                other => panic!("expected batch, got {:?}", other),
            })
            .collect();
        producer.join().unwrap();

        assert_eq!(sizes, vec![1, 3]);
    }
}
