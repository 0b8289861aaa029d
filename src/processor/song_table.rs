use memmap2::Mmap;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::{fs::File, path::Path};
use tracing::{debug, info};

use crate::{
    helpers::csv_scan::{RawRecord, RecordScanner},
    processor::{
        DataError, ParseError, ParseSummary,
        record::{ColumnMap, SongRecord, coerce_row},
    },
};

/// In-memory row store of cleaned song records.
///
/// Loaded once and never mutated afterwards; every pass reads it through a
/// shared borrow.
///
/// # Examples
///
/// ```rust,no_run
/// # use stream_insights::SongTable;
/// let mut table = SongTable::new();
/// let summary = table.load_csv("spotify-2023.csv".as_ref()).unwrap();
/// println!("{} rows, {} values coerced", summary.rows_processed, summary.errors.len());
/// ```
#[derive(Debug, Default)]
pub struct SongTable {
    records: Vec<SongRecord>,
    headers: Vec<String>,
}

impl SongTable {
    /// Create an empty table
    pub fn new() -> Self {
        SongTable {
            records: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Build a table from records that are already typed.
    pub fn from_records(records: Vec<SongRecord>) -> Self {
        SongTable {
            records,
            headers: Vec::new(),
        }
    }

    /// Loads a CSV file into memory using memory mapping
    ///
    /// # Errors
    /// Returns a [`DataError`] if:
    /// - File cannot be opened or mapped
    /// - The header line is missing
    /// - A required column is absent
    pub fn load_csv(&mut self, path: &Path) -> Result<ParseSummary, DataError> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(DataError::Parse("Missing header line".into()));
        }

        let mmap = unsafe { Mmap::map(&file)? };
        debug!(path = %path.display(), bytes = mmap.len(), "mapped dataset");
        self.load_bytes(&mmap[..])
    }

    /// Parses CSV bytes, replacing any previously loaded rows.
    ///
    /// Header names are trimmed before matching. Rows whose field count
    /// differs from the header are skipped and reported; unparseable numeric
    /// cells become missing and are reported.
    pub fn load_bytes(&mut self, buf: &[u8]) -> Result<ParseSummary, DataError> {
        let mut scanner = RecordScanner::new(buf);

        let header = scanner
            .next()
            .ok_or_else(|| DataError::Parse("Missing header line".into()))?;
        let headers: Vec<String> = header
            .fields
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect();

        let columns = ColumnMap::resolve(&headers)?;

        let mut errors = Vec::new();
        let mut skipped_rows = 0;
        let mut raw_rows: Vec<RawRecord<'_>> = Vec::new();

        for record in scanner {
            if record.fields.len() != columns.width() {
                errors.push(ParseError {
                    row: record.line,
                    column: "".to_string(),
                    value: format!(
                        "Expected {} fields, got {}",
                        columns.width(),
                        record.fields.len()
                    ),
                });
                skipped_rows += 1;
                continue;
            }
            raw_rows.push(record);
        }

        // Clean rows in parallel; collect keeps source order
        let cleaned: Vec<(SongRecord, Vec<ParseError>)> = raw_rows
            .into_par_iter()
            .map(|raw| coerce_row(&raw.fields, &columns, raw.line))
            .collect();

        let mut records = Vec::with_capacity(cleaned.len());
        for (record, notes) in cleaned {
            errors.extend(notes);
            records.push(record);
        }

        info!(
            rows = records.len(),
            coerced = errors.len() - skipped_rows,
            skipped = skipped_rows,
            "loaded song table"
        );

        self.records = records;
        self.headers = headers;

        Ok(ParseSummary {
            rows_processed: self.records.len(),
            skipped_rows,
            errors,
        })
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Trimmed header names of the loaded file (empty for in-memory tables)
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[SongRecord] {
        &self.records
    }

    pub fn record(&self, idx: usize) -> Option<&SongRecord> {
        self.records.get(idx)
    }
}
