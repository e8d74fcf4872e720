//! In-memory record store for fleet events.
//!
//! A [`RecordStore`] is loaded once per session and never mutated afterwards.
//! Records are kept sorted ascending by date; rows sharing a date keep their
//! input order.

mod sample;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{EventRecord, COLUMNS};

pub use sample::SAMPLE_CSV;

/// Source label used for the embedded sample.
pub const SAMPLE_SOURCE: &str = "embedded-sample";

/// Immutable, date-ordered table of fleet events.
#[derive(Debug, Clone)]
pub struct RecordStore {
    /// Where the records came from (file path or sample label).
    source: String,
    /// Records, ascending by date.
    records: Vec<EventRecord>,
}

/// Caller-side row selection criteria. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    /// Only rows with this software version.
    pub version: Option<String>,
    /// Only rows for this tail number.
    pub tail: Option<String>,
    /// Only rows on or after this date.
    pub since: Option<NaiveDate>,
    /// Only rows on or before this date.
    pub until: Option<NaiveDate>,
}

impl RowFilter {
    /// Check whether a record passes this filter.
    #[must_use]
    pub fn matches(&self, record: &EventRecord) -> bool {
        self.version
            .as_deref()
            .map_or(true, |v| record.sw_version == v)
            && self.tail.as_deref().map_or(true, |t| record.tail == t)
            && self.since.map_or(true, |d| record.date >= d)
            && self.until.map_or(true, |d| record.date <= d)
    }
}

impl RecordStore {
    /// Build a store from already-parsed records.
    #[must_use]
    pub fn from_records(source: impl Into<String>, mut records: Vec<EventRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self {
            source: source.into(),
            records,
        }
    }

    /// Parse CSV event data from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the header lacks a required column or any row
    /// cannot be parsed.
    pub fn from_reader<R: Read>(source: impl Into<String>, reader: R) -> Result<Self> {
        let source = source.into();
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if let Some(missing) = COLUMNS
            .iter()
            .find(|column| !headers.iter().any(|h| h == **column))
        {
            return Err(Error::dataset_parse(1, format!("missing column '{missing}'")));
        }

        let mut records = Vec::new();
        for (index, row) in csv_reader.deserialize::<EventRecord>().enumerate() {
            let record = row.map_err(|e| {
                let fallback = u64::try_from(index).unwrap_or(u64::MAX).saturating_add(2);
                let line = e.position().map_or(fallback, csv::Position::line);
                Error::dataset_parse(line, e.to_string())
            })?;
            records.push(record);
        }

        debug!(source = %source, rows = records.len(), "Parsed event rows");
        Ok(Self::from_records(source, records))
    }

    /// Load event data from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::DatasetOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_reader(path.display().to_string(), file)?;
        info!("Loaded {} event rows from {}", store.len(), path.display());
        Ok(store)
    }

    /// Load the embedded fleet sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded sample fails to parse.
    pub fn sample() -> Result<Self> {
        Self::from_reader(SAMPLE_SOURCE, SAMPLE_CSV.as_bytes())
    }

    /// Load from `path` if given, otherwise the embedded sample.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::open(path),
            None => Self::sample(),
        }
    }

    /// Where these records were loaded from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All records, ascending by date.
    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest event date.
    #[must_use]
    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    /// Latest event date.
    #[must_use]
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Distinct software versions, sorted.
    #[must_use]
    pub fn versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.records.iter().map(|r| r.sw_version.clone()).collect();
        versions.sort();
        versions.dedup();
        versions
    }

    /// Copy out the rows matching `filter`, preserving store order.
    #[must_use]
    pub fn select(&self, filter: &RowFilter) -> Vec<EventRecord> {
        self.records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }
}
