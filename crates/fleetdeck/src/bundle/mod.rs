//! Evidence bundle assembly.
//!
//! An evidence bundle packages a caller-selected slice of event rows for
//! engineering sign-off. [`EvidenceBundler::build`] produces a ZIP archive in
//! memory with exactly three entries, each named after the bundle id:
//!
//! - `{id}.csv`: the selected rows with a header, in table column order
//! - `{id}.json`: the [`EvidenceMetadata`], pretty-printed
//! - `{id}.pdf`: a summary report with chart pages and a row excerpt
//!
//! Chart images that fail to decode are skipped and reported through
//! [`ChartOutcome`]; every other failure aborts the build and no bundle is
//! returned.
//!
//! # Example
//!
//! ```no_run
//! use fleetdeck::bundle::EvidenceBundler;
//! use fleetdeck::store::RecordStore;
//!
//! let store = RecordStore::sample()?;
//! let rows = &store.records()[..3];
//! let bundle = EvidenceBundler::default().build(rows, "Spike Review", "J. Doe", "High", &[])?;
//! assert_eq!(bundle.metadata.rows, 3);
//! # Ok::<(), fleetdeck::Error>(())
//! ```

mod archive;
mod report;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::error::{Error, Result};
use crate::record::EventRecord;

pub use archive::EvidenceArchive;

/// Default organization banner on the report cover.
pub const DEFAULT_ORGANIZATION: &str = "COMPANY AIRLINES";

/// Default number of rows listed in the report excerpt.
pub const DEFAULT_EXCERPT_ROWS: usize = 30;

fn evidence_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^EV-[0-9A-F]{8}$").expect("evidence id pattern is valid"))
}

/// Identifier of an evidence bundle: `EV-` followed by 8 uppercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EvidenceId(String);

impl EvidenceId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("EV-{}", hex[..8].to_ascii_uppercase()))
    }

    /// Validate and wrap an identifier string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEvidenceId`] if the string does not match the
    /// identifier format.
    pub fn parse(value: &str) -> Result<Self> {
        if evidence_id_pattern().is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(Error::InvalidEvidenceId(value.to_string()))
        }
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Archive entry name for the given file extension.
    #[must_use]
    pub fn entry_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.0)
    }
}

impl fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EvidenceId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<EvidenceId> for String {
    fn from(id: EvidenceId) -> Self {
        id.0
    }
}

/// Descriptor written to `{id}.json`. Field order is the JSON key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceMetadata {
    /// Bundle identifier.
    pub evidence_id: EvidenceId,
    /// Caller-supplied title.
    pub title: String,
    /// User who requested the bundle.
    pub created_by: String,
    /// Priority level label, e.g. `High`.
    pub priority: String,
    /// Creation instant, ISO-8601 UTC with a trailing `Z`.
    pub created_on: String,
    /// Number of selected rows.
    pub rows: usize,
}

/// A rendered chart handed in by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct ChartImage {
    /// Caption drawn above the image.
    pub label: String,
    /// Encoded raster image (PNG or JPEG).
    pub bytes: Vec<u8>,
}

impl ChartImage {
    /// Create a chart from a label and encoded image bytes.
    #[must_use]
    pub fn new(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            bytes,
        }
    }
}

impl fmt::Debug for ChartImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartImage")
            .field("label", &self.label)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// What happened to one chart during report rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartOutcome {
    /// The chart got its own report page.
    Embedded {
        /// Chart caption.
        label: String,
    },
    /// The chart could not be decoded and was left out.
    Skipped {
        /// Chart caption.
        label: String,
        /// Decoder error.
        reason: String,
    },
}

impl ChartOutcome {
    /// Whether the chart made it into the report.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }

    /// Caption of the chart.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Embedded { label } | Self::Skipped { label, .. } => label,
        }
    }
}

/// A finished evidence bundle.
#[derive(Clone, PartialEq, Eq)]
pub struct EvidenceBundle {
    /// Bundle identifier.
    pub id: EvidenceId,
    /// ZIP archive bytes.
    pub archive: Vec<u8>,
    /// Metadata, identical to the JSON entry.
    pub metadata: EvidenceMetadata,
    /// Per-chart rendering outcome, in input order.
    pub charts: Vec<ChartOutcome>,
    /// BLAKE3 hex digest of `archive`.
    pub digest: String,
}

impl EvidenceBundle {
    /// Archive file name, `{id}.zip`.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.id.entry_name("zip")
    }

    /// Write the archive as `{id}.zip` under `dir`, creating `dir` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.archive)?;
        info!(evidence_id = %self.id, path = %path.display(), "Evidence bundle written");
        Ok(path)
    }
}

impl fmt::Debug for EvidenceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvidenceBundle")
            .field("id", &self.id)
            .field("archive", &self.archive.len())
            .field("metadata", &self.metadata)
            .field("charts", &self.charts)
            .field("digest", &self.digest)
            .finish()
    }
}

/// Builds evidence bundles. Holds presentation settings only; nothing about a
/// built bundle is retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceBundler {
    organization: String,
    excerpt_rows: usize,
}

impl Default for EvidenceBundler {
    fn default() -> Self {
        Self::new(DEFAULT_ORGANIZATION)
    }
}

impl EvidenceBundler {
    /// Create a bundler with the given organization banner.
    #[must_use]
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            excerpt_rows: DEFAULT_EXCERPT_ROWS,
        }
    }

    /// Set how many rows the report excerpt lists.
    #[must_use]
    pub fn with_excerpt_rows(mut self, excerpt_rows: usize) -> Self {
        self.excerpt_rows = excerpt_rows;
        self
    }

    /// Organization banner text.
    #[must_use]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Build a bundle for `rows`.
    ///
    /// An empty selection is allowed and yields a header-only CSV.
    ///
    /// # Errors
    ///
    /// Returns an error if CSV, JSON, PDF or ZIP generation fails. Chart decode
    /// failures are not errors.
    pub fn build(
        &self,
        rows: &[EventRecord],
        title: &str,
        user: &str,
        priority: &str,
        charts: &[ChartImage],
    ) -> Result<EvidenceBundle> {
        let id = EvidenceId::generate();
        let _span = info_span!("build_bundle", evidence_id = %id, rows = rows.len()).entered();

        let metadata = EvidenceMetadata {
            evidence_id: id.clone(),
            title: title.to_string(),
            created_by: user.to_string(),
            priority: priority.to_string(),
            created_on: format_timestamp(Utc::now()),
            rows: rows.len(),
        };

        let csv = archive::write_csv(rows)?;
        let json = serde_json::to_vec_pretty(&metadata)?;
        let rendered = report::render(&report::ReportInput {
            organization: &self.organization,
            metadata: &metadata,
            rows,
            charts,
            excerpt_rows: self.excerpt_rows,
        })?;
        for outcome in &rendered.charts {
            if let ChartOutcome::Skipped { label, reason } = outcome {
                warn!(chart = %label, %reason, "Chart skipped in evidence report");
            }
        }

        let archive = archive::pack(&id, &csv, &json, &rendered.pdf)?;
        let digest = blake3::hash(&archive).to_hex().to_string();

        info!(
            evidence_id = %id,
            rows = rows.len(),
            pages = rendered.pages,
            bytes = archive.len(),
            digest = %digest,
            "Evidence bundle built"
        );

        Ok(EvidenceBundle {
            id,
            archive,
            metadata,
            charts: rendered.charts,
            digest,
        })
    }
}

/// ISO-8601 UTC timestamp with microseconds and a trailing `Z`.
#[must_use]
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}
