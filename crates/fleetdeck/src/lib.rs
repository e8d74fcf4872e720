//! `fleetdeck` - Fleet fault analytics and compliance evidence bundling
//!
//! This library loads aircraft fault events, computes the trend views used to
//! spot software-version regressions, and packages selected events into
//! self-describing evidence bundles with an in-session audit trail.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod audit;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;
pub mod insight;
pub mod logging;
pub mod record;
pub mod session;
pub mod store;

pub use aggregate::Attribute;
pub use audit::{AuditEntry, AuditLog};
pub use bundle::{
    ChartImage, ChartOutcome, EvidenceArchive, EvidenceBundle, EvidenceBundler, EvidenceId,
    EvidenceMetadata,
};
pub use config::Config;
pub use error::{Error, Result};
pub use insight::{Insight, InsightRule};
pub use logging::init_logging;
pub use record::EventRecord;
pub use session::Session;
pub use store::{RecordStore, RowFilter};
