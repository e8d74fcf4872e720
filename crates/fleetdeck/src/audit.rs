//! Append-only audit log of evidence bundles built in a session.
//!
//! The log lives as long as its owning session and is never persisted.
//! Entries are only ever appended, so insertion order is time order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bundle::{EvidenceBundle, EvidenceId};

/// One record of a successful bundle build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
    /// Bundle identifier.
    pub evidence_id: EvidenceId,
    /// Bundle title.
    pub title: String,
    /// User who requested the bundle.
    pub user: String,
    /// Priority level label.
    pub priority: String,
    /// Number of rows packaged.
    pub rows: usize,
    /// BLAKE3 digest of the archive.
    pub digest: String,
}

/// Session-lifetime audit trail.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry for a freshly built bundle.
    pub fn record(&mut self, bundle: &EvidenceBundle) -> &AuditEntry {
        let meta = &bundle.metadata;
        let entry = AuditEntry {
            timestamp: Utc::now(),
            evidence_id: bundle.id.clone(),
            title: meta.title.clone(),
            user: meta.created_by.clone(),
            priority: meta.priority.clone(),
            rows: meta.rows,
            digest: bundle.digest.clone(),
        };
        info!(
            evidence_id = %entry.evidence_id,
            user = %entry.user,
            rows = entry.rows,
            "Audit entry recorded"
        );
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, AuditEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a AuditLog {
    type Item = &'a AuditEntry;
    type IntoIter = std::slice::Iter<'a, AuditEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::EvidenceBundler;
    use crate::store::RecordStore;

    fn bundle(title: &str) -> EvidenceBundle {
        let store = RecordStore::sample().unwrap();
        EvidenceBundler::default()
            .build(&store.records()[..2], title, "J. Doe", "High", &[])
            .unwrap()
    }

    #[test]
    fn test_new_log_is_empty() {
        let log = AuditLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn test_record_copies_bundle_fields() {
        let mut log = AuditLog::new();
        let built = bundle("First");
        let entry = log.record(&built).clone();

        assert_eq!(entry.evidence_id, built.id);
        assert_eq!(entry.title, "First");
        assert_eq!(entry.user, "J. Doe");
        assert_eq!(entry.priority, "High");
        assert_eq!(entry.rows, 2);
        assert_eq!(entry.digest, built.digest);
    }

    #[test]
    fn test_entries_in_insertion_order() {
        let mut log = AuditLog::new();
        for title in ["a", "b", "c"] {
            log.record(&bundle(title));
        }
        let titles: Vec<&str> = log.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert!(log
            .entries()
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!((&log).into_iter().count(), 3);
    }
}
