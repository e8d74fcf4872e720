//! Per-user analysis session.
//!
//! A [`Session`] owns everything one analyst touches: the record store, the
//! audit trail, and the metadata of every bundle packaged so far. Sessions
//! share nothing with each other.

use tracing::{debug, info};

use crate::aggregate::{self, BeforeAfter, DailyTotal, FleetSummary};
use crate::audit::AuditLog;
use crate::bundle::{ChartImage, EvidenceBundle, EvidenceBundler, EvidenceMetadata};
use crate::config::{AnalysisConfig, Config};
use crate::error::{Error, Result};
use crate::insight::{Insight, InsightParams, InsightRule};
use crate::record::EventRecord;
use crate::store::{RecordStore, RowFilter};

/// Session state for one analyst.
#[derive(Debug, Clone)]
pub struct Session {
    store: RecordStore,
    analysis: AnalysisConfig,
    bundler: EvidenceBundler,
    audit: AuditLog,
    repository: Vec<EvidenceMetadata>,
}

impl Session {
    /// Create a session over `store`.
    #[must_use]
    pub fn new(store: RecordStore, analysis: AnalysisConfig, bundler: EvidenceBundler) -> Self {
        debug!(source = store.source(), rows = store.len(), "Session opened");
        Self {
            store,
            analysis,
            bundler,
            audit: AuditLog::new(),
            repository: Vec::new(),
        }
    }

    /// Open a session from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured dataset cannot be read.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = RecordStore::load(config.dataset_path())?;
        let bundler = EvidenceBundler::new(config.evidence.organization.clone())
            .with_excerpt_rows(config.evidence.excerpt_rows);
        Ok(Self::new(store, config.analysis.clone(), bundler))
    }

    /// The record store.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Analysis settings in effect.
    #[must_use]
    pub fn analysis(&self) -> &AnalysisConfig {
        &self.analysis
    }

    /// Mutable analysis settings, for per-request overrides.
    pub fn analysis_mut(&mut self) -> &mut AnalysisConfig {
        &mut self.analysis
    }

    /// Audit trail for this session.
    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Metadata of every bundle built in this session, in build order.
    #[must_use]
    pub fn evidence_repository(&self) -> &[EvidenceMetadata] {
        &self.repository
    }

    /// Insight for the configured window, target and attribute.
    #[must_use]
    pub fn insight(&self) -> Insight {
        let params = InsightParams {
            window_days: self.analysis.cutoff_days,
            target: &self.analysis.target_version,
            attribute: self.analysis.attribute,
            rule: InsightRule::new(self.analysis.priority_threshold_pct),
        };
        Insight::compute(self.store.records(), &params)
    }

    /// Fleet KPIs for the configured window and target.
    #[must_use]
    pub fn summary(&self) -> FleetSummary {
        aggregate::fleet_summary(
            self.store.records(),
            self.analysis.cutoff_days,
            &self.analysis.target_version,
        )
    }

    /// Daily AID totals, fleet-wide or for one version.
    #[must_use]
    pub fn daily(&self, version: Option<&str>) -> Vec<DailyTotal> {
        match version {
            Some(v) => aggregate::version_daily_series(self.store.records(), v),
            None => aggregate::daily_series(self.store.records()),
        }
    }

    /// Per-version totals before and after the configured cutoff.
    #[must_use]
    pub fn before_after(&self) -> BeforeAfter {
        aggregate::before_after(self.store.records(), self.analysis.cutoff_days)
    }

    /// Rows matching `filter`, in store order.
    #[must_use]
    pub fn select(&self, filter: &RowFilter) -> Vec<EventRecord> {
        self.store.select(filter)
    }

    /// Package `rows` into an evidence bundle and record it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientRows`] when fewer than `min_rows` rows are
    /// given, or any bundling error. Nothing is recorded on failure.
    pub fn package(
        &mut self,
        rows: &[EventRecord],
        title: &str,
        user: &str,
        priority: &str,
        charts: &[ChartImage],
    ) -> Result<EvidenceBundle> {
        if rows.len() < self.analysis.min_rows {
            return Err(Error::InsufficientRows {
                required: self.analysis.min_rows,
                actual: rows.len(),
            });
        }

        let bundle = self.bundler.build(rows, title, user, priority, charts)?;
        self.audit.record(&bundle);
        self.repository.push(bundle.metadata.clone());
        info!(
            evidence_id = %bundle.id,
            packaged = self.repository.len(),
            "Evidence packaged"
        );
        Ok(bundle)
    }
}
