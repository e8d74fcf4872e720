//! Priority insight rule.
//!
//! The rule fires when the target version's share of recent AIDs reaches a
//! threshold. It holds no state; callers evaluate it again whenever the window
//! or threshold changes.

use serde::{Deserialize, Serialize};

use crate::aggregate::{self, Attribute, AttributeComparison, WindowShare};
use crate::record::EventRecord;

/// Threshold predicate over the recent-window share.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsightRule {
    /// Share percentage at or above which packaging is recommended.
    pub threshold_pct: f64,
}

impl InsightRule {
    /// Create a rule with the given threshold percentage.
    #[must_use]
    pub fn new(threshold_pct: f64) -> Self {
        Self { threshold_pct }
    }

    /// Whether a share percentage triggers the priority signal.
    #[must_use]
    pub fn is_priority(&self, share_pct: f64) -> bool {
        share_pct >= self.threshold_pct
    }

    /// Evaluate against a computed window share.
    #[must_use]
    pub fn evaluate(&self, share: &WindowShare) -> bool {
        self.is_priority(share.percentage)
    }
}

/// Parameters for computing an [`Insight`].
#[derive(Debug, Clone, PartialEq)]
pub struct InsightParams<'a> {
    /// Trailing window length in days.
    pub window_days: u32,
    /// Software version under scrutiny.
    pub target: &'a str,
    /// Attribute compared between the target and the rest of the fleet.
    pub attribute: Attribute,
    /// Priority rule.
    pub rule: InsightRule,
}

/// The automated insight shown next to the trend views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Trailing window length in days.
    pub window_days: u32,
    /// Software version under scrutiny.
    pub target: String,
    /// Attribute used for the comparison.
    pub attribute: Attribute,
    /// Target share of recent AIDs.
    pub share: WindowShare,
    /// Attribute comparison, absent when either group is empty.
    pub comparison: Option<AttributeComparison>,
    /// Priority threshold applied.
    pub threshold_pct: f64,
    /// Whether evidence packaging is recommended.
    pub priority: bool,
}

impl Insight {
    /// Compute the insight over `records`.
    #[must_use]
    pub fn compute(records: &[EventRecord], params: &InsightParams<'_>) -> Self {
        let share = aggregate::recent_share(records, params.window_days, params.target);
        let comparison = aggregate::compare_attribute(
            records,
            params.window_days,
            params.target,
            params.attribute,
        );
        Self {
            window_days: params.window_days,
            target: params.target.to_string(),
            attribute: params.attribute,
            share,
            comparison,
            threshold_pct: params.rule.threshold_pct,
            priority: params.rule.evaluate(&share),
        }
    }

    /// One-paragraph narrative of the insight.
    #[must_use]
    pub fn narrative(&self) -> String {
        let mut text = format!(
            "In the last {} days, SW {} accounts for {} AIDs ({:.0}% of recent AIDs).",
            self.window_days, self.target, self.share.target_total, self.share.percentage
        );
        if let Some(cmp) = &self.comparison {
            let unit = self.attribute.unit();
            text.push_str(&format!(
                " Average {} for {} events = {:.0}{unit} vs others {:.0}{unit} \
                 (delta={:.0}{unit}).",
                self.attribute, self.target, cmp.target_mean, cmp.others_mean, cmp.difference
            ));
        }
        text
    }

    /// Banner text for the priority signal, if raised.
    #[must_use]
    pub fn priority_banner(&self) -> Option<String> {
        self.priority.then(|| {
            format!(
                "PRIORITY: {} correlated spike detected - recommended evidence packaging.",
                self.target
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;

    fn share(percentage: f64) -> WindowShare {
        WindowShare {
            target_total: 0,
            window_total: 1,
            percentage,
        }
    }

    #[test]
    fn test_rule_threshold_inclusive() {
        let rule = InsightRule::new(30.0);
        assert!(rule.evaluate(&share(30.0)));
        assert!(rule.evaluate(&share(30.1)));
        assert!(!rule.evaluate(&share(29.99)));
    }

    #[test]
    fn test_rule_reevaluates_with_new_threshold() {
        let s = share(50.0);
        assert!(InsightRule::new(30.0).evaluate(&s));
        assert!(!InsightRule::new(80.0).evaluate(&s));
    }

    #[test]
    fn test_insight_sample() {
        let store = RecordStore::sample().unwrap();
        let insight = Insight::compute(
            store.records(),
            &InsightParams {
                window_days: 15,
                target: "v2.1",
                attribute: Attribute::Humidity,
                rule: InsightRule::new(30.0),
            },
        );
        assert!(insight.priority);
        assert!(insight.comparison.is_some());
        assert_eq!(
            insight.narrative(),
            "In the last 15 days, SW v2.1 accounts for 19 AIDs (95% of recent AIDs). \
             Average humidity for v2.1 events = 81% vs others 47% (delta=33%)."
        );
        assert!(insight.priority_banner().unwrap().starts_with("PRIORITY: v2.1"));
    }

    #[test]
    fn test_narrative_unit_only_for_humidity() {
        let store = RecordStore::sample().unwrap();
        let insight = Insight::compute(
            store.records(),
            &InsightParams {
                window_days: 15,
                target: "v2.1",
                attribute: Attribute::FlightHours,
                rule: InsightRule::new(30.0),
            },
        );
        let narrative = insight.narrative();
        assert!(narrative.contains("Average flight_hours for v2.1 events = "));
        assert_eq!(narrative.matches('%').count(), 1);
    }

    #[test]
    fn test_insight_without_comparison() {
        let store = RecordStore::sample().unwrap();
        let insight = Insight::compute(
            store.records(),
            &InsightParams {
                window_days: 15,
                target: "v9.9",
                attribute: Attribute::Humidity,
                rule: InsightRule::new(5.0),
            },
        );
        assert!(!insight.priority);
        assert!(insight.comparison.is_none());
        assert!(insight.priority_banner().is_none());
        assert!(!insight.narrative().contains("Average"));
    }
}
