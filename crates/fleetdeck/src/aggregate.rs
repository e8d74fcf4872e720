//! Aggregate views over fleet events.
//!
//! Every function here is pure: it reads a slice of records and returns a
//! freshly computed view. Nothing is cached between calls.
//!
//! Window-based views share one cutoff rule: the cutoff is the latest event
//! date minus the window length in days. Rows dated on or after the cutoff are
//! "recent" (the "after" side of a split); rows before it are "before".

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::EventRecord;

/// Total AIDs recorded on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    /// Calendar date.
    pub date: NaiveDate,
    /// Sum of `aid_count` on that date.
    pub aid_count: u64,
}

/// Before/after AID totals for one software version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDelta {
    /// Software version.
    pub version: String,
    /// AIDs dated before the cutoff.
    pub before: u64,
    /// AIDs dated on or after the cutoff.
    pub after: u64,
    /// `after - before`.
    pub delta: i64,
}

/// Result of splitting the store at a cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeforeAfter {
    /// The computed cutoff; `None` for an empty store.
    pub cutoff: Option<NaiveDate>,
    /// One row per version seen on either side, sorted by version.
    pub rows: Vec<VersionDelta>,
}

/// Share of recent AIDs attributed to one version.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowShare {
    /// AIDs for the target version in the window.
    pub target_total: u64,
    /// AIDs for every version in the window, never zero.
    pub window_total: u64,
    /// `100 * target_total / window_total`.
    pub percentage: f64,
}

/// Mean of one attribute for the target version against all other rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeComparison {
    /// Mean over target-version rows.
    pub target_mean: f64,
    /// Mean over all other rows.
    pub others_mean: f64,
    /// `target_mean - others_mean`.
    pub difference: f64,
}

/// Headline numbers for the executive view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    /// AIDs across the whole store.
    pub total_aids: u64,
    /// AIDs for the target version across the whole store.
    pub target_aids: u64,
    /// Recent-window share for the target version.
    pub recent: WindowShare,
}

/// Numeric record attribute usable in cross-group comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Relative humidity.
    #[default]
    Humidity,
    /// Flight hours.
    FlightHours,
    /// Outside air temperature.
    Oat,
    /// AID count.
    AidCount,
    /// ATA chapter.
    AtaChapter,
}

impl Attribute {
    /// Read this attribute from a record.
    #[must_use]
    pub fn value(self, record: &EventRecord) -> f64 {
        match self {
            Self::Humidity => record.humidity,
            Self::FlightHours => record.flight_hours,
            Self::Oat => record.oat,
            Self::AidCount => f64::from(record.aid_count),
            Self::AtaChapter => f64::from(record.ata_chapter),
        }
    }

    /// Column name of this attribute.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Humidity => "humidity",
            Self::FlightHours => "flight_hours",
            Self::Oat => "oat",
            Self::AidCount => "aid_count",
            Self::AtaChapter => "ata_chapter",
        }
    }

    /// Unit suffix used when printing values of this attribute.
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Humidity => "%",
            _ => "",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "humidity" => Ok(Self::Humidity),
            "flight_hours" => Ok(Self::FlightHours),
            "oat" => Ok(Self::Oat),
            "aid_count" => Ok(Self::AidCount),
            "ata_chapter" => Ok(Self::AtaChapter),
            other => Err(format!("unknown attribute: {other}")),
        }
    }
}

/// Cutoff date for a trailing window, or `None` for an empty slice.
#[must_use]
pub fn window_cutoff(records: &[EventRecord], window_days: u32) -> Option<NaiveDate> {
    let latest = records.iter().map(|r| r.date).max()?;
    Some(
        latest
            .checked_sub_signed(Duration::days(i64::from(window_days)))
            .unwrap_or(NaiveDate::MIN),
    )
}

/// Rows dated on or after the window cutoff.
#[must_use]
pub fn recent_window(records: &[EventRecord], window_days: u32) -> Vec<&EventRecord> {
    match window_cutoff(records, window_days) {
        Some(cutoff) => records.iter().filter(|r| r.date >= cutoff).collect(),
        None => Vec::new(),
    }
}

fn sum_by_date<'a>(records: impl Iterator<Item = &'a EventRecord>) -> Vec<DailyTotal> {
    let mut totals: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.date).or_default() += u64::from(record.aid_count);
    }
    totals
        .into_iter()
        .map(|(date, aid_count)| DailyTotal { date, aid_count })
        .collect()
}

fn sum_by_version<'a>(records: impl Iterator<Item = &'a EventRecord>) -> BTreeMap<&'a str, u64> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(record.sw_version.as_str()).or_default() += u64::from(record.aid_count);
    }
    totals
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = values.len() as f64;
    Some(values.iter().sum::<f64>() / count)
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Daily AID totals across the fleet, ordered by date.
///
/// Dates without events are absent; the series is not gap-filled.
#[must_use]
pub fn daily_series(records: &[EventRecord]) -> Vec<DailyTotal> {
    sum_by_date(records.iter())
}

/// Daily AID totals for a single software version.
#[must_use]
pub fn version_daily_series(records: &[EventRecord], version: &str) -> Vec<DailyTotal> {
    sum_by_date(records.iter().filter(|r| r.sw_version == version))
}

/// Per-version AID totals before and after the window cutoff.
#[must_use]
pub fn before_after(records: &[EventRecord], window_days: u32) -> BeforeAfter {
    let Some(cutoff) = window_cutoff(records, window_days) else {
        return BeforeAfter {
            cutoff: None,
            rows: Vec::new(),
        };
    };

    let before = sum_by_version(records.iter().filter(|r| r.date < cutoff));
    let after = sum_by_version(records.iter().filter(|r| r.date >= cutoff));

    let mut versions: Vec<&str> = before.keys().chain(after.keys()).copied().collect();
    versions.sort_unstable();
    versions.dedup();

    let rows = versions
        .into_iter()
        .map(|version| {
            let before = before.get(version).copied().unwrap_or(0);
            let after = after.get(version).copied().unwrap_or(0);
            VersionDelta {
                version: version.to_string(),
                before,
                after,
                delta: signed(after) - signed(before),
            }
        })
        .collect::<Vec<_>>();

    debug!(%cutoff, versions = rows.len(), "Computed before/after split");
    BeforeAfter {
        cutoff: Some(cutoff),
        rows,
    }
}

/// Share of recent-window AIDs belonging to `target`.
///
/// A window summing to zero is treated as a total of one, so the percentage
/// is always defined.
#[must_use]
pub fn recent_share(records: &[EventRecord], window_days: u32, target: &str) -> WindowShare {
    let recent = recent_window(records, window_days);
    let total: u64 = recent.iter().map(|r| u64::from(r.aid_count)).sum();
    let target_total: u64 = recent
        .iter()
        .filter(|r| r.sw_version == target)
        .map(|r| u64::from(r.aid_count))
        .sum();
    let window_total = total.max(1);

    #[allow(clippy::cast_precision_loss)]
    let percentage = 100.0 * target_total as f64 / window_total as f64;

    WindowShare {
        target_total,
        window_total,
        percentage,
    }
}

/// Compare the mean of `attribute` for `target` rows with all other rows in
/// the recent window.
///
/// Returns `None` when either side has no rows.
#[must_use]
pub fn compare_attribute(
    records: &[EventRecord],
    window_days: u32,
    target: &str,
    attribute: Attribute,
) -> Option<AttributeComparison> {
    let (target_rows, other_rows): (Vec<&EventRecord>, Vec<&EventRecord>) =
        recent_window(records, window_days)
            .into_iter()
            .partition(|r| r.sw_version == target);

    let target_values: Vec<f64> = target_rows.iter().map(|r| attribute.value(r)).collect();
    let other_values: Vec<f64> = other_rows.iter().map(|r| attribute.value(r)).collect();

    let target_mean = mean(&target_values)?;
    let others_mean = mean(&other_values)?;
    Some(AttributeComparison {
        target_mean,
        others_mean,
        difference: target_mean - others_mean,
    })
}

/// Headline numbers for `target` over the whole store and the recent window.
#[must_use]
pub fn fleet_summary(records: &[EventRecord], window_days: u32, target: &str) -> FleetSummary {
    FleetSummary {
        total_aids: records.iter().map(|r| u64::from(r.aid_count)).sum(),
        target_aids: records
            .iter()
            .filter(|r| r.sw_version == target)
            .map(|r| u64::from(r.aid_count))
            .sum(),
        recent: recent_share(records, window_days, target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(day: NaiveDate, version: &str, aid_count: u32, humidity: f64) -> EventRecord {
        EventRecord {
            date: day,
            tail: "N100".to_string(),
            sw_version: version.to_string(),
            aid_count,
            fault_code: "FC100".to_string(),
            humidity,
            ata_chapter: 31,
            flight_hours: 10.0,
            oat: 20.0,
            airport: "KATL".to_string(),
        }
    }

    fn sample() -> Vec<EventRecord> {
        RecordStore::sample().unwrap().records().to_vec()
    }

    #[test]
    fn test_daily_series_sample() {
        let records = sample();
        let series = daily_series(&records);
        assert_eq!(series.len(), 30);
        assert_eq!(series[0].date, date(2025, 10, 16));
        assert_eq!(series.iter().map(|d| d.aid_count).sum::<u64>(), 32);
    }

    #[test]
    fn test_daily_series_merges_same_date_and_leaves_gaps() {
        let records = vec![
            record(date(2025, 1, 1), "v1", 2, 0.0),
            record(date(2025, 1, 1), "v2", 3, 0.0),
            record(date(2025, 1, 4), "v1", 1, 0.0),
        ];
        let series = daily_series(&records);
        assert_eq!(
            series,
            vec![
                DailyTotal {
                    date: date(2025, 1, 1),
                    aid_count: 5
                },
                DailyTotal {
                    date: date(2025, 1, 4),
                    aid_count: 1
                },
            ]
        );
    }

    #[test]
    fn test_version_daily_series() {
        let records = sample();
        let series = version_daily_series(&records, "v2.1");
        assert_eq!(series.len(), 13);
        assert_eq!(series.iter().map(|d| d.aid_count).sum::<u64>(), 29);
    }

    #[test]
    fn test_before_after_sample() {
        let records = sample();
        let split = before_after(&records, 15);
        assert_eq!(split.cutoff, Some(date(2025, 10, 30)));

        let versions: Vec<&str> = split.rows.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["v1.9", "v2.0", "v2.1"]);

        let v21 = &split.rows[2];
        assert_eq!(v21.before, 10);
        assert_eq!(v21.after, 19);
        assert_eq!(v21.delta, 9);

        let v20 = &split.rows[1];
        assert_eq!(v20.before, 2);
        assert_eq!(v20.after, 1);
        assert_eq!(v20.delta, -1);
    }

    #[test]
    fn test_before_after_version_only_on_one_side() {
        let records = vec![
            record(date(2025, 1, 1), "old", 4, 0.0),
            record(date(2025, 1, 20), "new", 2, 0.0),
        ];
        let split = before_after(&records, 5);
        assert_eq!(split.cutoff, Some(date(2025, 1, 15)));
        assert_eq!(
            split.rows,
            vec![
                VersionDelta {
                    version: "new".to_string(),
                    before: 0,
                    after: 2,
                    delta: 2
                },
                VersionDelta {
                    version: "old".to_string(),
                    before: 4,
                    after: 0,
                    delta: -4
                },
            ]
        );
    }

    #[test]
    fn test_before_after_empty() {
        let split = before_after(&[], 15);
        assert!(split.cutoff.is_none());
        assert!(split.rows.is_empty());
    }

    #[test]
    fn test_cutoff_day_is_recent() {
        let records = vec![
            record(date(2025, 1, 5), "v1", 1, 0.0),
            record(date(2025, 1, 10), "v1", 1, 0.0),
        ];
        // cutoff = 2025-01-05, which is inclusive on the recent side
        assert_eq!(recent_window(&records, 5).len(), 2);
        assert_eq!(recent_window(&records, 4).len(), 1);
    }

    #[test]
    fn test_recent_share_sample() {
        let records = sample();
        let share = recent_share(&records, 15, "v2.1");
        assert_eq!(share.target_total, 19);
        assert_eq!(share.window_total, 20);
        assert!((share.percentage - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_recent_share_thirty_percent() {
        // Window total 40, target 12
        let end = date(2025, 3, 31);
        let mut records = vec![record(end, "v2.1", 12, 0.0), record(end, "v2.0", 28, 0.0)];
        records.push(record(date(2025, 1, 1), "v2.1", 100, 0.0));
        let share = recent_share(&records, 15, "v2.1");
        assert_eq!(share.target_total, 12);
        assert_eq!(share.window_total, 40);
        assert!((share.percentage - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_recent_share_zero_window_total() {
        let records = vec![record(date(2025, 1, 1), "v2.1", 0, 0.0)];
        let share = recent_share(&records, 15, "v2.1");
        assert_eq!(share.target_total, 0);
        assert_eq!(share.window_total, 1);
        assert!(share.percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn test_recent_share_empty_store() {
        let share = recent_share(&[], 15, "v2.1");
        assert_eq!(share.window_total, 1);
        assert!(share.percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn test_compare_humidity_sample() {
        let records = sample();
        let cmp = compare_attribute(&records, 15, "v2.1", Attribute::Humidity).unwrap();
        assert!((cmp.target_mean - 80.75).abs() < 1e-9);
        assert!((cmp.others_mean - 47.375).abs() < 1e-9);
        assert!((cmp.difference - 33.375).abs() < 1e-9);
    }

    #[test]
    fn test_compare_empty_complement_is_none() {
        let records = vec![
            record(date(2025, 1, 10), "v2.1", 1, 80.0),
            record(date(2025, 1, 11), "v2.1", 1, 70.0),
        ];
        assert!(compare_attribute(&records, 15, "v2.1", Attribute::Humidity).is_none());
    }

    #[test]
    fn test_compare_empty_target_is_none() {
        let records = vec![record(date(2025, 1, 10), "v2.0", 1, 80.0)];
        assert!(compare_attribute(&records, 15, "v2.1", Attribute::Humidity).is_none());
    }

    #[test]
    fn test_compare_ignores_rows_outside_window() {
        let records = vec![
            record(date(2025, 1, 1), "v2.0", 1, 10.0),
            record(date(2025, 3, 1), "v2.1", 1, 80.0),
        ];
        assert!(compare_attribute(&records, 15, "v2.1", Attribute::Humidity).is_none());
    }

    #[test]
    fn test_compare_other_attribute() {
        let records = vec![
            record(date(2025, 1, 10), "v2.1", 4, 0.0),
            record(date(2025, 1, 10), "v2.0", 1, 0.0),
        ];
        let cmp = compare_attribute(&records, 15, "v2.1", Attribute::AidCount).unwrap();
        assert!((cmp.difference - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fleet_summary_sample() {
        let records = sample();
        let summary = fleet_summary(&records, 15, "v2.1");
        assert_eq!(summary.total_aids, 32);
        assert_eq!(summary.target_aids, 29);
        assert_eq!(summary.recent.target_total, 19);
    }

    #[test]
    fn test_attribute_parse_and_display() {
        assert_eq!("humidity".parse::<Attribute>().unwrap(), Attribute::Humidity);
        assert_eq!(" OAT ".parse::<Attribute>().unwrap(), Attribute::Oat);
        assert!("pressure".parse::<Attribute>().is_err());
        assert_eq!(Attribute::FlightHours.to_string(), "flight_hours");
        assert_eq!(Attribute::default(), Attribute::Humidity);
        assert_eq!(Attribute::Humidity.unit(), "%");
        assert_eq!(Attribute::Oat.unit(), "");
    }

    fn arb_records() -> impl Strategy<Value = Vec<EventRecord>> {
        let row = (
            0u32..60,
            prop::sample::select(vec!["v1.9", "v2.0", "v2.1"]),
            0u32..10,
            0.0f64..100.0,
        );
        prop::collection::vec(row, 0..40).prop_map(|rows| {
            rows.into_iter()
                .map(|(offset, version, aids, humidity)| {
                    let day = date(2025, 1, 1) + Duration::days(i64::from(offset));
                    record(day, version, aids, humidity)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_daily_series_conserves_total(records in arb_records()) {
            let total: u64 = records.iter().map(|r| u64::from(r.aid_count)).sum();
            let series_total: u64 = daily_series(&records).iter().map(|d| d.aid_count).sum();
            prop_assert_eq!(total, series_total);
        }

        #[test]
        fn prop_before_after_partitions_each_version(records in arb_records(), window in 0u32..90) {
            let split = before_after(&records, window);
            for row in &split.rows {
                let total: u64 = records
                    .iter()
                    .filter(|r| r.sw_version == row.version)
                    .map(|r| u64::from(r.aid_count))
                    .sum();
                prop_assert_eq!(row.before + row.after, total);
                prop_assert_eq!(row.delta, signed(row.after) - signed(row.before));
            }
            let mut seen: Vec<&str> = records.iter().map(|r| r.sw_version.as_str()).collect();
            seen.sort_unstable();
            seen.dedup();
            prop_assert_eq!(split.rows.len(), seen.len());
        }

        #[test]
        fn prop_recent_share_bounded(records in arb_records(), window in 0u32..90) {
            let share = recent_share(&records, window, "v2.1");
            prop_assert!(share.window_total >= 1);
            prop_assert!(share.percentage >= 0.0 && share.percentage <= 100.0);
        }

        #[test]
        fn prop_comparison_none_iff_side_empty(records in arb_records(), window in 0u32..90) {
            let recent = recent_window(&records, window);
            let target = recent.iter().filter(|r| r.sw_version == "v2.1").count();
            let others = recent.len() - target;
            let cmp = compare_attribute(&records, window, "v2.1", Attribute::Humidity);
            prop_assert_eq!(cmp.is_none(), target == 0 || others == 0);
        }
    }
}
