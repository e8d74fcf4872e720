//! Fleet event records.
//!
//! One [`EventRecord`] is one row of the fleet event table. Field order is the
//! column order used for every tabular export.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Column names of the event table, in export order.
pub const COLUMNS: [&str; 10] = [
    "date",
    "tail",
    "sw_version",
    "aid_count",
    "fault_code",
    "humidity",
    "ata_chapter",
    "flight_hours",
    "oat",
    "airport",
];

/// A single aircraft fault event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Calendar date of the event.
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    /// Aircraft tail number.
    pub tail: String,
    /// Installed software version, e.g. `v2.1`.
    pub sw_version: String,
    /// Automated inspection/detection events counted on this row.
    pub aid_count: u32,
    /// Fault code reported.
    pub fault_code: String,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// ATA chapter classification.
    pub ata_chapter: i32,
    /// Flight hours logged.
    pub flight_hours: f64,
    /// Outside air temperature.
    pub oat: f64,
    /// Airport code.
    pub airport: String,
}

impl EventRecord {
    /// Cell values as display strings, in [`COLUMNS`] order.
    #[must_use]
    pub fn cells(&self) -> [String; 10] {
        [
            self.date.format("%Y-%m-%d").to_string(),
            self.tail.clone(),
            self.sw_version.clone(),
            self.aid_count.to_string(),
            self.fault_code.clone(),
            self.humidity.to_string(),
            self.ata_chapter.to_string(),
            self.flight_hours.to_string(),
            self.oat.to_string(),
            self.airport.clone(),
        ]
    }
}

/// Parse a calendar date, also accepting full timestamps.
///
/// # Errors
///
/// Returns the last parse error if no supported format matches.
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts.date());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ts| ts.date())
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(|e| serde::de::Error::custom(format!("date '{raw}': {e}")))
}
