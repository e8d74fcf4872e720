//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::aggregate::Attribute;
use crate::store::RowFilter;

/// Summary command arguments.
#[derive(Debug, Args)]
pub struct SummaryCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Trailing window in days (overrides config)
    #[arg(short, long, value_name = "DAYS")]
    pub window: Option<u32>,

    /// Priority trigger as a percentage of recent AIDs (overrides config)
    #[arg(short, long, value_name = "PCT")]
    pub threshold: Option<f64>,

    /// Software version under scrutiny (overrides config)
    #[arg(long, value_name = "VERSION")]
    pub target: Option<String>,

    /// Attribute to compare (overrides config)
    #[arg(short, long, value_enum)]
    pub attribute: Option<AttributeArg>,
}

/// Daily series command arguments.
#[derive(Debug, Args)]
pub struct DailyCommand {
    /// Restrict to one software version
    #[arg(id = "sw_version", long = "sw-version", value_name = "VERSION")]
    pub sw_version: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Before/after comparison command arguments.
#[derive(Debug, Args)]
pub struct CompareCommand {
    /// Trailing window in days (overrides config)
    #[arg(short, long, value_name = "DAYS")]
    pub window: Option<u32>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Evidence packaging command arguments.
#[derive(Debug, Args)]
pub struct PackageCommand {
    /// Bundle title
    #[arg(short, long)]
    pub title: String,

    /// User recorded as creator (defaults to config, then "analyst")
    #[arg(short, long)]
    pub user: Option<String>,

    /// Priority level
    #[arg(short, long, value_enum, default_value = "high")]
    pub priority: PriorityArg,

    /// Only rows with this software version
    #[arg(id = "sw_version", long = "sw-version", value_name = "VERSION")]
    pub sw_version: Option<String>,

    /// Only rows for this tail number
    #[arg(long)]
    pub tail: Option<String>,

    /// Only rows on or after this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    pub since: Option<NaiveDate>,

    /// Only rows on or before this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    pub until: Option<NaiveDate>,

    /// Chart image to embed, as LABEL=PATH (repeatable)
    #[arg(long = "chart", value_name = "LABEL=PATH", value_parser = parse_chart)]
    pub charts: Vec<ChartSpec>,

    /// Directory for the bundle (overrides config)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl PackageCommand {
    /// Row filter built from the selection flags.
    #[must_use]
    pub fn filter(&self) -> RowFilter {
        RowFilter {
            version: self.sw_version.clone(),
            tail: self.tail.clone(),
            since: self.since,
            until: self.until,
        }
    }
}

/// Bundle inspection command arguments.
#[derive(Debug, Args)]
pub struct InspectCommand {
    /// Bundle archive to open
    pub file: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Attribute argument for comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AttributeArg {
    /// Relative humidity
    Humidity,
    /// Flight hours
    FlightHours,
    /// Outside air temperature
    Oat,
    /// AID count
    AidCount,
    /// ATA chapter
    AtaChapter,
}

impl From<AttributeArg> for Attribute {
    fn from(arg: AttributeArg) -> Self {
        match arg {
            AttributeArg::Humidity => Self::Humidity,
            AttributeArg::FlightHours => Self::FlightHours,
            AttributeArg::Oat => Self::Oat,
            AttributeArg::AidCount => Self::AidCount,
            AttributeArg::AtaChapter => Self::AtaChapter,
        }
    }
}

/// Priority level recorded on a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    /// Routine review
    Low,
    /// Elevated
    Medium,
    /// Needs attention
    High,
    /// Immediate action
    Critical,
}

impl fmt::Display for PriorityArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// A `--chart LABEL=PATH` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    /// Caption shown above the chart.
    pub label: String,
    /// Image file to read.
    pub path: PathBuf,
}

fn parse_chart(value: &str) -> Result<ChartSpec, String> {
    let (label, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=PATH, got '{value}'"))?;
    let label = label.trim();
    if label.is_empty() || path.is_empty() {
        return Err(format!("expected LABEL=PATH, got '{value}'"));
    }
    Ok(ChartSpec {
        label: label.to_string(),
        path: PathBuf::from(path),
    })
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
    crate::record::parse_date(value).map_err(|e| format!("invalid date '{value}': {e}"))
}
