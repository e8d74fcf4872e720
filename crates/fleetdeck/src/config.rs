//! Configuration management for fleetdeck.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::aggregate::Attribute;
use crate::bundle::{DEFAULT_EXCERPT_ROWS, DEFAULT_ORGANIZATION};
use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "fleetdeck";

/// Default evidence output directory name.
const EVIDENCE_DIR_NAME: &str = "evidence";

/// Accepted range for the cutoff window, in days.
pub const CUTOFF_DAYS_RANGE: (u32, u32) = (7, 45);

/// Accepted range for the priority threshold, in percent.
pub const THRESHOLD_PCT_RANGE: (f64, f64) = (5.0, 80.0);

/// Accepted range for the minimum packaging row count.
pub const MIN_ROWS_RANGE: (usize, usize) = (1, 50);

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLEETDECK_`, `__` between levels)
/// 2. TOML config file at `~/.config/fleetdeck/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset configuration.
    pub dataset: DatasetConfig,
    /// Analysis parameters.
    pub analysis: AnalysisConfig,
    /// Evidence bundle configuration.
    pub evidence: EvidenceConfig,
}

/// Dataset-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// CSV file with fleet events. The embedded sample is used when unset.
    pub path: Option<PathBuf>,
}

/// Analysis parameters shared by the aggregate views and the insight rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Trailing window, in days, for before/after and recent views.
    pub cutoff_days: u32,
    /// Recent-window share at or above which packaging is recommended.
    pub priority_threshold_pct: f64,
    /// Minimum number of selected rows needed to package evidence.
    pub min_rows: usize,
    /// Software version under scrutiny.
    pub target_version: String,
    /// Attribute compared between the target version and the rest.
    pub attribute: Attribute,
}

/// Evidence bundle configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Organization banner on the report cover.
    pub organization: String,
    /// User recorded when none is given on the command line.
    pub default_user: Option<String>,
    /// Directory where the CLI writes bundles.
    /// Defaults to `~/.local/share/fleetdeck/evidence`
    pub output_dir: Option<PathBuf>,
    /// Rows listed in the report excerpt.
    pub excerpt_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cutoff_days: 15,
            priority_threshold_pct: 30.0,
            min_rows: 2,
            target_version: "v2.1".to_string(),
            attribute: Attribute::Humidity,
        }
    }
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            organization: DEFAULT_ORGANIZATION.to_string(),
            default_user: None,
            output_dir: None, // Resolved at runtime
            excerpt_rows: DEFAULT_EXCERPT_ROWS,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        let config = Self::figment(&config_file).extract::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("FLEETDECK_").split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;

        let (lo, hi) = CUTOFF_DAYS_RANGE;
        if !(lo..=hi).contains(&analysis.cutoff_days) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "cutoff_days ({}) must be between {lo} and {hi}",
                    analysis.cutoff_days
                ),
            });
        }

        let (lo, hi) = THRESHOLD_PCT_RANGE;
        if !(lo..=hi).contains(&analysis.priority_threshold_pct) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "priority_threshold_pct ({}) must be between {lo} and {hi}",
                    analysis.priority_threshold_pct
                ),
            });
        }

        let (lo, hi) = MIN_ROWS_RANGE;
        if !(lo..=hi).contains(&analysis.min_rows) {
            return Err(Error::ConfigValidation {
                message: format!("min_rows ({}) must be between {lo} and {hi}", analysis.min_rows),
            });
        }

        if analysis.target_version.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "target_version must not be empty".to_string(),
            });
        }

        if self.evidence.organization.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "organization must not be empty".to_string(),
            });
        }

        if self.evidence.excerpt_rows == 0 {
            return Err(Error::ConfigValidation {
                message: "excerpt_rows must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the evidence output directory, resolving defaults if not set.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.evidence
            .output_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(EVIDENCE_DIR_NAME))
    }

    /// Get the dataset path, if one is configured.
    #[must_use]
    pub fn dataset_path(&self) -> Option<&Path> {
        self.dataset.path.as_deref()
    }
}
