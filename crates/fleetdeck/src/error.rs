//! Error types for fleetdeck.
//!
//! This module defines all error types used throughout the fleetdeck crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fleetdeck operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Dataset Errors ===
    /// Failed to open the dataset file.
    #[error("failed to open dataset at {path}: {source}")]
    DatasetOpen {
        /// Path to the dataset file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A dataset row could not be parsed.
    #[error("invalid dataset row at line {line}: {message}")]
    DatasetParse {
        /// Line number in the source (1-based, header is line 1).
        line: u64,
        /// Description of what went wrong.
        message: String,
    },

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === Bundle Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The ZIP container could not be written or read.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The PDF report could not be rendered.
    #[error("report rendering failed: {0}")]
    Report(String),

    /// Too few rows were selected to package.
    #[error("selection has {actual} rows, at least {required} required to package")]
    InsufficientRows {
        /// Configured minimum.
        required: usize,
        /// Rows actually selected.
        actual: usize,
    },

    /// A string is not a well-formed evidence identifier.
    #[error("invalid evidence id: {0}")]
    InvalidEvidenceId(String),

    /// An archive does not have the expected evidence layout.
    #[error("unexpected archive layout: {message}")]
    ArchiveLayout {
        /// Description of the mismatch.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for fleetdeck operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new report rendering error.
    #[must_use]
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report(message.into())
    }

    /// Create a dataset parse error for the given line.
    #[must_use]
    pub fn dataset_parse(line: u64, message: impl Into<String>) -> Self {
        Self::DatasetParse {
            line,
            message: message.into(),
        }
    }

    /// Create an archive layout error.
    #[must_use]
    pub fn archive_layout(message: impl Into<String>) -> Self {
        Self::ArchiveLayout {
            message: message.into(),
        }
    }

    /// Check if this error is the minimum-row packaging gate.
    #[must_use]
    pub fn is_insufficient_rows(&self) -> bool {
        matches!(self, Self::InsufficientRows { .. })
    }

    /// Check if this error came from reading the dataset.
    #[must_use]
    pub fn is_dataset_error(&self) -> bool {
        matches!(
            self,
            Self::DatasetOpen { .. } | Self::DatasetParse { .. } | Self::Csv(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::report("font missing");
        assert_eq!(err.to_string(), "report rendering failed: font missing");
    }

    #[test]
    fn test_insufficient_rows_display() {
        let err = Error::InsufficientRows {
            required: 2,
            actual: 1,
        };
        assert!(err.is_insufficient_rows());
        assert_eq!(
            err.to_string(),
            "selection has 1 rows, at least 2 required to package"
        );
        assert!(!Error::report("x").is_insufficient_rows());
    }

    #[test]
    fn test_dataset_parse_error() {
        let err = Error::dataset_parse(7, "bad date");
        assert!(err.is_dataset_error());
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("bad date"));
    }

    #[test]
    fn test_dataset_open_error_display() {
        let err = Error::DatasetOpen {
            path: PathBuf::from("/nonexistent/fleet.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.is_dataset_error());
        assert!(err.to_string().contains("/nonexistent/fleet.csv"));
    }

    #[test]
    fn test_archive_layout_error() {
        let err = Error::archive_layout("missing pdf entry");
        assert!(err.to_string().contains("missing pdf entry"));
    }

    #[test]
    fn test_invalid_evidence_id_display() {
        let err = Error::InvalidEvidenceId("EV-xyz".to_string());
        assert_eq!(err.to_string(), "invalid evidence id: EV-xyz");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_zip_error() {
        let err: Error = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "cutoff_days out of range".to_string(),
        };
        assert!(err.to_string().contains("cutoff_days"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
