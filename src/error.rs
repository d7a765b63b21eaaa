//! Error types for dataset parsing, alignment and charting

use thiserror::Error;

/// Main error type for dataset operations
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Unrecognized processed data format: leading header token '{token}'")]
    UnrecognizedFormat { token: String },

    #[error("Unrecognized experiment data in files: {}", .files.join(", "))]
    UnrecognizedExperimentData { files: Vec<String> },

    #[error("Per-sample data file '{file}' has {columns} value columns, expected 1")]
    MultiColumnSampleFile { file: String, columns: usize },

    #[error("Invalid value '{value}' in '{file}' at line {line}")]
    InvalidValue {
        file: String,
        line: usize,
        value: String,
    },

    #[error("Data column '{column}' matched {} sample records, expected exactly 1{}", .matches.len(), describe_matches(.matches))]
    Alignment { column: String, matches: Vec<String> },

    #[error("Factor '{key}' missing on sample '{sample}'")]
    MissingKey { key: String, sample: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Upstream {service} failed: {reason}")]
    Upstream { service: String, reason: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl DatasetError {
    /// Whether the error signals an expected absence (dataset, matrix, reporter)
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatasetError::NotFound { .. })
    }
}

fn describe_matches(matches: &[String]) -> String {
    if matches.is_empty() {
        String::new()
    } else {
        format!(" ({})", matches.join(", "))
    }
}

/// Result type alias for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;
