//! Error types for circuit-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in circuit-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sheet does not follow either supported crosstable layout
    #[error("unrecognized crosstable layout in '{path}': {message}")]
    StructuralFormat { path: PathBuf, message: String },

    /// Spreadsheet workbook could not be opened or read
    #[error("failed to read workbook '{path}': {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// Workbook contains no worksheet
    #[error("workbook '{0}' has no worksheets")]
    EmptyWorkbook(PathBuf),

    /// File extension is not a supported spreadsheet format
    #[error("unsupported sheet format '{0}' (expected xlsx, xlsm, xls, ods or csv)")]
    UnsupportedFormat(PathBuf),

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Event record could not be decoded
    #[error("invalid event record '{path}': {source}")]
    EventRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid text pattern
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Event type string is not one of the known types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event type '{0}' (expected group_a, group_b, group_c or rapid)")]
pub struct UnknownEventType(pub String);
