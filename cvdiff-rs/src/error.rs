//! Error types for cvdiff.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for cvdiff operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while comparing snapshots and maintaining reports.
#[derive(Error, Debug)]
pub enum Error {
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// A required folder (backup root, date folder or category folder) is absent.
    #[error("Folder not found: {}", path.display())]
    MissingFolder { path: PathBuf },

    /// Fewer than two dated snapshot folders exist.
    #[error("Need at least 2 date folders to compare, found {found}")]
    InsufficientVersions { found: usize },

    /// A report date matched none of the accepted formats.
    #[error("Unparseable date: {0:?}")]
    UnparseableDate(String),

    /// A report cell held an unknown classification.
    #[error("Invalid diff result: {0:?}")]
    InvalidDiffResult(String),

    /// A prior history report could not be read.
    #[error("Cannot load report {}: {reason}", path.display())]
    ReportLoad { path: PathBuf, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// CSV error while reading or writing a report.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
