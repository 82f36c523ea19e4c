//! Ingestion error types

use thiserror::Error;

/// Errors that abort loading an event source.
///
/// Individual malformed rows are never reported here; they are dropped and
/// counted by [`crate::ingest::ingest`].
#[derive(Error, Debug)]
pub enum IngestError {
    /// Failed to open or read the source
    #[error("failed to read event source: {0}")]
    Io(#[from] std::io::Error),

    /// The source is not readable as CSV
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The header row lacks a required column
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
}

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;
