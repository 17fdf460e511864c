//! Ingestion error types

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use crate::database::DatabaseError;

/// A row that could not be turned into a user record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("age {value:?} is not a base-10 integer: {source}")]
    InvalidAge {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Errors that abort an ingestion run
///
/// Load failures inside the transaction are not errors; they are reported
/// through [`LoadOutcome::RolledBack`](super::LoadOutcome::RolledBack).
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `row` is the 1-based data row, not counting the header line
    #[error("invalid record at row {row}: {source}")]
    InvalidRecord {
        row: usize,
        #[source]
        source: MapError,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl IngestError {
    /// Short machine-readable name for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Io { .. } => "io",
            IngestError::InvalidRecord { .. } => "invalid_record",
            IngestError::Database(DatabaseError::ConfigError(_)) => "config",
            IngestError::Database(_) => "database",
        }
    }
}
