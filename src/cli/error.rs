//! CLI-specific error types

use std::path::PathBuf;
use thiserror::Error;

use crate::database::DatabaseError;
use crate::ingest::IngestError;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Ingestion failed: {0}")]
    IngestError(#[from] IngestError),

    #[error("Load rolled back: {0}")]
    RolledBack(String),
}
