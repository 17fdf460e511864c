//! User ingestion service
//!
//! Loads user records from simple comma-separated files into a relational
//! `users` table and reports their age distribution:
//! - CSV parsing and record mapping (`ingest::parser`, `ingest::mapper`)
//! - Transactional bulk load with rollback (`ingest::loader`)
//! - Age distribution reporting (`ingest::report`)
//! - Storage backends: DuckDB and PostgreSQL (`database`)
//! - HTTP API (`server`)

pub mod database;
pub mod ingest;
pub mod models;
pub mod server;

#[cfg(feature = "cli")]
pub mod cli;

pub use database::{AppConfig, DatabaseError, DatabaseResult, UserSession, UserStore, open_store};
pub use ingest::{
    AgeBucket, AgeDistribution, IngestEngine, IngestError, IngestSummary, LoadOutcome, MapError,
};
pub use models::{FieldMap, StoredUser, UserRecord};
