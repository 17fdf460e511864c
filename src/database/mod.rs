//! Database backend abstraction for the `users` table
//!
//! This module provides the storage seam used by the ingestion pipeline:
//! - DuckDB: Embedded database for the CLI, tests and single-node deployments
//! - PostgreSQL: Pooled connections for server deployments
//!
//! A [`UserStore`] is the long-lived handle (pool or shared database). A run
//! acquires one [`UserSession`] from it, which owns a single connection for
//! the truncate, the load transaction and the report query. Dropping the
//! session releases the connection.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::models::{StoredUser, UserRecord};

#[cfg(feature = "duckdb-backend")]
pub mod duckdb;

#[cfg(feature = "postgres-backend")]
pub mod postgres;

pub mod config;
pub mod schema;

#[cfg(feature = "duckdb-backend")]
pub use self::duckdb::DuckDBStore;

#[cfg(feature = "postgres-backend")]
pub use self::postgres::PostgresStore;

pub use config::{AppConfig, DatabaseBackendType};
pub use schema::UserSchema;

/// Error type for database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Failed to connect to database or acquire a connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction control (begin/commit/rollback) failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Table creation failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Long-lived storage handle for the `users` table
///
/// Implementations are shared across requests behind an `Arc`, so they must be
/// `Send + Sync`; the ingestion engine and the HTTP layer both receive one
/// explicitly rather than reaching for a global pool.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create the `users` table if it doesn't exist
    async fn initialize(&self) -> DatabaseResult<()>;

    /// Acquire a dedicated session for one ingestion run
    async fn connect(&self) -> DatabaseResult<Box<dyn UserSession>>;

    /// Read every stored user ordered by id
    async fn fetch_users(&self) -> DatabaseResult<Vec<StoredUser>>;

    /// Check if database is healthy and accessible
    async fn health_check(&self) -> DatabaseResult<bool>;

    /// Get the database backend type name ("duckdb" or "postgres")
    fn backend_type(&self) -> &'static str;
}

/// One connection, held for the length of an ingestion run
#[async_trait]
pub trait UserSession: Send {
    /// Remove every row and restart the identity counter at 1
    ///
    /// Runs outside any transaction.
    async fn truncate_users(&mut self) -> DatabaseResult<()>;

    /// Open a transaction
    async fn begin(&mut self) -> DatabaseResult<()>;

    /// Insert one record, serializing `address` and `additional_info` to JSON
    async fn insert_user(&mut self, user: &UserRecord) -> DatabaseResult<()>;

    /// Commit the open transaction
    async fn commit(&mut self) -> DatabaseResult<()>;

    /// Roll back the open transaction
    async fn rollback(&mut self) -> DatabaseResult<()>;

    /// Read the age of every stored user
    async fn fetch_ages(&mut self) -> DatabaseResult<Vec<i32>>;
}

/// Open the store selected by `config`
///
/// Relative DuckDB paths are resolved against `base_path`.
pub fn open_store(config: &AppConfig, base_path: &Path) -> DatabaseResult<Arc<dyn UserStore>> {
    match config.database.backend {
        DatabaseBackendType::DuckDB => {
            #[cfg(feature = "duckdb-backend")]
            {
                let db_path = config.get_duckdb_path(base_path);
                tracing::info!("Opening DuckDB database at {}", db_path.display());
                Ok(Arc::new(DuckDBStore::new(&db_path)?))
            }
            #[cfg(not(feature = "duckdb-backend"))]
            {
                let _ = base_path;
                Err(DatabaseError::ConfigError(
                    "DuckDB backend not enabled. Build with --features duckdb-backend".to_string(),
                ))
            }
        }
        DatabaseBackendType::Postgres => {
            #[cfg(feature = "postgres-backend")]
            {
                let conn_str = config.get_postgres_connection_string().ok_or_else(|| {
                    DatabaseError::ConfigError(
                        "PostgreSQL connection string not configured".to_string(),
                    )
                })?;
                tracing::info!(
                    "Connecting to PostgreSQL at {}",
                    config::mask_connection_string(conn_str)
                );
                Ok(Arc::new(PostgresStore::new(
                    conn_str,
                    config.postgres.pool_size,
                )?))
            }
            #[cfg(not(feature = "postgres-backend"))]
            {
                let _ = base_path;
                Err(DatabaseError::ConfigError(
                    "PostgreSQL backend not enabled. Build with --features postgres-backend"
                        .to_string(),
                ))
            }
        }
    }
}

/// Output format for listing users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

const USER_COLUMNS: [&str; 5] = ["id", "name", "age", "address", "additional_info"];

/// Format stored users for display
pub fn format_users(users: &[StoredUser], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(users).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Csv => format_as_csv(users),
        OutputFormat::Table => format_as_table(users),
    }
}

fn json_cell(value: &Option<serde_json::Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

fn user_cells(user: &StoredUser) -> [String; 5] {
    [
        user.id.to_string(),
        user.name.clone(),
        user.age.to_string(),
        json_cell(&user.address),
        json_cell(&user.additional_info),
    ]
}

fn format_as_csv(users: &[StoredUser]) -> String {
    let mut output = String::new();

    output.push_str(&USER_COLUMNS.join(","));
    output.push('\n');

    for user in users {
        let values: Vec<String> = user_cells(user)
            .into_iter()
            .map(|s| {
                // Quote anything the reader would split on
                if s.contains(',') || s.contains('"') || s.contains('\n') {
                    format!("\"{}\"", s.replace('"', "\"\""))
                } else {
                    s
                }
            })
            .collect();
        output.push_str(&values.join(","));
        output.push('\n');
    }

    output
}

fn format_as_table(users: &[StoredUser]) -> String {
    if users.is_empty() {
        return "(0 rows)".to_string();
    }

    let rows: Vec<[String; 5]> = users.iter().map(user_cells).collect();

    let mut widths: Vec<usize> = USER_COLUMNS.iter().map(|c| c.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut output = String::new();

    let header: Vec<String> = USER_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:width$}", c, width = widths[i]))
        .collect();
    output.push_str(&header.join(" | "));
    output.push('\n');

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&separator.join("-+-"));
    output.push('\n');

    for row in &rows {
        let values: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{:width$}", s, width = widths[i]))
            .collect();
        output.push_str(&values.join(" | "));
        output.push('\n');
    }

    output.push_str(&format!("({} rows)", rows.len()));

    output
}
