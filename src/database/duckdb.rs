//! DuckDB database backend implementation
//!
//! Provides an embedded database backend for the `users` table. Each session
//! is a separate connection to the same database instance, so in-memory
//! databases are shared between the store and its sessions.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::schema::UserSchema;
use super::{DatabaseError, DatabaseResult, UserSession, UserStore};
use crate::models::{StoredUser, UserRecord};

/// DuckDB database backend
///
/// Supports both file-based persistence and in-memory mode.
pub struct DuckDBStore {
    /// Path to the database file (None for in-memory)
    db_path: Option<PathBuf>,
    /// DuckDB connection (wrapped in Mutex for thread safety)
    connection: Mutex<duckdb::Connection>,
}

impl DuckDBStore {
    /// Create a new DuckDB store with a file-based database
    pub fn new(db_path: impl AsRef<Path>) -> DatabaseResult<Self> {
        let path = db_path.as_ref().to_path_buf();
        let connection = duckdb::Connection::open(&path).map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to open DuckDB: {}", e))
        })?;

        Ok(Self {
            db_path: Some(path),
            connection: Mutex::new(connection),
        })
    }

    /// Create an in-memory DuckDB store
    ///
    /// Useful for testing or throwaway runs where persistence is not needed.
    pub fn in_memory() -> DatabaseResult<Self> {
        let connection = duckdb::Connection::open_in_memory().map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to create in-memory DuckDB: {}", e))
        })?;

        Ok(Self {
            db_path: None,
            connection: Mutex::new(connection),
        })
    }

    /// Get the database file path (None for in-memory)
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Check if this is an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.db_path.is_none()
    }

    fn lock(&self) -> DatabaseResult<MutexGuard<'_, duckdb::Connection>> {
        self.connection
            .lock()
            .map_err(|e| DatabaseError::ConnectionFailed(format!("Lock error: {}", e)))
    }
}

#[async_trait]
impl UserStore for DuckDBStore {
    async fn initialize(&self) -> DatabaseResult<()> {
        let conn = self.lock()?;

        conn.execute_batch(UserSchema::duckdb_create_sql())
            .map_err(|e| DatabaseError::MigrationFailed(format!("Failed to create tables: {}", e)))
    }

    async fn connect(&self) -> DatabaseResult<Box<dyn UserSession>> {
        let conn = self.lock()?;

        let session_conn = conn.try_clone().map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to open session: {}", e))
        })?;

        Ok(Box::new(DuckDBSession {
            conn: session_conn,
        }))
    }

    async fn fetch_users(&self) -> DatabaseResult<Vec<StoredUser>> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, name, age, address, additional_info FROM users ORDER BY id",
            )
            .map_err(|e| DatabaseError::QueryFailed(format!("Prepare failed: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i32>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })
            .map_err(|e| DatabaseError::QueryFailed(format!("Query failed: {}", e)))?;

        let mut users = Vec::new();
        for row in rows {
            let (id, name, age, address, additional_info) =
                row.map_err(|e| DatabaseError::QueryFailed(format!("Row fetch error: {}", e)))?;

            let user = StoredUser::from_columns(
                id,
                name,
                age,
                address.as_deref(),
                additional_info.as_deref(),
            )
            .map_err(|e| DatabaseError::SerializationError(format!("Invalid JSON column: {}", e)))?;
            users.push(user);
        }

        Ok(users)
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        let conn = self.lock()?;

        let healthy: i32 = conn
            .query_row("SELECT 1", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(format!("Health check failed: {}", e)))?;

        Ok(healthy == 1)
    }

    fn backend_type(&self) -> &'static str {
        "duckdb"
    }
}

/// A dedicated DuckDB connection for one ingestion run
pub struct DuckDBSession {
    conn: duckdb::Connection,
}

impl DuckDBSession {
    fn execute_control(&self, sql: &str) -> DatabaseResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DatabaseError::TransactionFailed(format!("{} failed: {}", sql, e)))
    }
}

#[async_trait]
impl UserSession for DuckDBSession {
    async fn truncate_users(&mut self) -> DatabaseResult<()> {
        self.conn
            .execute_batch(UserSchema::duckdb_truncate_sql())
            .map_err(|e| DatabaseError::QueryFailed(format!("Failed to truncate users: {}", e)))
    }

    async fn begin(&mut self) -> DatabaseResult<()> {
        self.execute_control("BEGIN TRANSACTION")
    }

    async fn insert_user(&mut self, user: &UserRecord) -> DatabaseResult<()> {
        let address = user
            .address_json()
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
        let additional_info = user
            .additional_info_json()
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        self.conn
            .execute(
                UserSchema::duckdb_insert_sql(),
                duckdb::params![&user.name, user.age, address, additional_info],
            )
            .map_err(|e| {
                DatabaseError::QueryFailed(format!("Failed to insert user {}: {}", user.name, e))
            })?;

        Ok(())
    }

    async fn commit(&mut self) -> DatabaseResult<()> {
        self.execute_control("COMMIT")
    }

    async fn rollback(&mut self) -> DatabaseResult<()> {
        self.execute_control("ROLLBACK")
    }

    async fn fetch_ages(&mut self) -> DatabaseResult<Vec<i32>> {
        let mut stmt = self
            .conn
            .prepare("SELECT age FROM users")
            .map_err(|e| DatabaseError::QueryFailed(format!("Prepare failed: {}", e)))?;

        let ages = stmt
            .query_map([], |row| row.get::<_, i32>(0))
            .map_err(|e| DatabaseError::QueryFailed(format!("Query failed: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::QueryFailed(format!("Row fetch error: {}", e)))?;

        Ok(ages)
    }
}
