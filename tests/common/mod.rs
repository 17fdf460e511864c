//! Shared test fixtures

#![allow(dead_code)]

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use user_ingest::models::{StoredUser, UserRecord};
use user_ingest::{DatabaseError, DatabaseResult, UserSession, UserStore};

/// Write `content` to a temporary CSV file
pub fn csv_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[derive(Default)]
struct Counters {
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    /// Sessions dropped while a transaction was still open
    abandoned: AtomicUsize,
}

#[derive(Default)]
struct Table {
    rows: Vec<StoredUser>,
    next_id: i64,
}

/// In-memory `users` table with transactional sessions
///
/// Inserts are staged until commit. `fail_insert_at` makes the n-th insert
/// (0-based) of every session fail; `insert_delay` slows every insert down.
#[derive(Default)]
pub struct MemoryStore {
    table: Arc<Mutex<Table>>,
    fail_insert_at: Option<usize>,
    insert_delay: Option<Duration>,
    counters: Arc<Counters>,
    open_sessions: Arc<AtomicUsize>,
    max_open_sessions: Arc<AtomicUsize>,
    sessions_opened: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_insert_at: Some(index),
            ..Self::default()
        }
    }

    pub fn slow(insert_delay: Duration) -> Self {
        Self {
            insert_delay: Some(insert_delay),
            ..Self::default()
        }
    }

    pub fn commits(&self) -> usize {
        self.counters.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.counters.rollbacks.load(Ordering::SeqCst)
    }

    pub fn abandoned_transactions(&self) -> usize {
        self.counters.abandoned.load(Ordering::SeqCst)
    }

    /// Seed committed rows, as if left by an earlier run
    pub fn seed(&self, users: &[(&str, i32)]) {
        let mut table = self.table.lock().unwrap();
        for (name, age) in users {
            table.next_id += 1;
            let id = table.next_id;
            table.rows.push(StoredUser {
                id,
                name: name.to_string(),
                age: *age,
                address: Some(serde_json::json!({})),
                additional_info: Some(serde_json::json!({})),
            });
        }
    }

    pub fn rows(&self) -> Vec<StoredUser> {
        self.table.lock().unwrap().rows.clone()
    }

    /// Sessions currently checked out
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    /// Highest number of sessions ever checked out at once
    pub fn max_open_sessions(&self) -> usize {
        self.max_open_sessions.load(Ordering::SeqCst)
    }

    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn initialize(&self) -> DatabaseResult<()> {
        Ok(())
    }

    async fn connect(&self) -> DatabaseResult<Box<dyn UserSession>> {
        let open = self.open_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open_sessions.fetch_max(open, Ordering::SeqCst);
        self.sessions_opened.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemorySession {
            table: Arc::clone(&self.table),
            staged: None,
            fail_insert_at: self.fail_insert_at,
            insert_delay: self.insert_delay,
            counters: Arc::clone(&self.counters),
            inserted: 0,
            open_sessions: Arc::clone(&self.open_sessions),
        }))
    }

    async fn fetch_users(&self) -> DatabaseResult<Vec<StoredUser>> {
        Ok(self.rows())
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(true)
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

struct MemorySession {
    table: Arc<Mutex<Table>>,
    staged: Option<Vec<UserRecord>>,
    fail_insert_at: Option<usize>,
    insert_delay: Option<Duration>,
    counters: Arc<Counters>,
    inserted: usize,
    open_sessions: Arc<AtomicUsize>,
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        if self.staged.is_some() {
            self.counters.abandoned.fetch_add(1, Ordering::SeqCst);
        }
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserSession for MemorySession {
    async fn truncate_users(&mut self) -> DatabaseResult<()> {
        let mut table = self.table.lock().unwrap();
        table.rows.clear();
        table.next_id = 0;
        Ok(())
    }

    async fn begin(&mut self) -> DatabaseResult<()> {
        self.staged = Some(Vec::new());
        Ok(())
    }

    async fn insert_user(&mut self, user: &UserRecord) -> DatabaseResult<()> {
        // Give a concurrent run the chance to interleave
        match self.insert_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }

        if self.fail_insert_at == Some(self.inserted) {
            return Err(DatabaseError::QueryFailed(format!(
                "constraint violation on {}",
                user.name
            )));
        }
        let staged = self
            .staged
            .as_mut()
            .ok_or_else(|| DatabaseError::TransactionFailed("no open transaction".to_string()))?;
        staged.push(user.clone());
        self.inserted += 1;
        Ok(())
    }

    async fn commit(&mut self) -> DatabaseResult<()> {
        let staged = self
            .staged
            .take()
            .ok_or_else(|| DatabaseError::TransactionFailed("no open transaction".to_string()))?;

        let mut table = self.table.lock().unwrap();
        for user in staged {
            table.next_id += 1;
            let id = table.next_id;
            table.rows.push(StoredUser {
                id,
                name: user.name.clone(),
                age: user.age,
                address: Some(serde_json::to_value(&user.address).unwrap()),
                additional_info: Some(serde_json::to_value(&user.additional_info).unwrap()),
            });
        }
        self.counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&mut self) -> DatabaseResult<()> {
        self.staged = None;
        self.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_ages(&mut self) -> DatabaseResult<Vec<i32>> {
        Ok(self.table.lock().unwrap().rows.iter().map(|u| u.age).collect())
    }
}
