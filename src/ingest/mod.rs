//! CSV ingestion pipeline
//!
//! Parses a CSV file of users, maps each row to a [`UserRecord`], replaces the
//! contents of the `users` table in one transaction and reports the age
//! distribution of what was stored.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use user_ingest::database::DuckDBStore;
//! use user_ingest::ingest::IngestEngine;
//!
//! let store = Arc::new(DuckDBStore::in_memory()?);
//! let engine = IngestEngine::new(store);
//! engine.initialize().await?;
//!
//! let summary = engine.ingest("users.csv".as_ref()).await?;
//! if let Some(distribution) = &summary.distribution {
//!     print!("{}", distribution);
//! }
//! ```

mod error;
pub mod loader;
pub mod mapper;
pub mod parser;
pub mod report;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::database::{DatabaseResult, UserSession, UserStore};
use crate::models::UserRecord;

pub use error::{IngestError, MapError};
pub use loader::{LoadOutcome, LoadStatus, load_users};
pub use mapper::map_record;
pub use parser::{RawRow, parse_csv_file};
pub use report::{AgeBucket, AgeDistribution};

/// Result of one ingestion run
#[derive(Debug)]
pub struct IngestSummary {
    /// Identifier carried on the run's tracing span
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Number of data rows parsed from the file
    pub rows_parsed: usize,
    pub outcome: LoadOutcome,
    /// Present only when the load committed
    pub distribution: Option<AgeDistribution>,
    pub duration_ms: u64,
}

impl IngestSummary {
    /// Serializable view of the summary
    pub fn report(&self) -> IngestReport {
        IngestReport {
            run_id: self.run_id,
            started_at: self.started_at,
            rows: self.rows_parsed,
            outcome: self.outcome.status(),
            cause: match &self.outcome {
                LoadOutcome::RolledBack(cause) => Some(cause.to_string()),
                LoadOutcome::Committed { .. } => None,
            },
            distribution: self.distribution.as_ref().map(|d| {
                d.percentages()
                    .into_iter()
                    .map(|(bucket, percent)| BucketShare {
                        bucket,
                        count: d.count(bucket),
                        percent,
                    })
                    .collect()
            }),
            duration_ms: self.duration_ms,
        }
    }
}

/// JSON shape of an ingestion summary
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub rows: usize,
    pub outcome: LoadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Vec<BucketShare>>,
    pub duration_ms: u64,
}

/// One bucket of a reported distribution
#[derive(Debug, Clone, Serialize)]
pub struct BucketShare {
    pub bucket: AgeBucket,
    pub count: usize,
    pub percent: f64,
}

/// Read every row and map it, failing on the first bad record
///
/// Nothing touches storage here, so a bad file leaves the table as it was.
pub fn read_records(path: &Path) -> Result<Vec<UserRecord>, IngestError> {
    parse_csv_file(path)?
        .iter()
        .enumerate()
        .map(|(i, row)| {
            map_record(row).map_err(|source| IngestError::InvalidRecord { row: i + 1, source })
        })
        .collect()
}

/// Read back stored ages on `session` and bucket them
pub async fn age_distribution(session: &mut dyn UserSession) -> DatabaseResult<AgeDistribution> {
    let ages = session.fetch_ages().await?;
    Ok(AgeDistribution::from_ages(ages))
}

/// Runs ingestion against an injected store
///
/// Runs are serialized: a second `ingest` call waits until the first has
/// released its session.
pub struct IngestEngine {
    store: Arc<dyn UserStore>,
    run_lock: Mutex<()>,
    print_report: bool,
}

impl IngestEngine {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            run_lock: Mutex::new(()),
            print_report: true,
        }
    }

    /// Whether to print the distribution to stdout after a committed load
    pub fn with_print_report(mut self, print_report: bool) -> Self {
        self.print_report = print_report;
        self
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// Create the `users` table if it doesn't exist
    pub async fn initialize(&self) -> DatabaseResult<()> {
        self.store.initialize().await
    }

    /// Ingest the CSV file at `path`, replacing the table contents
    ///
    /// Parse and mapping errors abort before storage is touched. A load that
    /// fails inside the transaction is not an error: it comes back as
    /// [`LoadOutcome::RolledBack`] and the distribution is skipped.
    pub async fn ingest(&self, path: &Path) -> Result<IngestSummary, IngestError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("ingest", %run_id, path = %path.display());

        self.run(run_id, path).instrument(span).await
    }

    async fn run(&self, run_id: Uuid, path: &Path) -> Result<IngestSummary, IngestError> {
        let _guard = self.run_lock.lock().await;
        let started_at = Utc::now();
        let start = Instant::now();
        tracing::info!("Starting ingestion");

        let records = read_records(path)?;
        tracing::info!("Mapped {} records", records.len());

        let mut session = self.store.connect().await?;
        let outcome = load_users(session.as_mut(), &records).await?;

        let distribution = if outcome.is_committed() {
            let distribution = age_distribution(session.as_mut()).await?;
            self.emit(&distribution);
            Some(distribution)
        } else {
            None
        };
        drop(session);

        Ok(IngestSummary {
            run_id,
            started_at,
            rows_parsed: records.len(),
            outcome,
            distribution,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn emit(&self, distribution: &AgeDistribution) {
        if distribution.is_empty() {
            tracing::warn!("No rows to summarize");
        }
        for line in distribution.lines() {
            tracing::info!("{}", line);
        }
        if self.print_report
            && let Err(e) = report::write_report(&mut std::io::stdout().lock(), distribution)
        {
            tracing::warn!("Failed to print report: {}", e);
        }
    }
}
