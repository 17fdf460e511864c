//! Transactional bulk load of user records

use serde::Serialize;

use crate::database::{DatabaseError, DatabaseResult, UserSession};
use crate::models::UserRecord;

/// How the load transaction ended
#[derive(Debug)]
pub enum LoadOutcome {
    /// Every record was inserted and the transaction committed
    Committed { rows: usize },
    /// The transaction was rolled back; the table is left empty
    RolledBack(DatabaseError),
}

impl LoadOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, LoadOutcome::Committed { .. })
    }

    pub fn status(&self) -> LoadStatus {
        match self {
            LoadOutcome::Committed { .. } => LoadStatus::Committed,
            LoadOutcome::RolledBack(_) => LoadStatus::RolledBack,
        }
    }
}

/// Serializable form of [`LoadOutcome`] for responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Committed,
    RolledBack,
}

/// Replace the contents of the `users` table with `records`
///
/// The truncate runs before the transaction and is not undone by a rollback,
/// so a failed load leaves the table empty rather than holding the previous
/// run's rows. A truncate failure is returned as an error; anything that goes
/// wrong after it is rolled back and reported as [`LoadOutcome::RolledBack`].
pub async fn load_users(
    session: &mut dyn UserSession,
    records: &[UserRecord],
) -> DatabaseResult<LoadOutcome> {
    session.truncate_users().await?;

    match insert_all(session, records).await {
        Ok(()) => {
            tracing::info!("Inserted {} users", records.len());
            Ok(LoadOutcome::Committed {
                rows: records.len(),
            })
        }
        Err(cause) => {
            tracing::warn!("Load failed, rolling back: {}", cause);
            if let Err(e) = session.rollback().await {
                tracing::error!("Rollback failed: {}", e);
            }
            Ok(LoadOutcome::RolledBack(cause))
        }
    }
}

async fn insert_all(session: &mut dyn UserSession, records: &[UserRecord]) -> DatabaseResult<()> {
    session.begin().await?;
    for record in records {
        session.insert_user(record).await?;
    }
    session.commit().await
}
