//! HTTP surface over the ingestion engine
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/csv/process` | Ingest the configured CSV file |
//! | `GET` | `/api/users` | List stored users ordered by id |
//! | `GET` | `/health` | Storage health check |

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::ingest::{IngestEngine, IngestReport, LoadStatus};
use crate::models::StoredUser;

/// State shared across all handlers
pub struct AppState {
    pub engine: IngestEngine,
    /// File ingested by `POST /api/csv/process`
    pub csv_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(engine: IngestEngine, csv_path: Option<PathBuf>) -> Self {
        Self { engine, csv_path }
    }
}

pub type SharedState = Arc<AppState>;

/// Build the service router
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/csv/process", post(process_csv))
        .route("/api/users", get(list_users))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `address` and serve until the process exits
pub async fn serve(address: &str, state: SharedState) -> std::io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    tracing::info!("Process endpoint: POST /api/csv/process");
    tracing::info!("Users endpoint: GET /api/users");

    axum::serve(listener, router(state)).await
}

#[derive(Debug, Serialize)]
struct ProcessResponse {
    message: &'static str,
    #[serde(flatten)]
    report: IngestReport,
}

#[derive(Debug, Serialize)]
struct ProcessErrorResponse {
    error: &'static str,
    kind: &'static str,
    details: String,
}

#[derive(Debug, Serialize)]
struct UsersResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    users: Option<Vec<StoredUser>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

fn process_error(kind: &'static str, details: impl Into<String>) -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ProcessErrorResponse {
            error: "Failed to process CSV",
            kind,
            details: details.into(),
        }),
    )
}

/// `POST /api/csv/process`: run one ingestion of the configured file.
///
/// The run is spawned onto its own task, so a client that disconnects
/// mid-load still leaves the transaction committed or rolled back.
async fn process_csv(State(state): State<SharedState>) -> impl IntoResponse {
    let Some(path) = state.csv_path.clone() else {
        tracing::error!("CSV file path is not configured");
        return process_error("config", "CSV file path is not configured").into_response();
    };

    let run_state = Arc::clone(&state);
    let run = tokio::spawn(async move { run_state.engine.ingest(&path).await });

    let result = match run.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Ingest task failed: {}", e);
            return process_error("internal", e.to_string()).into_response();
        }
    };

    match result {
        Ok(summary) => {
            let report = summary.report();
            let message = match report.outcome {
                LoadStatus::Committed => "CSV processed successfully!",
                LoadStatus::RolledBack => "CSV load rolled back",
            };
            (StatusCode::OK, Json(ProcessResponse { message, report })).into_response()
        }
        Err(e) => {
            tracing::error!("Error processing CSV: {}", e);
            process_error(e.kind(), e.to_string()).into_response()
        }
    }
}

/// `GET /api/users`: every stored row, ordered by id.
async fn list_users(State(state): State<SharedState>) -> impl IntoResponse {
    match state.engine.store().fetch_users().await {
        Ok(users) => (
            StatusCode::OK,
            Json(UsersResponse {
                success: true,
                users: Some(users),
                message: None,
            }),
        ),
        Err(e) => {
            tracing::error!("Error fetching users: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UsersResponse {
                    success: false,
                    users: None,
                    message: Some("Failed to fetch users".to_string()),
                }),
            )
        }
    }
}

async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let store = state.engine.store();
    let status = match store.health_check().await {
        Ok(true) => StatusCode::OK,
        Ok(false) => StatusCode::SERVICE_UNAVAILABLE,
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    (
        status,
        Json(HealthResponse {
            status: if status == StatusCode::OK {
                "ok"
            } else {
                "unavailable"
            },
            backend: store.backend_type(),
        }),
    )
}
