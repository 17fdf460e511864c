//! HTTP server CLI command

use std::path::PathBuf;
use std::sync::Arc;

use super::{load_config, runtime};
use crate::cli::error::CliError;
use crate::database::config::mask_connection_string;
use crate::database::{DatabaseBackendType, open_store};
use crate::ingest::IngestEngine;
use crate::server::{self, AppState};

/// Serve command arguments
#[derive(Debug, Clone)]
pub struct ServeArgs {
    /// Workspace path
    pub workspace: PathBuf,
    /// Interface override
    pub host: Option<String>,
    /// Port override
    pub port: Option<u16>,
}

/// Create the `users` table and serve the HTTP API until interrupted
pub fn handle_serve(args: &ServeArgs) -> Result<(), CliError> {
    let mut config = load_config(&args.workspace)?;
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    match config.database.backend {
        DatabaseBackendType::DuckDB => tracing::info!(
            "Using DuckDB at {}",
            config.get_duckdb_path(&args.workspace).display()
        ),
        DatabaseBackendType::Postgres => tracing::info!(
            "Using PostgreSQL at {}",
            config
                .get_postgres_connection_string()
                .map(mask_connection_string)
                .unwrap_or_default()
        ),
    }

    let csv_path = config.get_csv_path(&args.workspace);
    match &csv_path {
        Some(path) => tracing::info!("CSV file: {}", path.display()),
        None => tracing::warn!("csv_file_path is not configured; POST /api/csv/process will fail"),
    }

    let rt = runtime()?;
    rt.block_on(async {
        let store = open_store(&config, &args.workspace)?;
        let engine = IngestEngine::new(store);
        engine.initialize().await?;
        tracing::info!("Database initialized");

        let state = Arc::new(AppState::new(engine, csv_path));
        server::serve(&config.bind_address(), state)
            .await
            .map_err(|e| CliError::IoError(format!("Server error: {}", e)))
    })
}
