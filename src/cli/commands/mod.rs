//! CLI command implementations

pub mod db;
pub mod ingest;
pub mod serve;

use std::path::Path;

use crate::cli::error::CliError;
use crate::database::AppConfig;

fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::IoError(format!("Failed to create runtime: {}", e)))
}

fn load_config(workspace: &Path) -> Result<AppConfig, CliError> {
    if !workspace.is_dir() {
        return Err(CliError::FileNotFound(workspace.to_path_buf()));
    }
    Ok(AppConfig::load(workspace)?)
}
