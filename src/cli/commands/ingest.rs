//! Ingest CLI command

use std::path::PathBuf;

use super::{load_config, runtime};
use crate::cli::error::CliError;
use crate::database::open_store;
use crate::ingest::{IngestEngine, LoadOutcome};

/// Ingest command arguments
#[derive(Debug, Clone)]
pub struct IngestArgs {
    /// Workspace path
    pub workspace: PathBuf,
    /// CSV file; falls back to the configured `csv_file_path`
    pub input: Option<PathBuf>,
    /// Print the run summary as JSON instead of text
    pub json: bool,
}

/// Ingest a CSV file into the `users` table
///
/// A rolled-back load is reported as an error so the process exits non-zero.
pub fn handle_ingest(args: &IngestArgs) -> Result<(), CliError> {
    let config = load_config(&args.workspace)?;

    let input = match &args.input {
        Some(path) => path.clone(),
        None => config.get_csv_path(&args.workspace).ok_or_else(|| {
            CliError::InvalidArgument(
                "No input file given and csv_file_path is not configured".to_string(),
            )
        })?,
    };

    let rt = runtime()?;
    rt.block_on(async {
        let store = open_store(&config, &args.workspace)?;
        let engine = IngestEngine::new(store).with_print_report(!args.json);
        engine.initialize().await?;

        let summary = engine.ingest(&input).await?;

        if args.json {
            let json = serde_json::to_string_pretty(&summary.report())
                .map_err(|e| CliError::IoError(format!("Failed to serialize summary: {}", e)))?;
            println!("{}", json);
        }

        match summary.outcome {
            LoadOutcome::Committed { rows } => {
                eprintln!("Loaded {} users from {}", rows, input.display());
                Ok(())
            }
            LoadOutcome::RolledBack(cause) => Err(CliError::RolledBack(cause.to_string())),
        }
    })
}

#[cfg(all(test, feature = "duckdb-backend"))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_ingest_file() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("users.csv");
        fs::write(&csv, "name.firstName,name.lastName,age\nJohn,Doe,25\n").unwrap();

        handle_ingest(&IngestArgs {
            workspace: dir.path().to_path_buf(),
            input: Some(csv),
            json: true,
        })
        .unwrap();
    }

    #[test]
    fn test_no_input() {
        let dir = tempdir().unwrap();
        let result = handle_ingest(&IngestArgs {
            workspace: dir.path().to_path_buf(),
            input: None,
            json: false,
        });
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_invalid_age_fails() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("users.csv");
        fs::write(&csv, "name.firstName,age\nAnn,old\n").unwrap();

        let result = handle_ingest(&IngestArgs {
            workspace: dir.path().to_path_buf(),
            input: Some(csv),
            json: false,
        });
        assert!(matches!(result, Err(CliError::IngestError(_))));
    }
}
