//! Database CLI commands
//!
//! `init` writes the workspace config and creates the `users` table;
//! `users` lists the stored rows.

use std::path::PathBuf;

use super::{load_config, runtime};
use crate::cli::error::CliError;
use crate::database::config::{CONFIG_FILENAME, sample_config};
use crate::database::{DatabaseBackendType, OutputFormat, format_users, open_store};

/// Init command arguments
#[derive(Debug, Clone)]
pub struct DbInitArgs {
    /// Workspace path
    pub workspace: PathBuf,
    /// Database backend override
    pub backend: Option<String>,
    /// PostgreSQL connection string (required for postgres backend)
    pub connection_string: Option<String>,
}

/// Users command arguments
#[derive(Debug, Clone)]
pub struct UsersArgs {
    /// Workspace path
    pub workspace: PathBuf,
    /// Output format
    pub format: String,
}

/// Write the workspace config and create the `users` table
pub fn handle_db_init(args: &DbInitArgs) -> Result<(), CliError> {
    let mut config = load_config(&args.workspace)?;

    if let Some(backend) = &args.backend {
        config.database.backend = backend
            .parse::<DatabaseBackendType>()
            .map_err(CliError::InvalidArgument)?;
    }
    if let Some(conn) = &args.connection_string {
        config.postgres.connection_string = Some(conn.clone());
    }
    if config.database.backend == DatabaseBackendType::Postgres
        && config.get_postgres_connection_string().is_none()
    {
        return Err(CliError::InvalidArgument(
            "--connection-string is required for the postgres backend".to_string(),
        ));
    }

    let config_path = args.workspace.join(CONFIG_FILENAME);
    if !config_path.exists() {
        config.save(&args.workspace)?;
        println!("Wrote {}", config_path.display());
    }

    let rt = runtime()?;
    rt.block_on(async {
        let store = open_store(&config, &args.workspace)?;
        store.initialize().await?;
        println!(
            "Initialized users table ({} backend)",
            store.backend_type()
        );
        Ok(())
    })
}

/// Print every stored user
pub fn handle_users(args: &UsersArgs) -> Result<(), CliError> {
    let config = load_config(&args.workspace)?;

    let output_format: OutputFormat = args
        .format
        .parse()
        .map_err(|e: String| CliError::InvalidArgument(e))?;

    let rt = runtime()?;
    rt.block_on(async {
        let store = open_store(&config, &args.workspace)?;
        let users = store.fetch_users().await?;
        println!("{}", format_users(&users, output_format));
        Ok(())
    })
}

/// Print a commented sample `user-ingest.toml`
pub fn handle_sample_config() -> Result<(), CliError> {
    print!("{}", sample_config());
    Ok(())
}
