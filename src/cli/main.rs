//! CLI binary entry point for user-ingest

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};
use user_ingest::cli::commands::db::{
    DbInitArgs, UsersArgs, handle_db_init, handle_sample_config, handle_users,
};
use user_ingest::cli::commands::ingest::{IngestArgs, handle_ingest};
use user_ingest::cli::commands::serve::{ServeArgs, handle_serve};

#[derive(Parser)]
#[command(name = "user-ingest")]
#[command(about = "Load user CSV files into a relational table and serve them over HTTP")]
#[command(version)]
struct Cli {
    /// Workspace path holding user-ingest.toml (default: current directory)
    #[arg(short, long, global = true, default_value = ".")]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Interface to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ingest a CSV file, replacing the users table
    Ingest {
        /// CSV file (default: csv_file_path from config or CSV_FILE_PATH)
        input: Option<PathBuf>,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write config and create the users table
    Init {
        /// Database backend (duckdb, postgres)
        #[arg(short, long)]
        backend: Option<String>,
        /// PostgreSQL connection string (required for postgres backend)
        #[arg(long)]
        connection_string: Option<String>,
    },

    /// List stored users
    Users {
        /// Output format (table, json, csv)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print a sample user-ingest.toml
    SampleConfig,
}

fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let workspace = cli.workspace;

    match cli.command {
        Commands::Serve { host, port } => handle_serve(&ServeArgs {
            workspace,
            host,
            port,
        })?,
        Commands::Ingest { input, json } => handle_ingest(&IngestArgs {
            workspace,
            input,
            json,
        })?,
        Commands::Init {
            backend,
            connection_string,
        } => handle_db_init(&DbInitArgs {
            workspace,
            backend,
            connection_string,
        })?,
        Commands::Users { format } => handle_users(&UsersArgs { workspace, format })?,
        Commands::SampleConfig => handle_sample_config()?,
    }

    Ok(())
}
