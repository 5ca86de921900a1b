//! dictionary-etl - concept-metadata ingest
//!
//! Reads a column-metadata extract and loads it into the dictionary store as
//! datasets, concept trees and leaf value metadata. Groups that cannot be
//! loaded are written to an error report; the run still completes.

use anyhow::{Context, Result};
use clap::Parser;
use dictionary_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use dictionary_etl::config::{default_input_path, default_report_path, MODULE_NAME};
use dictionary_etl::{IngestConfig, IngestPipeline, IngestRequest};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dictionary-etl")]
#[command(about = "Load column metadata into the data dictionary")]
#[command(version)]
struct Args {
    /// Root folder holding the store and default extract/report files
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Column-metadata extract [default: <root>/columnMeta.csv]
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Error report, must end in .csv [default: <root>/columnMetaErrors.csv]
    #[arg(short, long)]
    errors: Option<PathBuf>,

    /// Attach every concept to this dataset
    #[arg(short, long)]
    dataset: Option<String>,

    /// Store connection ceiling; workers get this minus the configured margin
    #[arg(long)]
    max_connections: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = TomlConfig::load_for_module(MODULE_NAME);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml_config.logging.level)),
        )
        .init();

    info!(
        "Starting dictionary-etl v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(args.root_folder)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let config = IngestConfig::resolve(&toml_config, args.max_connections);
    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());

    let pool = dictionary_etl::db::init_database_pool(&db_path, config.max_connections)
        .await
        .context("Failed to open dictionary store")?;

    let request = IngestRequest {
        input_path: args
            .input
            .unwrap_or_else(|| default_input_path(initializer.root_folder())),
        report_path: args
            .errors
            .unwrap_or_else(|| default_report_path(initializer.root_folder())),
        dataset_override: args.dataset,
    };

    let summary = IngestPipeline::new(pool.clone(), config)
        .run(request)
        .await
        .context("Ingest failed")?;
    pool.close().await;

    println!("{}", summary.status);
    if summary.groups_quarantined > 0 {
        println!("{} concept groups quarantined", summary.groups_quarantined);
    }

    Ok(())
}
