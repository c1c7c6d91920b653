//! Fillwatch API Server
//!
//! Run with: cargo run --bin fillwatch
//!
//! # Configuration
//!
//! Settings come from `--config <path>`, otherwise the first of
//! `~/.config/fillwatch/config.toml`, `/etc/fillwatch/config.toml` and
//! `./config.toml` that exists. Environment variables override the file:
//! - `FILLWATCH_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `FILLWATCH_API_PORT`: Port to listen on (default: 8082)
//! - `FILLWATCH_DATA_DIR`: Data directory (default: platform data dir + /fillwatch)
//! - `FILLWATCH_DB_FILE`: Database file name (default: fillwatch.db)
//! - `FILLWATCH_LOG_LEVEL`: Log level (default: info)
//! - `FILLWATCH_LOG_FORMAT`: `pretty` or `json`
//! - `RUST_LOG`: Full filter directive, wins over the level above

use anyhow::Context;
use clap::Parser;
use fillwatch::api::{serve, AppState};
use fillwatch::config::Config;
use fillwatch::logging;
use fillwatch::storage::Database;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fillwatch")]
#[command(about = "Fill-level event history server", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::resolve(args.config.as_deref()).context("Failed to load configuration")?;

    logging::init(&config.logging).context("Failed to initialize logging")?;

    tracing::info!("Starting Fillwatch API server v{}", env!("CARGO_PKG_VERSION"));

    let storage_config = config.storage.to_storage_config();
    tracing::info!("Database: {:?}", storage_config.database_path());

    let db = Database::open(storage_config)
        .await
        .context("Failed to open database")?;

    let state = AppState::new(db, config.api.clone());

    tracing::info!("Starting server on {}", config.api.addr());
    serve(state, &config.api).await.context("Server error")?;

    tracing::info!("Fillwatch API server stopped");
    Ok(())
}
