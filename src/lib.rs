//! # Fillwatch
//!
//! Fill-level event history for waste receptacles. Sensors report how full a
//! bin is; Fillwatch stores each reading and answers "how has this bin been
//! filling up over the last N weeks or months?".
//!
//! ## Features
//!
//! - **Append-only event store**: SQLite-backed, one session per operation
//! - **Lookback windows**: symbolic tokens from `one_week` to `six_months`
//! - **Aggregation**: time-ordered trend plus per-level frequency counts
//! - **REST API**: ingestion, history and location/bin management with Axum
//!
//! ## Modules
//!
//! - [`storage`]: Event store and location/bin registry
//! - [`history`]: Window resolution, retrieval and aggregation
//! - [`ingest`]: Stamping and recording incoming readings
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fillwatch::history::HistoryService;
//! use fillwatch::ingest::EventRecorder;
//! use fillwatch::storage::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open(StorageConfig::new("./fillwatch_data")).await?;
//!
//!     // Register where the bin lives
//!     let registry = Registry::new(db.clone());
//!     let plaza = registry.create_location("Plaza", "north entrance").await?;
//!     let bin = registry.create_bin(plaza.id, "bottle caps").await?;
//!
//!     // Record a reading
//!     let store: Arc<dyn EventStore> = Arc::new(SqliteEventStore::new(db));
//!     let recorder = EventRecorder::new(Arc::clone(&store));
//!     recorder.record(Reading::new(bin.id, 420.0, true)).await?;
//!
//!     // Ask for the last month
//!     let history = HistoryService::new(store);
//!     let report = history.history(bin.id, "one_month", chrono::Utc::now()).await?;
//!
//!     println!("{} readings, {} distinct levels", report.trend.len(), report.frequency.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod history;
pub mod ingest;
pub mod logging;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    Bin, BinId, Database, Event, EventFilter, EventStore, Location, LocationId, Reading, Registry,
    SqliteEventStore, StorageConfig, StorageError, StorageResult,
};

pub use history::{
    Aggregation, FrequencyBucket, HistoryReport, HistoryService, TrendPoint, WindowToken,
    FILL_LEVEL_CEILING,
};

pub use ingest::EventRecorder;

pub use api::{build_router, serve, ApiError, AppState};

pub use config::Config;
