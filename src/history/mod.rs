//! Event history analytics
//!
//! Turns a bin's stored events into the two views served to callers:
//!
//! - **window**: symbolic lookback tokens and their start instants
//! - **aggregate**: trend (time-ordered) and frequency (grouped counts)
//! - **service**: retrieval with the fill-level ceiling, then aggregation
//!
//! # Example
//!
//! ```rust,no_run
//! use fillwatch::history::HistoryService;
//! use fillwatch::storage::{Database, SqliteEventStore, StorageConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open(StorageConfig::new("./data")).await?;
//!     let history = HistoryService::new(Arc::new(SqliteEventStore::new(db)));
//!
//!     let report = history.history(5, "one_month", chrono::Utc::now()).await?;
//!     println!("{} readings since {}", report.trend.len(), report.start);
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod service;
pub mod window;

pub use aggregate::{aggregate, frequency, trend, Aggregation, FrequencyBucket, TrendPoint};
pub use service::{HistoryReport, HistoryService, FILL_LEVEL_CEILING};
pub use window::{resolve, Lookback, WindowToken};
