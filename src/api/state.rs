//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::history::HistoryService;
use crate::ingest::EventRecorder;
use crate::storage::{Database, EventStore, Registry, SqliteEventStore};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Event store shared by ingestion and history
    pub events: Arc<dyn EventStore>,
    /// Writes incoming readings
    pub recorder: EventRecorder,
    /// Reads and aggregates event history
    pub history: HistoryService,
    /// Location and bin CRUD
    pub registry: Registry,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state backed by the SQLite event store on `db`
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let events: Arc<dyn EventStore> = Arc::new(SqliteEventStore::new(db.clone()));
        Self::with_store(db, events, config)
    }

    /// Create state with a specific event store implementation
    pub fn with_store(db: Database, events: Arc<dyn EventStore>, config: ApiConfig) -> Self {
        Self {
            recorder: EventRecorder::new(Arc::clone(&events)),
            history: HistoryService::new(Arc::clone(&events)),
            registry: Registry::new(db),
            events,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
