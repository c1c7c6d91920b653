//! Event ingestion
//!
//! Stamps incoming readings with the current time and appends them to the
//! event store. No range check is applied to the fill level and the bin is
//! not looked up first; an unknown bin is rejected by the store itself when
//! reference enforcement is on.

use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;

use crate::storage::{Event, EventStore, Reading, StorageResult};

/// Writes readings into the event store
#[derive(Clone)]
pub struct EventRecorder {
    store: Arc<dyn EventStore>,
}

impl EventRecorder {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Record one reading stamped with the current time
    pub async fn record(&self, reading: Reading) -> StorageResult<Event> {
        self.record_at(reading, Utc::now()).await
    }

    /// Record one reading with an explicit timestamp
    ///
    /// The timestamp is truncated to the millisecond precision the store keeps,
    /// so the returned event equals what a later query yields.
    pub async fn record_at(&self, reading: Reading, timestamp: DateTime<Utc>) -> StorageResult<Event> {
        let event = reading.at(timestamp.trunc_subsecs(3));

        if let Err(e) = self.store.append(event.clone()).await {
            tracing::warn!(bin_id = reading.bin_id, error = %e, "Failed to record event");
            return Err(e);
        }

        tracing::info!(
            bin_id = event.bin_id,
            fill_level = event.fill_level,
            status = event.status,
            "Recorded event"
        );

        Ok(event)
    }

    /// Record several readings atomically, all stamped with the same instant
    pub async fn record_batch(&self, readings: Vec<Reading>) -> StorageResult<Vec<Event>> {
        let timestamp = Utc::now().trunc_subsecs(3);
        let events: Vec<Event> = readings.into_iter().map(|r| r.at(timestamp)).collect();

        self.store.append_batch(events.clone()).await?;

        tracing::info!(events = events.len(), "Recorded event batch");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{
        Database, EventFilter, Registry, SqliteEventStore, StorageConfig, StorageError,
    };
    use tempfile::tempdir;

    async fn create_test_recorder() -> (EventRecorder, Arc<SqliteEventStore>, i64, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(StorageConfig::new(dir.path())).await.unwrap();

        let registry = Registry::new(db.clone());
        let location = registry.create_location("Cafeteria", "").await.unwrap();
        let bin = registry.create_bin(location.id, "").await.unwrap();

        let store = Arc::new(SqliteEventStore::new(db));
        (EventRecorder::new(store.clone()), store, bin.id, dir)
    }

    #[tokio::test]
    async fn test_record_is_visible_to_next_query() {
        let (recorder, store, bin, _dir) = create_test_recorder().await;

        let before = Utc::now().trunc_subsecs(3);
        let event = recorder.record(Reading::new(bin, 512.25, true)).await.unwrap();

        assert!(event.timestamp >= before);
        assert!(event.timestamp <= Utc::now());

        let stored = store.query(EventFilter::for_bin(bin)).await.unwrap();
        assert_eq!(stored, vec![event]);
    }

    #[tokio::test]
    async fn test_record_accepts_any_fill_level() {
        let (recorder, store, bin, _dir) = create_test_recorder().await;

        recorder.record(Reading::new(bin, -12.0, false)).await.unwrap();
        recorder.record(Reading::new(bin, 5000.0, true)).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_record_unknown_bin_fails() {
        let (recorder, _store, bin, _dir) = create_test_recorder().await;

        let err = recorder
            .record(Reading::new(bin + 1, 100.0, true))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_record_batch_shares_timestamp() {
        let (recorder, store, bin, _dir) = create_test_recorder().await;

        let events = recorder
            .record_batch(vec![
                Reading::new(bin, 10.0, true),
                Reading::new(bin, 20.0, true),
                Reading::new(bin, 30.0, false),
            ])
            .await
            .unwrap();

        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.timestamp == events[0].timestamp));
        assert_eq!(store.count().await.unwrap(), 3);
    }
}
