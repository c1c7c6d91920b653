//! History Query Service
//!
//! Retrieves a bin's events for a lookback window and hands them to the
//! aggregation step.
//!
//! ```text
//! (bin_id, token, now) → resolve → start
//!                      → EventStore::query(bin_id, >= start, <= 900)
//!                      → aggregate → HistoryReport
//! ```
//!
//! Aggregation only runs after a fully successful retrieval; a store failure
//! is returned as-is with no partial result. Nothing is retried here.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

use crate::history::aggregate::{aggregate, FrequencyBucket, TrendPoint};
use crate::history::window::WindowToken;
use crate::storage::{BinId, Event, EventFilter, EventStore, StorageResult};

/// Readings above this distance are sensor noise / out of range
pub const FILL_LEVEL_CEILING: f64 = 900.0;

/// Trend and frequency for one bin over one window
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryReport {
    pub bin_id: BinId,
    pub window: WindowToken,
    pub start: DateTime<Utc>,
    pub trend: Vec<TrendPoint>,
    pub frequency: Vec<FrequencyBucket>,
}

/// Read-only access to a bin's event history
#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn EventStore>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Events of `bin_id` at or after `start` with a fill level within the ceiling
    ///
    /// Result order is whatever the store returns.
    pub async fn query(&self, bin_id: BinId, start: DateTime<Utc>) -> StorageResult<Vec<Event>> {
        let filter = EventFilter::for_bin(bin_id)
            .since(start)
            .max_fill_level(FILL_LEVEL_CEILING);

        let events = self.store.query(filter).await?;
        debug_assert!(events.iter().all(|e| filter.matches(e)));
        Ok(events)
    }

    /// History for a raw window token; unrecognized tokens mean one week
    pub async fn history(
        &self,
        bin_id: BinId,
        token: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<HistoryReport> {
        self.history_for(bin_id, WindowToken::parse(token), now).await
    }

    /// History for an already-parsed window
    pub async fn history_for(
        &self,
        bin_id: BinId,
        window: WindowToken,
        now: DateTime<Utc>,
    ) -> StorageResult<HistoryReport> {
        let started = Instant::now();
        let start = window.start_from(now);

        let events = self.query(bin_id, start).await?;
        let aggregation = aggregate(&events);

        tracing::debug!(
            bin_id,
            window = %window,
            start = %start,
            events = aggregation.event_count(),
            distinct_levels = aggregation.frequency.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Computed event history"
        );

        Ok(HistoryReport {
            bin_id,
            window,
            start,
            trend: aggregation.trend,
            frequency: aggregation.frequency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, Registry, SqliteEventStore, StorageConfig, StorageError};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    struct UnreachableStore;

    #[async_trait]
    impl EventStore for UnreachableStore {
        async fn append(&self, _event: Event) -> StorageResult<()> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn append_batch(&self, _events: Vec<Event>) -> StorageResult<()> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn query(&self, _filter: EventFilter) -> StorageResult<Vec<Event>> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn ping(&self) -> StorageResult<()> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    async fn create_test_service() -> (HistoryService, Arc<SqliteEventStore>, BinId, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(StorageConfig::new(dir.path())).await.unwrap();

        let registry = Registry::new(db.clone());
        let location = registry.create_location("Campus", "").await.unwrap();
        let bin = registry.create_bin(location.id, "caps").await.unwrap();

        let store = Arc::new(SqliteEventStore::new(db));
        let service = HistoryService::new(store.clone());
        (service, store, bin.id, dir)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_ceiling_and_window_scenario() {
        let (service, store, bin, _dir) = create_test_service().await;

        store.append(Event::with_timestamp(bin, 100.0, true, t0())).await.unwrap();
        store
            .append(Event::with_timestamp(bin, 100.0, true, t0() + Duration::hours(1)))
            .await
            .unwrap();
        store
            .append(Event::with_timestamp(bin, 950.0, true, t0() + Duration::hours(2)))
            .await
            .unwrap();

        let events = service.query(bin, t0() - Duration::days(1)).await.unwrap();
        let result = aggregate(&events);

        assert_eq!(
            result.trend,
            vec![
                TrendPoint { timestamp: t0(), fill_level: 100.0 },
                TrendPoint { timestamp: t0() + Duration::hours(1), fill_level: 100.0 },
            ]
        );
        assert_eq!(
            result.frequency,
            vec![FrequencyBucket { fill_level: 100.0, count: 2 }]
        );
    }

    #[tokio::test]
    async fn test_query_never_returns_out_of_range_events() {
        let (service, store, bin, _dir) = create_test_service().await;
        let start = t0();

        let events: Vec<Event> = (-5..5)
            .flat_map(|h| {
                [
                    Event::with_timestamp(bin, 899.0, true, start + Duration::hours(h)),
                    Event::with_timestamp(bin, 901.0, true, start + Duration::hours(h)),
                ]
            })
            .collect();
        store.append_batch(events).await.unwrap();

        let found = service.query(bin, start).await.unwrap();

        assert_eq!(found.len(), 5);
        assert!(found
            .iter()
            .all(|e| e.fill_level <= FILL_LEVEL_CEILING && e.timestamp >= start));
    }

    #[tokio::test]
    async fn test_query_start_inside_a_millisecond() {
        let (service, store, bin, _dir) = create_test_service().await;

        store.append(Event::with_timestamp(bin, 100.0, true, t0())).await.unwrap();

        let start = t0() + Duration::microseconds(500);
        let found = service.query(bin, start).await.unwrap();

        assert!(found.iter().all(|e| e.timestamp >= start));
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_history_uses_window() {
        let (service, store, bin, _dir) = create_test_service().await;
        let now = t0();

        store
            .append(Event::with_timestamp(bin, 400.0, true, now - Duration::days(10)))
            .await
            .unwrap();
        store
            .append(Event::with_timestamp(bin, 300.0, true, now - Duration::days(2)))
            .await
            .unwrap();

        let week = service.history(bin, "one_week", now).await.unwrap();
        assert_eq!(week.window, WindowToken::OneWeek);
        assert_eq!(week.trend.len(), 1);

        let month = service.history(bin, "ONE_MONTH", now).await.unwrap();
        assert_eq!(month.window, WindowToken::OneMonth);
        assert_eq!(month.start, Utc.with_ymd_and_hms(2024, 2, 29, 10, 0, 0).unwrap());
        assert_eq!(month.trend.len(), 2);

        let fallback = service.history(bin, "bogus", now).await.unwrap();
        assert_eq!(fallback.window, WindowToken::OneWeek);
        assert_eq!(fallback.start, now - Duration::days(7));
    }

    #[tokio::test]
    async fn test_history_without_events() {
        let (service, _store, bin, _dir) = create_test_service().await;

        let report = service.history(bin, "six_months", t0()).await.unwrap();

        assert!(report.trend.is_empty());
        assert!(report.frequency.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_history_is_identical() {
        let (service, store, bin, _dir) = create_test_service().await;

        for i in 0..20 {
            store
                .append(Event::with_timestamp(
                    bin,
                    (i % 4) as f64 * 50.0,
                    i % 2 == 0,
                    t0() - Duration::hours(i),
                ))
                .await
                .unwrap();
        }

        let first = service.history(bin, "three_weeks", t0()).await.unwrap();
        let second = service.history(bin, "three_weeks", t0()).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let service = HistoryService::new(Arc::new(UnreachableStore));

        let err = service.history(1, "one_week", t0()).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
