//! Event Store - append-only fill-level events
//!
//! ```text
//! Write Path:
//!   Event → append → INSERT fill_events (autocommit)
//!
//! Read Path:
//!   EventFilter → SELECT ... WHERE bin_id, timestamp >=, fill_level <= → Vec<Event>
//! ```
//!
//! An acknowledged `append` has been committed before it returns, so any later
//! `query` in the same process sees it. There is no update or delete path;
//! rows only disappear through cascade when their bin or location is removed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::storage::database::Database;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{BinId, Event, EventFilter};

/// Append-only persistence of fill-level events
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Durably record one event
    async fn append(&self, event: Event) -> StorageResult<()>;

    /// Durably record several events in one transaction
    async fn append_batch(&self, events: Vec<Event>) -> StorageResult<()>;

    /// Retrieve every event matching `filter`
    async fn query(&self, filter: EventFilter) -> StorageResult<Vec<Event>>;

    /// Verify the store can be reached
    async fn ping(&self) -> StorageResult<()>;

    /// Retrieve a bin's events recorded at or after `start`
    async fn query_by_bin(&self, bin_id: BinId, start: DateTime<Utc>) -> StorageResult<Vec<Event>> {
        self.query(EventFilter::for_bin(bin_id).since(start)).await
    }
}

/// SQLite-backed event store
#[derive(Debug, Clone)]
pub struct SqliteEventStore {
    db: Database,
}

impl SqliteEventStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Total number of stored events (all bins)
    #[cfg(test)]
    pub(crate) async fn count(&self) -> StorageResult<u64> {
        self.db
            .run(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM fill_events", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
    }
}

/// Smallest stored millisecond value that is not before `start`
///
/// Stored timestamps are whole milliseconds, so a bound with a sub-millisecond
/// part rounds up; flooring would admit events earlier than `start`.
fn millis_at_or_after(start: DateTime<Utc>) -> i64 {
    let millis = start.timestamp_millis();
    if start.timestamp_subsec_nanos() % 1_000_000 == 0 {
        millis
    } else {
        millis + 1
    }
}

fn decode_timestamp(millis: i64) -> StorageResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StorageError::Corruption(format!("timestamp out of range: {}", millis)))
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn append(&self, event: Event) -> StorageResult<()> {
        self.db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO fill_events (bin_id, timestamp, fill_level, status)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        event.bin_id,
                        event.timestamp.timestamp_millis(),
                        event.fill_level,
                        event.status
                    ],
                )?;
                Ok(())
            })
            .await
    }

    async fn append_batch(&self, events: Vec<Event>) -> StorageResult<()> {
        if events.is_empty() {
            return Ok(());
        }

        self.db
            .run(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare_cached(
                        "INSERT INTO fill_events (bin_id, timestamp, fill_level, status)
                         VALUES (?1, ?2, ?3, ?4)",
                    )?;

                    for event in &events {
                        stmt.execute(params![
                            event.bin_id,
                            event.timestamp.timestamp_millis(),
                            event.fill_level,
                            event.status
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
    }

    async fn query(&self, filter: EventFilter) -> StorageResult<Vec<Event>> {
        let since = filter.since.map(millis_at_or_after);

        let rows = self
            .db
            .run(move |conn| {
                let mut stmt = conn.prepare_cached(
                    "SELECT bin_id, timestamp, fill_level, status FROM fill_events
                     WHERE bin_id = ?1
                       AND (?2 IS NULL OR timestamp >= ?2)
                       AND (?3 IS NULL OR fill_level <= ?3)
                     ORDER BY rowid",
                )?;

                let rows = stmt
                    .query_map(params![filter.bin_id, since, filter.max_fill_level], |row| {
                        Ok((
                            row.get::<_, BinId>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, f64>(2)?,
                            row.get::<_, bool>(3)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(rows)
            })
            .await?;

        rows.into_iter()
            .map(|(bin_id, millis, fill_level, status)| {
                Ok(Event::with_timestamp(
                    bin_id,
                    fill_level,
                    status,
                    decode_timestamp(millis)?,
                ))
            })
            .collect()
    }

    async fn ping(&self) -> StorageResult<()> {
        self.db.ping().await
    }
}
