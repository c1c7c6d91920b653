//! Core data types for the fill-level event store
//!
//! This module defines the fundamental types used throughout the storage layer:
//! - `Event`: A single timestamped fill-level reading for a bin
//! - `Reading`: An incoming reading before it is stamped and stored
//! - `EventFilter`: Predicate over bin, time and fill level
//! - `Location` and `Bin`: The registry entities events hang off

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a bin (SQLite rowid)
pub type BinId = i64;

/// Identifier of a location (SQLite rowid)
pub type LocationId = i64;

/// A single fill-level reading recorded for a bin
///
/// Events are immutable once stored. Ordering between events is established
/// by `timestamp` only; two events with the same timestamp have no defined
/// relative order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Bin that produced the reading
    pub bin_id: BinId,
    /// UTC instant the reading was recorded
    pub timestamp: DateTime<Utc>,
    /// Distance measurement reported by the sensor (smaller is fuller)
    pub fill_level: f64,
    /// Operational flag reported alongside the reading
    pub status: bool,
}

impl Event {
    /// Create an event stamped with the current time
    pub fn new(bin_id: BinId, fill_level: f64, status: bool) -> Self {
        Self::with_timestamp(bin_id, fill_level, status, Utc::now())
    }

    /// Create an event with a specific timestamp
    pub fn with_timestamp(
        bin_id: BinId,
        fill_level: f64,
        status: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            bin_id,
            timestamp,
            fill_level,
            status,
        }
    }
}

/// An incoming sensor reading, not yet stamped
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    pub bin_id: BinId,
    pub fill_level: f64,
    pub status: bool,
}

impl Reading {
    pub fn new(bin_id: BinId, fill_level: f64, status: bool) -> Self {
        Self {
            bin_id,
            fill_level,
            status,
        }
    }

    /// Stamp this reading into an event
    pub fn at(self, timestamp: DateTime<Utc>) -> Event {
        Event::with_timestamp(self.bin_id, self.fill_level, self.status, timestamp)
    }
}

/// Filter for event retrieval
///
/// All set conditions must hold. `since` is inclusive, `max_fill_level`
/// is inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventFilter {
    pub bin_id: BinId,
    pub since: Option<DateTime<Utc>>,
    pub max_fill_level: Option<f64>,
}

impl EventFilter {
    /// Match every event of a bin
    pub fn for_bin(bin_id: BinId) -> Self {
        Self {
            bin_id,
            since: None,
            max_fill_level: None,
        }
    }

    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.since = Some(start);
        self
    }

    pub fn max_fill_level(mut self, ceiling: f64) -> Self {
        self.max_fill_level = Some(ceiling);
        self
    }

    /// Check if an event matches this filter
    pub fn matches(&self, event: &Event) -> bool {
        if event.bin_id != self.bin_id {
            return false;
        }

        if let Some(start) = self.since {
            if event.timestamp < start {
                return false;
            }
        }

        if let Some(ceiling) = self.max_fill_level {
            if event.fill_level > ceiling {
                return false;
            }
        }

        true
    }
}

/// A physical site owning zero or more bins
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub details: String,
}

/// A monitored receptacle placed at a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bin {
    pub id: BinId,
    pub location_id: LocationId,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_reading_stamp() {
        let event = Reading::new(5, 120.0, true).at(t0());

        assert_eq!(event.bin_id, 5);
        assert_eq!(event.fill_level, 120.0);
        assert!(event.status);
        assert_eq!(event.timestamp, t0());
    }

    #[test]
    fn test_filter_bin() {
        let event = Event::with_timestamp(5, 100.0, true, t0());

        assert!(EventFilter::for_bin(5).matches(&event));
        assert!(!EventFilter::for_bin(6).matches(&event));
    }

    #[test]
    fn test_filter_since_is_inclusive() {
        let event = Event::with_timestamp(5, 100.0, true, t0());

        assert!(EventFilter::for_bin(5).since(t0()).matches(&event));
        assert!(!EventFilter::for_bin(5)
            .since(t0() + Duration::milliseconds(1))
            .matches(&event));
    }

    #[test]
    fn test_filter_ceiling_is_inclusive() {
        let at_ceiling = Event::with_timestamp(5, 900.0, true, t0());
        let above = Event::with_timestamp(5, 900.5, true, t0());
        let filter = EventFilter::for_bin(5).max_fill_level(900.0);

        assert!(filter.matches(&at_ceiling));
        assert!(!filter.matches(&above));
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::with_timestamp(3, 412.5, false, t0());
        let json = serde_json::to_string(&event).unwrap();
        let restored: Event = serde_json::from_str(&json).unwrap();

        assert_eq!(event, restored);
    }
}
