//! Trend and frequency views over a set of events
//!
//! Both views are computed independently from the same input slice:
//!
//! - **trend**: every event projected to `(timestamp, fill_level)`, sorted
//!   ascending by timestamp. The sort is stable, so events sharing a timestamp
//!   keep their input order. Nothing is deduplicated or downsampled.
//! - **frequency**: events grouped by exact `fill_level` equality, one bucket
//!   per distinct value with its count, in first-encountered order.
//!
//! Grouping uses `f64` equality as-is, with no rounding or binning. Readings
//! from a continuous sensor rarely repeat exactly, so buckets tend toward a
//! count of one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::storage::Event;

/// One point of the fill-level trend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub fill_level: f64,
}

/// Number of events sharing one exact fill level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FrequencyBucket {
    pub fill_level: f64,
    pub count: usize,
}

/// Both views over one event set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub trend: Vec<TrendPoint>,
    pub frequency: Vec<FrequencyBucket>,
}

impl Aggregation {
    /// Number of events the views were built from
    pub fn event_count(&self) -> usize {
        self.trend.len()
    }
}

/// Time-ordered fill-level series
pub fn trend(events: &[Event]) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = events
        .iter()
        .map(|e| TrendPoint {
            timestamp: e.timestamp,
            fill_level: e.fill_level,
        })
        .collect();

    points.sort_by_key(|p| p.timestamp);
    points
}

/// Count of events per distinct fill level
pub fn frequency(events: &[Event]) -> Vec<FrequencyBucket> {
    let mut buckets: Vec<FrequencyBucket> = Vec::new();
    let mut positions: HashMap<u64, usize> = HashMap::new();

    for event in events {
        match positions.get(&equality_key(event.fill_level)) {
            Some(&idx) => buckets[idx].count += 1,
            None => {
                positions.insert(equality_key(event.fill_level), buckets.len());
                buckets.push(FrequencyBucket {
                    fill_level: event.fill_level,
                    count: 1,
                });
            }
        }
    }

    buckets
}

/// Compute trend and frequency for one event set
pub fn aggregate(events: &[Event]) -> Aggregation {
    Aggregation {
        trend: trend(events),
        frequency: frequency(events),
    }
}

/// Hash key agreeing with `f64 ==` for non-NaN values
///
/// `-0.0 == 0.0`, so both map to the same key.
fn equality_key(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}
