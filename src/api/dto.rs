//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::{FrequencyBucket, HistoryReport, TrendPoint};
use crate::storage::{BinId, LocationId, Reading};

// ============================================
// INGEST DTOs
// ============================================

/// Single reading ingest request
///
/// Every field is required.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestRequest {
    /// Bin that produced the reading
    pub bin_id: BinId,
    /// Sensor distance measurement
    pub fill_level: f64,
    /// Operational flag
    pub status: bool,
}

impl From<&IngestRequest> for Reading {
    fn from(req: &IngestRequest) -> Self {
        Reading::new(req.bin_id, req.fill_level, req.status)
    }
}

/// Single reading ingest response
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// Status: "ok"
    pub status: String,
    /// Bin the event was recorded for
    pub bin_id: BinId,
    /// Timestamp assigned to the event
    pub timestamp: DateTime<Utc>,
}

/// Batch ingest request
#[derive(Debug, Deserialize)]
pub struct BatchIngestRequest {
    /// Readings to ingest
    pub events: Vec<IngestRequest>,
}

/// Batch ingest response
#[derive(Debug, Serialize)]
pub struct BatchIngestResponse {
    /// Status: "ok" or "partial"
    pub status: String,
    /// Number of readings recorded
    pub accepted: usize,
    /// Number of readings rejected
    pub rejected: usize,
    /// Errors for rejected readings
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<BatchError>,
}

/// Error for a single reading in batch ingest
#[derive(Debug, Serialize)]
pub struct BatchError {
    /// Index of the failed reading
    pub index: usize,
    /// Error message
    pub error: String,
}

// ============================================
// HISTORY DTOs
// ============================================

/// Event history response
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryResponse {
    pub bin_id: BinId,
    /// Window token actually applied
    pub window: String,
    /// Start of the window
    pub start: DateTime<Utc>,
    /// Readings ordered by timestamp
    pub fill_level_trend: Vec<TrendPointDto>,
    /// Reading count per distinct fill level
    pub fill_frequency: Vec<FrequencyDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrendPointDto {
    pub timestamp: DateTime<Utc>,
    pub fill_level: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FrequencyDto {
    pub fill_level: f64,
    pub count: usize,
}

impl From<TrendPoint> for TrendPointDto {
    fn from(p: TrendPoint) -> Self {
        Self {
            timestamp: p.timestamp,
            fill_level: p.fill_level,
        }
    }
}

impl From<FrequencyBucket> for FrequencyDto {
    fn from(b: FrequencyBucket) -> Self {
        Self {
            fill_level: b.fill_level,
            count: b.count,
        }
    }
}

impl From<HistoryReport> for HistoryResponse {
    fn from(report: HistoryReport) -> Self {
        Self {
            bin_id: report.bin_id,
            window: report.window.to_string(),
            start: report.start,
            fill_level_trend: report.trend.into_iter().map(Into::into).collect(),
            fill_frequency: report.frequency.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================
// REGISTRY DTOs
// ============================================

/// Create or update location request
#[derive(Debug, Clone, Deserialize)]
pub struct LocationRequest {
    pub name: String,
    #[serde(default)]
    pub details: String,
}

/// Create or update bin request
#[derive(Debug, Clone, Deserialize)]
pub struct BinRequest {
    pub location_id: LocationId,
    #[serde(default)]
    pub description: String,
}

/// Query parameters for listing bins
#[derive(Debug, Default, Deserialize)]
pub struct BinListQuery {
    #[serde(default)]
    pub location_id: Option<LocationId>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy or unhealthy
    pub status: String,
    /// Storage status: ok or error
    pub storage: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Package version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::WindowToken;
    use chrono::TimeZone;

    #[test]
    fn test_history_response_field_names() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 5, 6, 0, 0).unwrap();
        let report = HistoryReport {
            bin_id: 5,
            window: WindowToken::OneWeek,
            start: ts,
            trend: vec![TrendPoint { timestamp: ts, fill_level: 100.0 }],
            frequency: vec![FrequencyBucket { fill_level: 100.0, count: 1 }],
        };

        let json = serde_json::to_value(HistoryResponse::from(report)).unwrap();

        assert_eq!(json["Window"], "one_week");
        assert_eq!(json["FillLevelTrend"][0]["FillLevel"], 100.0);
        assert!(json["FillLevelTrend"][0]["Timestamp"].is_string());
        assert_eq!(json["FillFrequency"][0]["FillLevel"], 100.0);
        assert_eq!(json["FillFrequency"][0]["Count"], 1);
    }

    #[test]
    fn test_ingest_request_requires_all_fields() {
        assert!(serde_json::from_str::<IngestRequest>(
            r#"{"bin_id": 5, "fill_level": 120.5, "status": true}"#
        )
        .is_ok());
        assert!(serde_json::from_str::<IngestRequest>(r#"{"bin_id": 5, "fill_level": 120.5}"#).is_err());
        assert!(serde_json::from_str::<IngestRequest>(r#"{"bin_id": "five", "fill_level": 1, "status": true}"#).is_err());
    }

    #[test]
    fn test_location_request_details_optional() {
        let req: LocationRequest = serde_json::from_str(r#"{"name": "Plaza"}"#).unwrap();
        assert_eq!(req.details, "");
    }
}
