//! Event Routes
//!
//! Endpoints for ingesting fill-level readings.
//!
//! - POST /api/v1/events - Single reading
//! - POST /api/v1/events/batch - Batch of readings

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{
    BatchError, BatchIngestRequest, BatchIngestResponse, IngestRequest, IngestResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::storage::Reading;

/// POST /api/v1/events
///
/// Record a single reading, stamped with the server's current time.
pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    validate_ingest_request(&req)?;

    let event = state.recorder.record(Reading::from(&req)).await?;

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            status: "ok".to_string(),
            bin_id: event.bin_id,
            timestamp: event.timestamp,
        }),
    ))
}

/// POST /api/v1/events/batch
///
/// Valid readings are recorded together in one transaction; invalid ones are
/// reported by index. A storage failure fails the whole request.
pub async fn ingest_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchIngestRequest>,
) -> ApiResult<(StatusCode, Json<BatchIngestResponse>)> {
    if req.events.is_empty() {
        return Err(ApiError::Validation("Empty batch".to_string()));
    }

    let max = state.config.max_batch_size;
    if req.events.len() > max {
        return Err(ApiError::Validation(format!(
            "Batch size exceeds maximum of {} readings",
            max
        )));
    }

    let mut readings = Vec::with_capacity(req.events.len());
    let mut errors = Vec::new();

    for (index, item) in req.events.iter().enumerate() {
        match validate_ingest_request(item) {
            Ok(()) => readings.push(Reading::from(item)),
            Err(e) => errors.push(BatchError {
                index,
                error: e.to_string(),
            }),
        }
    }

    let accepted = if readings.is_empty() {
        0
    } else {
        state.recorder.record_batch(readings).await?.len()
    };

    let status = if errors.is_empty() {
        StatusCode::CREATED
    } else if accepted > 0 {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::BAD_REQUEST
    };

    let status_str = if errors.is_empty() { "ok" } else { "partial" };

    Ok((
        status,
        Json(BatchIngestResponse {
            status: status_str.to_string(),
            accepted,
            rejected: errors.len(),
            errors,
        }),
    ))
}

/// Validate an ingest request
///
/// Only rejects what cannot be stored: JSON has no NaN/inf and SQLite turns
/// NaN into NULL.
fn validate_ingest_request(req: &IngestRequest) -> ApiResult<()> {
    if !req.fill_level.is_finite() {
        return Err(ApiError::Validation(
            "fill_level must be a finite number".to_string(),
        ));
    }

    Ok(())
}
