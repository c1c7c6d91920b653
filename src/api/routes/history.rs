//! History Routes
//!
//! - GET /api/v1/bins/:id/history - Default (one week) window
//! - GET /api/v1/bins/:id/history/:window - Named window
//!
//! Unrecognized window names are not an error; they fall back to one week
//! and the applied window is echoed in the response.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::HistoryResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::history::WindowToken;
use crate::storage::BinId;

/// GET /api/v1/bins/:id/history/:window
pub async fn event_history(
    State(state): State<Arc<AppState>>,
    Path((bin_id, window)): Path<(BinId, String)>,
) -> ApiResult<Json<HistoryResponse>> {
    tracing::info!(bin_id, window = %window, "Getting event history");

    let report = state.history.history(bin_id, &window, Utc::now()).await?;
    Ok(Json(report.into()))
}

/// GET /api/v1/bins/:id/history
pub async fn default_history(
    State(state): State<Arc<AppState>>,
    Path(bin_id): Path<BinId>,
) -> ApiResult<Json<HistoryResponse>> {
    let report = state
        .history
        .history_for(bin_id, WindowToken::default(), Utc::now())
        .await?;
    Ok(Json(report.into()))
}
