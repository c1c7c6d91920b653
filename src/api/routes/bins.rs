//! Bin Routes
//!
//! - GET /api/v1/bins - List bins (optionally `?location_id=`)
//! - POST /api/v1/bins - Create a bin
//! - GET /api/v1/bins/:id - Get a bin
//! - PUT /api/v1/bins/:id - Update (or move) a bin
//! - DELETE /api/v1/bins/:id - Delete a bin and its events

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{BinListQuery, BinRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::storage::{Bin, BinId};

const MAX_DESCRIPTION_LEN: usize = 200;

/// GET /api/v1/bins
pub async fn list_bins(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BinListQuery>,
) -> ApiResult<Json<Vec<Bin>>> {
    let bins = match query.location_id {
        Some(location_id) => state.registry.list_bins_by_location(location_id).await?,
        None => state.registry.list_bins().await?,
    };
    Ok(Json(bins))
}

/// POST /api/v1/bins
pub async fn create_bin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BinRequest>,
) -> ApiResult<(StatusCode, Json<Bin>)> {
    let description = validate_description(&req.description)?;
    let bin = state.registry.create_bin(req.location_id, description).await?;

    tracing::info!(bin_id = bin.id, location_id = bin.location_id, "Created bin");
    Ok((StatusCode::CREATED, Json(bin)))
}

/// GET /api/v1/bins/:id
pub async fn get_bin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<BinId>,
) -> ApiResult<Json<Bin>> {
    Ok(Json(state.registry.get_bin(id).await?))
}

/// PUT /api/v1/bins/:id
pub async fn update_bin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<BinId>,
    Json(req): Json<BinRequest>,
) -> ApiResult<Json<Bin>> {
    let description = validate_description(&req.description)?;
    Ok(Json(
        state
            .registry
            .update_bin(id, req.location_id, description)
            .await?,
    ))
}

/// DELETE /api/v1/bins/:id
pub async fn delete_bin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<BinId>,
) -> ApiResult<StatusCode> {
    state.registry.delete_bin(id).await?;
    tracing::info!(bin_id = id, "Deleted bin");
    Ok(StatusCode::NO_CONTENT)
}

fn validate_description(description: &str) -> ApiResult<String> {
    let description = description.trim();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::Validation(format!(
            "Bin description is limited to {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(description.to_string())
}
