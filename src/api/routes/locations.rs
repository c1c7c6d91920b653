//! Location Routes
//!
//! - GET /api/v1/locations - List locations
//! - POST /api/v1/locations - Create a location
//! - GET /api/v1/locations/:id - Get a location
//! - PUT /api/v1/locations/:id - Update a location
//! - DELETE /api/v1/locations/:id - Delete a location, its bins and their events

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::LocationRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::storage::{Location, LocationId};

const MAX_TEXT_LEN: usize = 200;

/// GET /api/v1/locations
pub async fn list_locations(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Location>>> {
    Ok(Json(state.registry.list_locations().await?))
}

/// POST /api/v1/locations
pub async fn create_location(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LocationRequest>,
) -> ApiResult<(StatusCode, Json<Location>)> {
    let (name, details) = validate_location_request(&req)?;
    let location = state.registry.create_location(name, details).await?;

    tracing::info!(location_id = location.id, name = %location.name, "Created location");
    Ok((StatusCode::CREATED, Json(location)))
}

/// GET /api/v1/locations/:id
pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<LocationId>,
) -> ApiResult<Json<Location>> {
    Ok(Json(state.registry.get_location(id).await?))
}

/// PUT /api/v1/locations/:id
pub async fn update_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<LocationId>,
    Json(req): Json<LocationRequest>,
) -> ApiResult<Json<Location>> {
    let (name, details) = validate_location_request(&req)?;
    Ok(Json(state.registry.update_location(id, name, details).await?))
}

/// DELETE /api/v1/locations/:id
pub async fn delete_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<LocationId>,
) -> ApiResult<StatusCode> {
    state.registry.delete_location(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_location_request(req: &LocationRequest) -> ApiResult<(String, String)> {
    let name = req.name.trim();
    let details = req.details.trim();

    if name.is_empty() {
        return Err(ApiError::Validation("Location name cannot be empty".to_string()));
    }

    if name.chars().count() > MAX_TEXT_LEN || details.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::Validation(format!(
            "Location name and details are limited to {} characters",
            MAX_TEXT_LEN
        )));
    }

    Ok((name.to_string(), details.to_string()))
}
