//! Fillwatch REST API
//!
//! HTTP API layer for Fillwatch, built with Axum.
//!
//! # Endpoints
//!
//! ## Events
//! - `POST /api/v1/events` - Record a single reading
//! - `POST /api/v1/events/batch` - Record a batch of readings
//!
//! ## History
//! - `GET /api/v1/bins/:id/history` - Trend and frequency over the last week
//! - `GET /api/v1/bins/:id/history/:window` - Same, over a named window
//!
//! ## Locations
//! - `GET /api/v1/locations` - List all locations
//! - `POST /api/v1/locations` - Create a location
//! - `GET /api/v1/locations/:id` - Get a location
//! - `PUT /api/v1/locations/:id` - Update a location
//! - `DELETE /api/v1/locations/:id` - Delete a location
//!
//! ## Bins
//! - `GET /api/v1/bins` - List bins (`?location_id=` to filter)
//! - `POST /api/v1/bins` - Create a bin
//! - `GET /api/v1/bins/:id` - Get a bin
//! - `PUT /api/v1/bins/:id` - Update a bin
//! - `DELETE /api/v1/bins/:id` - Delete a bin
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,no_run
//! use fillwatch::api::{serve, AppState};
//! use fillwatch::config::ApiConfig;
//! use fillwatch::storage::{Database, StorageConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open(StorageConfig::new("./data")).await?;
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(db, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Event routes
        .route("/events", post(routes::events::ingest_event))
        .route("/events/batch", post(routes::events::ingest_batch))
        // Location routes
        .route(
            "/locations",
            get(routes::locations::list_locations).post(routes::locations::create_location),
        )
        .route(
            "/locations/:id",
            get(routes::locations::get_location)
                .put(routes::locations::update_location)
                .delete(routes::locations::delete_location),
        )
        // Bin routes
        .route(
            "/bins",
            get(routes::bins::list_bins).post(routes::bins::create_bin),
        )
        .route(
            "/bins/:id",
            get(routes::bins::get_bin)
                .put(routes::bins::update_bin)
                .delete(routes::bins::delete_bin),
        )
        // History routes
        .route("/bins/:id/history", get(routes::history::default_history))
        .route(
            "/bins/:id/history/:window",
            get(routes::history::event_history),
        );

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config);
    let timeout = TimeoutLayer::new(Duration::from_secs(state.config.request_timeout_secs));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Fillwatch API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Fillwatch API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
