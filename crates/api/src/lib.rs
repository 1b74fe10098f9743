//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for every declared resource type and for raw assets
//! - The bearer-token access gate for mutating routes
//! - Mapping of domain errors to status codes and `{error, message}` bodies

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use campus_core::resource::ResourceService;
use campus_core::storage::StorageService;
use campus_db::ResourceRepository;
use campus_shared::JwtService;

pub use error::{ApiError, ApiResult};

/// Resource service as wired in production.
pub type Resources = ResourceService<ResourceRepository, StorageService>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Resource engine and asset lifecycle.
    pub resources: Arc<Resources>,
    /// JWT service for the access gate.
    pub jwt_service: Arc<JwtService>,
}

/// Transport limits applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    /// Time a request may take before it is aborted.
    pub request_timeout: Duration,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 11 * 1024 * 1024,
        }
    }
}

impl HttpLimits {
    /// Body limit that fits an upload of `max_file_size` plus multipart framing.
    #[must_use]
    pub fn for_uploads(request_timeout: Duration, max_file_size: u64) -> Self {
        let max_file_size = usize::try_from(max_file_size).unwrap_or(usize::MAX);
        Self {
            request_timeout,
            max_body_bytes: max_file_size.saturating_add(1024 * 1024),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState, limits: HttpLimits) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(limits.max_body_bytes))
        .layer(TimeoutLayer::new(limits.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
