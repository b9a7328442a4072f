//! # lifewatch HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/lifecycle/{family}` - Cached policy entries (provider-shaped)
//! - `GET /api/status?os=...&now=...&legacy=...` - Classify one descriptor
//! - `POST /api/classify` - Classify up to 1000 descriptors
//! - `POST /api/inventory?now=...&legacy=...` - Classify an inventory document
//!
//! ## CORS
//!
//! `server.cors_origins` (or `LIFEWATCH_CORS_ORIGINS`): comma-separated list
//! of allowed origins, or "*" for all. Default: localhost only.

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `lifewatch::api::*`)
pub use handlers::{
    classify_handler, health_handler, inventory_handler, lifecycle_handler, status_handler,
};
pub use types::{
    ClassifyRequest, ClassifyResponse, ErrorResponse, HealthResponse, InventoryQuery, StatusQuery,
    evaluation_instant,
};

use crate::provider::PolicyFetcher;
use crate::service::LifecycleService;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use lifewatch_core::LifewatchError;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request body limit.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the classification service.
pub struct AppState<F> {
    /// The service, shared by every request.
    pub service: Arc<LifecycleService<F>>,
    /// Allowed CORS origins, as configured.
    pub cors_origins: Option<String>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            cors_origins: self.cors_origins.clone(),
        }
    }
}

impl<F: PolicyFetcher> AppState<F> {
    /// Create new app state with a service.
    #[must_use]
    pub fn new(service: LifecycleService<F>) -> Self {
        Self {
            service: Arc::new(service),
            cors_origins: None,
        }
    }

    /// Set the allowed CORS origins.
    #[must_use]
    pub fn with_cors_origins(mut self, origins: Option<String>) -> Self {
        self.cors_origins = origins;
        self
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from the configured origins.
///
/// - `"*"`: allows all origins
/// - unset: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit.
pub fn create_router<F: PolicyFetcher>(state: AppState<F>) -> Router {
    let cors = build_cors_layer(state.cors_origins.as_deref());

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/api/lifecycle/{family}",
            get(handlers::lifecycle_handler::<F>),
        )
        .route("/api/status", get(handlers::status_handler::<F>))
        .route("/api/classify", post(handlers::classify_handler::<F>))
        .route("/api/inventory", post(handlers::inventory_handler::<F>))
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server<F: PolicyFetcher>(
    addr: &str,
    state: AppState<F>,
) -> Result<(), LifewatchError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| LifewatchError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("lifewatch HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| LifewatchError::IoError(format!("Server error: {}", e)))
}
