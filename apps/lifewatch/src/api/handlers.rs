//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Classification never fails once the input is valid: a descriptor that
//! cannot be resolved comes back as status `unknown` with a reason.

use super::{
    AppState,
    types::{
        ClassifyRequest, ClassifyResponse, ErrorResponse, HealthResponse, InventoryQuery,
        StatusQuery, evaluation_instant,
    },
};
use crate::provider::PolicyFetcher;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lifewatch_core::{Inventory, OsFamily};

fn error_response(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(msg))).into_response()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// LIFECYCLE HANDLER
// =============================================================================

/// Policy entries of a family, in the provider's payload shape.
///
/// Another lifewatch instance can use this endpoint as its provider.
pub async fn lifecycle_handler<F: PolicyFetcher>(
    State(state): State<AppState<F>>,
    Path(product): Path<String>,
) -> Response {
    let family = match OsFamily::from_product_key(&product) {
        Ok(family) => family,
        Err(_) => {
            return error_response(
                StatusCode::NOT_FOUND,
                format!("Unknown OS family: {}", product),
            );
        }
    };

    match state.service.policy(family).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => error_response(
            StatusCode::BAD_GATEWAY,
            format!("Lifecycle data unavailable: {}", e),
        ),
    }
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Classify one descriptor.
pub async fn status_handler<F: PolicyFetcher>(
    State(state): State<AppState<F>>,
    Query(query): Query<StatusQuery>,
) -> Response {
    if let Err(e) = query.validate() {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }
    let now = match evaluation_instant(query.now.as_deref()) {
        Ok(now) => now,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let status = if query.legacy {
        state.service.classify_legacy(&query.os, now)
    } else {
        state.service.classify(&query.os, now).await
    };
    (StatusCode::OK, Json(status)).into_response()
}

// =============================================================================
// CLASSIFY HANDLER
// =============================================================================

/// Classify a batch of descriptors.
pub async fn classify_handler<F: PolicyFetcher>(
    State(state): State<AppState<F>>,
    Json(request): Json<ClassifyRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }
    let now = match evaluation_instant(request.now.as_deref()) {
        Ok(now) => now,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let (strategy, results) = if request.legacy {
        let results = request
            .descriptors
            .iter()
            .map(|descriptor| state.service.classify_legacy(descriptor, now))
            .collect();
        ("legacy", results)
    } else {
        (
            "dynamic",
            state.service.classify_many(&request.descriptors, now).await,
        )
    };

    let response = ClassifyResponse {
        evaluated_at: now,
        strategy,
        results,
    };
    (StatusCode::OK, Json(response)).into_response()
}

// =============================================================================
// INVENTORY HANDLER
// =============================================================================

/// Classify an inventory document.
pub async fn inventory_handler<F: PolicyFetcher>(
    State(state): State<AppState<F>>,
    Query(query): Query<InventoryQuery>,
    body: Bytes,
) -> Response {
    let inventory = match Inventory::from_json(&body) {
        Ok(inventory) => inventory,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let now = match evaluation_instant(query.now.as_deref()) {
        Ok(now) => now,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let report = if query.legacy {
        state.service.legacy_inventory(&inventory, now)
    } else {
        state.service.classify_inventory(&inventory, now).await
    };
    tracing::info!(
        servers = report.summary.total,
        attention = report.summary.needing_attention(),
        strategy = report.strategy,
        "Inventory classified"
    );
    (StatusCode::OK, Json(report)).into_response()
}
