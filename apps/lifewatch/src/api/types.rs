//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use chrono::{DateTime, Utc};
use lifewatch_core::{
    LifewatchError, ServerStatus,
    dates::parse_instant,
    primitives::{MAX_BATCH_DESCRIPTORS, MAX_DESCRIPTOR_LENGTH},
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

// =============================================================================
// EVALUATION PARAMETERS
// =============================================================================

/// Resolve an optional `now` parameter. Absent means the current instant.
pub fn evaluation_instant(raw: Option<&str>) -> Result<DateTime<Utc>, LifewatchError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_instant(raw),
        None => Ok(Utc::now()),
    }
}

fn check_descriptor(descriptor: &str) -> Result<(), LifewatchError> {
    if descriptor.len() > MAX_DESCRIPTOR_LENGTH {
        return Err(LifewatchError::InvalidInventory(format!(
            "OS descriptor longer than {} bytes",
            MAX_DESCRIPTOR_LENGTH
        )));
    }
    Ok(())
}

/// Query of `GET /api/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusQuery {
    /// OS descriptor.
    #[serde(default)]
    pub os: String,
    /// Instant to evaluate at (`YYYY-MM-DD` or RFC 3339).
    pub now: Option<String>,
    /// Use the static table instead of the dated resolver.
    #[serde(default)]
    pub legacy: bool,
}

impl StatusQuery {
    /// Check the descriptor size.
    pub fn validate(&self) -> Result<(), LifewatchError> {
        check_descriptor(&self.os)
    }
}

/// Query of `POST /api/inventory`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryQuery {
    pub now: Option<String>,
    #[serde(default)]
    pub legacy: bool,
}

// =============================================================================
// CLASSIFY REQUEST/RESPONSE
// =============================================================================

/// Batch classification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub descriptors: Vec<String>,
    #[serde(default)]
    pub now: Option<String>,
    #[serde(default)]
    pub legacy: bool,
}

impl ClassifyRequest {
    /// Check batch and descriptor sizes.
    pub fn validate(&self) -> Result<(), LifewatchError> {
        if self.descriptors.len() > MAX_BATCH_DESCRIPTORS {
            return Err(LifewatchError::InvalidInventory(format!(
                "{} descriptors exceeds the limit of {}",
                self.descriptors.len(),
                MAX_BATCH_DESCRIPTORS
            )));
        }
        self.descriptors
            .iter()
            .try_for_each(|descriptor| check_descriptor(descriptor))
    }
}

/// Batch classification response.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResponse {
    pub evaluated_at: DateTime<Utc>,
    pub strategy: &'static str,
    pub results: Vec<ServerStatus>,
}
