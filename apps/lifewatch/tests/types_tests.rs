//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use lifewatch::api::{
    ClassifyRequest, ClassifyResponse, ErrorResponse, HealthResponse, InventoryQuery, StatusQuery,
};
use lifewatch_core::{LegacyStatusTable, ServerStatus};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_serialization() {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: "0.4.2".to_string(),
    };

    let json = serde_json::to_string(&health).unwrap();
    assert!(json.contains("\"status\":\"ok\""));
    assert!(json.contains("\"version\":\"0.4.2\""));
}

#[test]
fn test_error_response_roundtrip() {
    let json = serde_json::to_string(&ErrorResponse::new("boom")).unwrap();
    assert_eq!(json, r#"{"error":"boom"}"#);
}

// =============================================================================
// REQUEST TESTS
// =============================================================================

#[test]
fn test_classify_request_defaults() {
    let request: ClassifyRequest = serde_json::from_str(r#"{"descriptors":["RHEL 7.9"]}"#).unwrap();
    assert_eq!(request.descriptors, vec!["RHEL 7.9"]);
    assert!(request.now.is_none());
    assert!(!request.legacy);
    assert!(request.validate().is_ok());
}

#[test]
fn test_classify_request_requires_descriptors() {
    assert!(serde_json::from_str::<ClassifyRequest>(r#"{"legacy":true}"#).is_err());
}

#[test]
fn test_status_query_rejects_long_descriptor() {
    let query = StatusQuery {
        os: "RHEL ".repeat(100),
        now: None,
        legacy: false,
    };
    assert!(query.validate().is_err());
    assert!(StatusQuery::default().validate().is_ok());
}

#[test]
fn test_inventory_query_defaults() {
    let query = InventoryQuery::default();
    assert!(query.now.is_none());
    assert!(!query.legacy);
}

// =============================================================================
// RESPONSE TESTS
// =============================================================================

#[test]
fn test_classify_response_shape() {
    let now = chrono::DateTime::UNIX_EPOCH;
    let table = LegacyStatusTable::new();
    let response = ClassifyResponse {
        evaluated_at: now,
        strategy: "legacy",
        results: vec![
            ServerStatus::classify("Ubuntu 20.04", &table, now),
            ServerStatus::classify("", &table, now),
        ],
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["strategy"], "legacy");
    assert_eq!(json["evaluated_at"], "1970-01-01T00:00:00Z");
    assert_eq!(json["results"][0]["status"], "extended_support");
    assert_eq!(json["results"][0]["indicator"], "ELS");
    assert!(json["results"][0].get("hostname").is_none());
    assert_eq!(json["results"][1]["reason"]["kind"], "empty_descriptor");
    assert!(json["results"][1]["indicator"].is_null());
}
