//! # Inventory Report
//!
//! Classifies every server of an inventory document:
//!
//! ```json
//! { "servers": [ { "hostname": "web-01", "os": "RHEL 7.9" } ] }
//! ```
//!
//! Other fields of a record are ignored. Records come out sorted by hostname,
//! case-insensitively, with a per-status summary.

use crate::primitives::{MAX_DESCRIPTOR_LENGTH, MAX_INVENTORY_SERVERS};
use crate::{
    LifecycleStatus, LifecycleStrategy, LifewatchError, OsFamily, Resolution, UnknownReason,
    identify, present,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;

// =============================================================================
// INPUT
// =============================================================================

/// One server of an inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Host name.
    #[serde(default)]
    pub hostname: Option<String>,
    /// OS descriptor, e.g. `"Ubuntu 24.04"`.
    #[serde(default)]
    pub os: Option<String>,
}

impl ServerRecord {
    /// Create a record.
    #[must_use]
    pub fn new(hostname: impl Into<String>, os: impl Into<String>) -> Self {
        Self {
            hostname: Some(hostname.into()),
            os: Some(os.into()),
        }
    }

    /// The descriptor, empty when missing.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        self.os.as_deref().unwrap_or_default()
    }

    fn sort_key(&self) -> String {
        self.hostname.as_deref().unwrap_or_default().to_lowercase()
    }
}

/// An inventory document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Servers, in document order.
    #[serde(default)]
    pub servers: Vec<ServerRecord>,
}

impl Inventory {
    /// Create an inventory from records.
    #[must_use]
    pub fn new(servers: Vec<ServerRecord>) -> Self {
        Self { servers }
    }

    /// Decode and validate an inventory document.
    ///
    /// The document and every server record must be JSON objects.
    pub fn from_json(bytes: &[u8]) -> Result<Self, LifewatchError> {
        let invalid = |e: serde_json::Error| LifewatchError::InvalidInventory(e.to_string());
        let document: serde_json::Value = serde_json::from_slice(bytes).map_err(invalid)?;
        let Some(fields) = document.as_object() else {
            return Err(LifewatchError::InvalidInventory(
                "inventory is not a JSON object".to_string(),
            ));
        };
        let misshapen = match fields.get("servers") {
            Some(serde_json::Value::Array(servers)) => {
                servers.iter().position(|server| !server.is_object())
            }
            _ => None,
        };
        if let Some(index) = misshapen {
            return Err(LifewatchError::InvalidInventory(format!(
                "server record {} is not a JSON object",
                index
            )));
        }

        let inventory: Inventory = serde_json::from_value(document).map_err(invalid)?;
        inventory.validate()?;
        Ok(inventory)
    }

    /// Check size limits.
    pub fn validate(&self) -> Result<(), LifewatchError> {
        if self.servers.len() > MAX_INVENTORY_SERVERS {
            return Err(LifewatchError::InvalidInventory(format!(
                "{} servers exceeds the limit of {}",
                self.servers.len(),
                MAX_INVENTORY_SERVERS
            )));
        }
        if let Some(record) = self
            .servers
            .iter()
            .find(|record| record.descriptor().len() > MAX_DESCRIPTOR_LENGTH)
        {
            return Err(LifewatchError::InvalidInventory(format!(
                "OS descriptor of {} is longer than {} bytes",
                record.hostname.as_deref().unwrap_or("<unnamed>"),
                MAX_DESCRIPTOR_LENGTH
            )));
        }
        Ok(())
    }

    /// Records sorted by hostname, case-insensitively. Stable for equal names.
    #[must_use]
    pub fn sorted(&self) -> Vec<&ServerRecord> {
        let mut records: Vec<&ServerRecord> = self.servers.iter().collect();
        records.sort_by_cached_key(|record| record.sort_key());
        records
    }

    /// Distinct families that need policy data to classify this inventory.
    ///
    /// Only descriptors that parse fully are counted.
    #[must_use]
    pub fn families(&self) -> BTreeSet<OsFamily> {
        self.servers
            .iter()
            .map(|record| identify(record.descriptor()))
            .filter(|parsed| parsed.parse_failure().is_none())
            .map(|parsed| parsed.family)
            .collect()
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

fn serialize_status_name<S: Serializer>(
    status: &LifecycleStatus,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(status.name())
}

/// Classification of one server (or one bare descriptor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    /// Host name, when classifying an inventory record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// The OS descriptor as given.
    pub os: String,
    /// Status, serialized by name.
    #[serde(serialize_with = "serialize_status_name")]
    pub status: LifecycleStatus,
    /// Numeric status code.
    pub code: i8,
    /// Display label.
    pub label: &'static str,
    /// CSS class of the status tag.
    pub style_class: &'static str,
    /// Attention badge.
    pub indicator: Option<&'static str>,
    /// Provider cycle or legacy descriptor the verdict came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_cycle: Option<String>,
    /// Cause of an `Unknown`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnknownReason>,
}

impl ServerStatus {
    /// Build from a resolution.
    #[must_use]
    pub fn new(hostname: Option<String>, os: impl Into<String>, resolution: Resolution) -> Self {
        let presentation = present(resolution.status);
        Self {
            hostname,
            os: os.into(),
            status: resolution.status,
            code: resolution.status.code(),
            label: presentation.label,
            style_class: presentation.style_class,
            indicator: presentation.indicator,
            matched_cycle: resolution.matched_cycle,
            reason: resolution.reason,
        }
    }

    /// Classify a bare descriptor with a strategy.
    #[must_use]
    pub fn classify(
        descriptor: &str,
        strategy: &dyn LifecycleStrategy,
        now: DateTime<Utc>,
    ) -> Self {
        let resolution = strategy.resolve_detailed(&identify(descriptor), now);
        Self::new(None, descriptor, resolution)
    }
}

/// Server count per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: usize,
    pub supported: usize,
    pub extended_support: usize,
    pub end_of_life: usize,
    pub unknown: usize,
}

impl StatusSummary {
    /// Count one more server.
    pub fn record(&mut self, status: LifecycleStatus) {
        self.total += 1;
        match status {
            LifecycleStatus::Supported => self.supported += 1,
            LifecycleStatus::ExtendedSupport => self.extended_support += 1,
            LifecycleStatus::EndOfLife => self.end_of_life += 1,
            LifecycleStatus::Unknown => self.unknown += 1,
        }
    }

    /// Servers with a given status.
    #[must_use]
    pub fn count(&self, status: LifecycleStatus) -> usize {
        match status {
            LifecycleStatus::Supported => self.supported,
            LifecycleStatus::ExtendedSupport => self.extended_support,
            LifecycleStatus::EndOfLife => self.end_of_life,
            LifecycleStatus::Unknown => self.unknown,
        }
    }

    /// Servers that need action (extended support or end of life).
    #[must_use]
    pub fn needing_attention(&self) -> usize {
        self.extended_support + self.end_of_life
    }
}

/// Classified inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryReport {
    /// Instant the classification was made for.
    pub evaluated_at: DateTime<Utc>,
    /// Strategy name (`dynamic` or `legacy`).
    pub strategy: &'static str,
    /// One status per server, sorted by hostname.
    pub servers: Vec<ServerStatus>,
    /// Counts per status.
    pub summary: StatusSummary,
}

impl InventoryReport {
    /// Classify every server of an inventory.
    #[must_use]
    pub fn build(
        inventory: &Inventory,
        strategy: &dyn LifecycleStrategy,
        now: DateTime<Utc>,
    ) -> Self {
        let mut summary = StatusSummary::default();
        let servers = inventory
            .sorted()
            .into_iter()
            .map(|record| {
                let resolution = strategy.resolve_detailed(&identify(record.descriptor()), now);
                summary.record(resolution.status);
                ServerStatus::new(record.hostname.clone(), record.descriptor(), resolution)
            })
            .collect();

        Self {
            evaluated_at: now,
            strategy: strategy.name(),
            servers,
            summary,
        }
    }
}
