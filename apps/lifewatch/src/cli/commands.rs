//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState, evaluation_instant};
use crate::config::Config;
use crate::service::LifecycleService;
use chrono::NaiveDate;
use lifewatch_core::primitives::LEGACY_REFERENCE_YEAR;
use lifewatch_core::{
    Inventory, InventoryReport, LegacyStatusTable, LifewatchError, OsFamily, PolicyEntry,
    ServerStatus, StatusSummary, present,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum inventory file size (16 MB).
const MAX_INVENTORY_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), LifewatchError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| LifewatchError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(LifewatchError::InvalidInventory(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve a path to an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, LifewatchError> {
    let canonical = path.canonicalize().map_err(|e| {
        LifewatchError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(LifewatchError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read and decode an inventory file.
pub fn load_inventory(path: &Path) -> Result<Inventory, LifewatchError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_INVENTORY_FILE_SIZE)?;
    let bytes = std::fs::read(&path)
        .map_err(|e| LifewatchError::IoError(format!("Cannot read {}: {}", path.display(), e)))?;
    Inventory::from_json(&bytes)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), LifewatchError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| LifewatchError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

// =============================================================================
// TEXT RENDERING
// =============================================================================

/// One line of a status table.
pub fn format_status_line(status: &ServerStatus) -> String {
    let mut detail = String::new();
    if let Some(indicator) = status.indicator {
        detail.push_str(indicator);
    }
    if let Some(cycle) = &status.matched_cycle {
        if !detail.is_empty() {
            detail.push(' ');
        }
        detail.push_str(&format!("(cycle {})", cycle));
    }
    if let Some(reason) = &status.reason {
        detail.push_str(&reason.to_string());
    }

    match &status.hostname {
        Some(hostname) => format!(
            "{:<24} {:<28} {:<18} {}",
            hostname, status.os, status.label, detail
        ),
        None => format!("{:<28} {:<18} {}", status.os, status.label, detail),
    }
    .trim_end()
    .to_string()
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// One line of a policy table.
pub fn format_policy_line(entry: &PolicyEntry) -> String {
    format!(
        "{:<10} {:<12} {:<12} {}",
        entry.cycle,
        format_date(entry.support_end),
        format_date(entry.eol),
        format_date(entry.extended_support_end)
    )
}

fn print_summary(summary: &StatusSummary) {
    println!();
    println!("Servers:          {}", summary.total);
    println!("Supported:        {}", summary.supported);
    println!("Extended Support: {}", summary.extended_support);
    println!("End of Life:      {}", summary.end_of_life);
    println!("Unknown:          {}", summary.unknown);
}

// =============================================================================
// CLASSIFY COMMAND
// =============================================================================

/// Classify descriptors.
pub async fn cmd_classify(
    config: &Config,
    json_mode: bool,
    descriptors: &[String],
    now: Option<&str>,
    legacy: bool,
) -> Result<(), LifewatchError> {
    let now = evaluation_instant(now)?;

    let results: Vec<ServerStatus> = if legacy {
        let table = LegacyStatusTable::new();
        descriptors
            .iter()
            .map(|descriptor| ServerStatus::classify(descriptor, &table, now))
            .collect()
    } else {
        let service = LifecycleService::from_config(config)?;
        service.classify_many(descriptors, now).await
    };

    if json_mode {
        return print_json(&serde_json::json!({
            "evaluated_at": now,
            "strategy": if legacy { "legacy" } else { "dynamic" },
            "results": results,
        }));
    }

    for status in &results {
        println!("{}", format_status_line(status));
    }
    Ok(())
}

// =============================================================================
// INVENTORY COMMAND
// =============================================================================

/// Classify an inventory file.
pub async fn cmd_inventory(
    config: &Config,
    json_mode: bool,
    file: &Path,
    now: Option<&str>,
    legacy: bool,
) -> Result<(), LifewatchError> {
    let inventory = load_inventory(file)?;
    let now = evaluation_instant(now)?;

    let report = if legacy {
        InventoryReport::build(&inventory, &LegacyStatusTable::new(), now)
    } else {
        let service = LifecycleService::from_config(config)?;
        service.classify_inventory(&inventory, now).await
    };

    if json_mode {
        return print_json(&report);
    }

    println!("lifewatch Inventory Report");
    println!("==========================");
    println!("Evaluated at: {}", report.evaluated_at.format("%Y-%m-%d %H:%M UTC"));
    println!("Strategy:     {}", report.strategy);
    println!();
    for status in &report.servers {
        println!("{}", format_status_line(status));
    }
    print_summary(&report.summary);
    Ok(())
}

// =============================================================================
// POLICY COMMAND
// =============================================================================

/// Show the fetched lifecycle dates of a family.
pub async fn cmd_policy(
    config: &Config,
    json_mode: bool,
    family: OsFamily,
) -> Result<(), LifewatchError> {
    let service = LifecycleService::from_config(config)?;
    let entries = service.policy(family).await?;

    if json_mode {
        return print_json(&entries);
    }

    println!("{} lifecycle ({} cycles)", family.display_name(), entries.len());
    println!(
        "{:<10} {:<12} {:<12} {}",
        "Cycle", "Support", "EOL", "Extended"
    );
    for entry in &entries {
        println!("{}", format_policy_line(entry));
    }
    Ok(())
}

// =============================================================================
// LEGACY COMMAND
// =============================================================================

/// List the static status table.
pub fn cmd_legacy(json_mode: bool, family: Option<OsFamily>) -> Result<(), LifewatchError> {
    let table = LegacyStatusTable::new();
    let families: Vec<OsFamily> = match family {
        Some(family) => vec![family],
        None => OsFamily::KNOWN.to_vec(),
    };

    if json_mode {
        let listing: serde_json::Map<String, serde_json::Value> = families
            .iter()
            .map(|family| {
                let versions: Vec<serde_json::Value> = table
                    .versions(*family)
                    .into_iter()
                    .map(|(descriptor, status)| {
                        serde_json::json!({
                            "os": descriptor,
                            "code": status.code(),
                            "label": present(status).label,
                        })
                    })
                    .collect();
                (family.product_key().to_string(), serde_json::Value::from(versions))
            })
            .collect();
        return print_json(&listing);
    }

    println!("Static status table (curated {})", LEGACY_REFERENCE_YEAR);
    for family in families {
        println!();
        println!("{}", family.display_name());
        for (descriptor, status) in table.versions(family) {
            println!("  {:<28} {}", descriptor, present(status).label);
        }
    }
    Ok(())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &Config, host: &str, port: u16) -> Result<(), LifewatchError> {
    let service = LifecycleService::from_config(config)?;

    println!("lifewatch Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Provider: {}", config.provider.url_template);
    match service.store().ttl().await {
        Some(ttl) => println!("  Cache:    {}s TTL", ttl.num_seconds()),
        None => println!("  Cache:    process lifetime"),
    }
    let els = if service.options().rhel7_els_enabled {
        "enabled"
    } else {
        "disabled"
    };
    println!("  RHEL 7 ELS: {}", els);
    println!();
    println!("Endpoints:");
    println!("  GET  /health                   - Health check");
    println!("  GET  /api/lifecycle/{{family}}   - Lifecycle dates of a family");
    println!("  GET  /api/status?os=...        - Classify one descriptor");
    println!("  POST /api/classify             - Classify a batch");
    println!("  POST /api/inventory            - Classify an inventory");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::new(service).with_cors_origins(config.server.cors_origins.clone());
    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifewatch_core::{LifecycleStatus, Resolution};

    #[test]
    fn status_lines() {
        let table = LegacyStatusTable::new();
        let status = ServerStatus::classify("RHEL 7.9", &table, chrono::DateTime::UNIX_EPOCH);
        let line = format_status_line(&status);
        assert!(line.starts_with("RHEL 7.9"));
        assert!(line.contains("Extended Support"));
        assert!(line.contains("ELS"));

        let unknown = ServerStatus::classify("Plan 9", &table, chrono::DateTime::UNIX_EPOCH);
        assert!(format_status_line(&unknown).ends_with("unrecognized OS family"));
        assert_eq!(unknown.status, LifecycleStatus::Unknown);
    }

    #[test]
    fn status_line_with_hostname() {
        let status = ServerStatus::new(
            Some("web-01".to_string()),
            "Ubuntu 24.04",
            Resolution {
                status: LifecycleStatus::Supported,
                matched_cycle: Some("24.04".to_string()),
                reason: None,
            },
        );
        let line = format_status_line(&status);
        assert!(line.starts_with("web-01"));
        assert!(line.ends_with("(cycle 24.04)"));
    }

    #[test]
    fn policy_lines() {
        let entry = PolicyEntry::new("8")
            .with_eol(NaiveDate::from_ymd_opt(2029, 5, 31).expect("date"));
        assert_eq!(
            format_policy_line(&entry),
            "8          -            2029-05-31   -"
        );
    }

    #[test]
    fn inventory_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("servers.json");
        std::fs::write(
            &path,
            r#"{"servers": [{"hostname": "a", "os": "RHEL 9.2"}]}"#,
        )
        .expect("write");
        let inventory = load_inventory(&path).expect("load");
        assert_eq!(inventory.servers.len(), 1);

        assert!(load_inventory(&dir.path().join("missing.json")).is_err());
        assert!(load_inventory(dir.path()).is_err());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "not json").expect("write");
        assert!(matches!(
            load_inventory(&broken),
            Err(LifewatchError::InvalidInventory(_))
        ));
    }
}
