//! # Classification Tier Tests (C0-C3)
//!
//! If ANY tier fails, lifecycle verdicts cannot be trusted.
//!
//! ## Tiers
//! - C0: Identification
//! - C1: Dated resolution per family
//! - C2: Legacy table
//! - C3: Provider payload to report

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use lifewatch_core::{
    Inventory, InventoryReport, LegacyStatusTable, LifecycleResolver, LifecycleStatus,
    LifecycleStrategy, OsFamily, PolicyCache, ResolverOptions, UnknownReason,
    decode_policy_payload, identify,
};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 1)
        .single()
        .expect("timestamp")
}

const RHEL_PAYLOAD: &[u8] = br#"[
    {"cycle": "9", "support": "2027-05-31", "eol": "2032-05-31", "extendedSupport": "2035-05-31"},
    {"cycle": "8", "support": "2024-05-31", "eol": "2029-05-31", "extendedSupport": "2032-05-31"},
    {"cycle": "7", "support": "2019-08-06", "eol": "2024-06-30", "extendedSupport": "2028-06-30"},
    {"cycle": "6", "support": "2016-05-10", "eol": "2020-11-30", "extendedSupport": "2024-06-30"}
]"#;

const WINDOWS_PAYLOAD: &[u8] = br#"[
    {"cycle": "2022", "support": "2026-10-13", "eol": "2031-10-14", "extendedSupport": false},
    {"cycle": "2019", "support": "2024-01-09", "eol": "2029-01-09", "extendedSupport": false},
    {"cycle": "2016", "support": "2022-01-11", "eol": "2027-01-12", "extendedSupport": false},
    {"cycle": "2012-R2", "support": "2018-10-09", "eol": "2023-10-10", "extendedSupport": "2026-10-13"},
    {"cycle": "2012", "support": "2018-10-09", "eol": "2023-10-10", "extendedSupport": "2026-10-13"}
]"#;

const UBUNTU_PAYLOAD: &[u8] = br#"[
    {"cycle": "24.04", "eol": "2029-05-31", "extendedSupport": "2036-04-25"},
    {"cycle": "22.04", "eol": "2027-06-01", "extendedSupport": "2032-04-09"},
    {"cycle": "20.04", "eol": "2025-05-29", "extendedSupport": "2030-04-02"}
]"#;

const ORACLE_PAYLOAD: &[u8] = br#"[
    {"cycle": "9", "eol": "2032-06-30"},
    {"cycle": "8", "eol": "2029-07-01"},
    {"cycle": "7", "eol": "2024-12-01", "extendedSupport": "2028-06-01"}
]"#;

fn loaded_cache() -> PolicyCache {
    let mut cache = PolicyCache::new();
    let fetched = at(2025, 1, 1);
    for (family, payload) in [
        (OsFamily::Rhel, RHEL_PAYLOAD),
        (OsFamily::WindowsServer, WINDOWS_PAYLOAD),
        (OsFamily::Ubuntu, UBUNTU_PAYLOAD),
        (OsFamily::OracleLinux, ORACLE_PAYLOAD),
    ] {
        cache.insert(family, decode_policy_payload(payload).expect("payload"), fetched);
    }
    cache
}

// =============================================================================
// TIER C0: IDENTIFICATION
// =============================================================================

mod c0_identification {
    use super::*;

    /// C0.1: RHEL descriptors keep major and minor.
    #[test]
    fn rhel_descriptor() {
        let parsed = identify("RHEL 7.9");
        assert_eq!(parsed.family, OsFamily::Rhel);
        assert_eq!(parsed.version.as_deref(), Some("7.9"));
    }

    /// C0.2: Windows R2 is not folded into the version.
    #[test]
    fn windows_r2_descriptor() {
        let parsed = identify("Windows Server 2012 R2");
        assert_eq!(parsed.family, OsFamily::WindowsServer);
        assert_eq!(parsed.version.as_deref(), Some("2012"));
        assert_eq!(parsed.descriptor, "Windows Server 2012 R2");
    }

    /// C0.3: Unrecognized and empty descriptors carry no version.
    #[test]
    fn unrecognized_descriptor() {
        for descriptor in ["", "Debian 12", "rhel 7.9", "CentOS 7"] {
            let parsed = identify(descriptor);
            assert_eq!(parsed.family, OsFamily::Unknown, "{descriptor}");
            assert!(parsed.version.is_none(), "{descriptor}");
        }
    }
}

// =============================================================================
// TIER C1: DATED RESOLUTION
// =============================================================================

mod c1_dated_resolution {
    use super::*;

    fn status(descriptor: &str, now: DateTime<Utc>) -> LifecycleStatus {
        let cache = loaded_cache();
        LifecycleResolver::new(&cache).resolve(&identify(descriptor), now)
    }

    /// C1.1: RHEL 7.8 is End of Life regardless of dates.
    #[test]
    fn rhel78_always_eol() {
        assert_eq!(status("RHEL 7.8", at(2010, 1, 1)), LifecycleStatus::EndOfLife);
        assert_eq!(status("RHEL 7.8", at(2026, 1, 1)), LifecycleStatus::EndOfLife);
    }

    /// C1.2: RHEL 7.9 walks Supported, Extended, End of Life.
    #[test]
    fn rhel79_timeline() {
        assert_eq!(status("RHEL 7.9", at(2024, 6, 1)), LifecycleStatus::Supported);
        assert_eq!(
            status("RHEL 7.9", at(2026, 6, 1)),
            LifecycleStatus::ExtendedSupport
        );
        assert_eq!(status("RHEL 7.9", at(2028, 7, 1)), LifecycleStatus::EndOfLife);

        let cache = loaded_cache();
        let no_els = LifecycleResolver::new(&cache).with_options(ResolverOptions {
            rhel7_els_enabled: false,
        });
        assert_eq!(
            no_els.resolve(&identify("RHEL 7.9"), at(2026, 6, 1)),
            LifecycleStatus::EndOfLife
        );
    }

    /// C1.3: Comparisons are strict against midnight UTC.
    #[test]
    fn boundary_is_strict() {
        let midnight = Utc
            .with_ymd_and_hms(2029, 5, 31, 0, 0, 0)
            .single()
            .expect("timestamp");
        assert_eq!(status("RHEL 8.4", midnight), LifecycleStatus::Supported);
        assert_eq!(
            status("RHEL 8.4", midnight + TimeDelta::seconds(1)),
            LifecycleStatus::EndOfLife
        );
    }

    /// C1.4: Ubuntu 22.04 ignores fetched data.
    #[test]
    fn ubuntu_2204_pinned() {
        assert_eq!(status("Ubuntu 22.04", at(2030, 1, 1)), LifecycleStatus::Supported);
        assert_eq!(status("Ubuntu 22.04", at(2033, 1, 1)), LifecycleStatus::EndOfLife);
        assert_eq!(status("Ubuntu 20.04", at(2026, 1, 1)), LifecycleStatus::EndOfLife);
    }

    /// C1.5: Windows 2012 R2 picks the R2 cycle.
    #[test]
    fn windows_2012_r2() {
        let cache = loaded_cache();
        let r = LifecycleResolver::new(&cache)
            .resolve_detailed(&identify("Windows Server 2012 R2"), at(2025, 1, 1));
        assert_eq!(r.matched_cycle.as_deref(), Some("2012-R2"));
        assert_eq!(r.status, LifecycleStatus::EndOfLife);
        assert_eq!(
            status("Windows Server 2019", at(2025, 1, 1)),
            LifecycleStatus::Supported
        );
    }

    /// C1.6: Oracle Linux needs a cycle equal to the version or below it.
    #[test]
    fn oracle_linux_without_minor_cycles() {
        assert_eq!(status("Oracle Linux 7.9", at(2025, 1, 1)), LifecycleStatus::Unknown);
        assert_eq!(status("Oracle Linux 9.3", at(2025, 1, 1)), LifecycleStatus::Unknown);
    }

    /// C1.7: A family missing from the cache is Unknown for every version.
    #[test]
    fn missing_family_is_unknown() {
        let mut cache = loaded_cache();
        cache.invalidate(OsFamily::Ubuntu);
        let r = LifecycleResolver::new(&cache)
            .resolve_detailed(&identify("Ubuntu 22.04"), at(2030, 1, 1));
        assert_eq!(r.status, LifecycleStatus::Unknown);
        assert_eq!(
            r.reason,
            Some(UnknownReason::PolicyUnavailable {
                family: OsFamily::Ubuntu
            })
        );
    }
}

// =============================================================================
// TIER C2: LEGACY TABLE
// =============================================================================

mod c2_legacy_table {
    use super::*;

    /// C2.1: Exact hits use the curated verdict.
    #[test]
    fn exact_hits() {
        let table = LegacyStatusTable::new();
        assert_eq!(table.lookup("RHEL 8.5"), LifecycleStatus::ExtendedSupport);
        assert_eq!(table.lookup("Oracle Linux 9.3"), LifecycleStatus::Supported);
    }

    /// C2.2: Known prefix without an entry is End of Life.
    #[test]
    fn prefix_default() {
        let table = LegacyStatusTable::new();
        assert_eq!(table.lookup("Oracle Linux 6.10"), LifecycleStatus::EndOfLife);
        assert_eq!(table.lookup("Windows 2000"), LifecycleStatus::EndOfLife);
        assert_eq!(table.lookup("SUSE 15"), LifecycleStatus::Unknown);
    }

    /// C2.3: The two strategies are allowed to disagree.
    #[test]
    fn strategies_disagree_on_ubuntu_2204() {
        let cache = loaded_cache();
        let parsed = identify("Ubuntu 22.04");
        let now = at(2025, 6, 1);
        assert_eq!(
            LifecycleResolver::new(&cache).resolve(&parsed, now),
            LifecycleStatus::Supported
        );
        assert_eq!(
            LegacyStatusTable::new().resolve(&parsed, now),
            LifecycleStatus::ExtendedSupport
        );
    }
}

// =============================================================================
// TIER C3: PAYLOAD TO REPORT
// =============================================================================

mod c3_report {
    use super::*;

    /// C3.1: A whole inventory classifies against decoded payloads.
    #[test]
    fn inventory_report() {
        let inventory = Inventory::from_json(
            br#"{"servers": [
                {"hostname": "web-02", "os": "Ubuntu 24.04"},
                {"hostname": "DB-01", "os": "RHEL 7.9"},
                {"hostname": "legacy", "os": "Windows Server 2012 R2"},
                {"hostname": "mystery", "os": "Plan 9"}
            ]}"#,
        )
        .expect("inventory");
        let cache = loaded_cache();
        let report =
            InventoryReport::build(&inventory, &LifecycleResolver::new(&cache), at(2026, 1, 1));

        let order: Vec<_> = report
            .servers
            .iter()
            .filter_map(|s| s.hostname.as_deref())
            .collect();
        assert_eq!(order, vec!["DB-01", "legacy", "mystery", "web-02"]);

        assert_eq!(report.strategy, "dynamic");
        assert_eq!(report.servers[0].status, LifecycleStatus::ExtendedSupport);
        assert_eq!(report.servers[1].status, LifecycleStatus::EndOfLife);
        assert_eq!(
            report.servers[2].reason,
            Some(UnknownReason::UnrecognizedFamily)
        );
        assert_eq!(report.summary.supported, 1);
        assert_eq!(report.summary.needing_attention(), 2);
    }
}
