//! # Legacy Status Table
//!
//! Hand-curated descriptor → status verdicts, as of
//! [`LEGACY_REFERENCE_YEAR`](crate::primitives::LEGACY_REFERENCE_YEAR).
//!
//! The verdicts here disagree with the dated resolver for several releases
//! (Ubuntu 20.04 and 22.04, RHEL 8.5-8.7, Windows Server 2016). That is
//! expected: this table froze the vendor phases as seen when it was
//! written, including ESM and ELS phases the resolver folds into Supported.
//! Do not reconcile the two.
//!
//! Lookup is exact on the whole descriptor. A miss on a descriptor that
//! starts with a known family prefix is End of Life; anything else is
//! Unknown.

use crate::identify::detect_family;
use crate::resolver::{LifecycleStrategy, Resolution, UnknownReason};
use crate::{LifecycleStatus, OsFamily, ParsedOs};
use chrono::{DateTime, Utc};

use crate::types::LifecycleStatus::{EndOfLife as Eol, ExtendedSupport as Els, Supported as Sup};

/// Prefixes that make an unlisted descriptor End of Life.
///
/// Broader than the identifier's prefixes: plain `Windows` counts here.
const LEGACY_FAMILY_PREFIXES: [&str; 4] = ["RHEL", "Oracle Linux", "Windows", "Ubuntu"];

static LEGACY_TABLE: &[(&str, LifecycleStatus)] = &[
    // RHEL 9: full support
    ("RHEL 9.0", Sup),
    ("RHEL 9.1", Sup),
    ("RHEL 9.2", Sup),
    ("RHEL 9.3", Sup),
    // RHEL 8: early minors ended, 8.5-8.7 moved to ELS in May 2024
    ("RHEL 8.0", Eol),
    ("RHEL 8.1", Eol),
    ("RHEL 8.2", Eol),
    ("RHEL 8.3", Eol),
    ("RHEL 8.4", Eol),
    ("RHEL 8.5", Els),
    ("RHEL 8.6", Els),
    ("RHEL 8.7", Els),
    ("RHEL 8.8", Sup),
    ("RHEL 8.9", Sup),
    ("RHEL 8.10", Sup),
    // RHEL 7: ELS until June 2028 for 7.9 only
    ("RHEL 7.0", Eol),
    ("RHEL 7.1", Eol),
    ("RHEL 7.2", Eol),
    ("RHEL 7.3", Eol),
    ("RHEL 7.4", Eol),
    ("RHEL 7.5", Eol),
    ("RHEL 7.6", Eol),
    ("RHEL 7.7", Eol),
    ("RHEL 7.8", Eol),
    ("RHEL 7.9", Els),
    // RHEL 6: ELS ended June 2024
    ("RHEL 6.0", Eol),
    ("RHEL 6.1", Eol),
    ("RHEL 6.2", Eol),
    ("RHEL 6.3", Eol),
    ("RHEL 6.4", Eol),
    ("RHEL 6.5", Eol),
    ("RHEL 6.6", Eol),
    ("RHEL 6.7", Eol),
    ("RHEL 6.8", Eol),
    ("RHEL 6.9", Eol),
    ("RHEL 6.10", Eol),
    // Ubuntu: LTS releases past standard support are on ESM
    ("Ubuntu 18.04", Els),
    ("Ubuntu 20.04", Els),
    ("Ubuntu 22.04", Els),
    ("Ubuntu 24.04", Sup),
    ("Ubuntu 24.10", Sup),
    // Oracle Linux
    ("Oracle Linux 7.9", Sup),
    ("Oracle Linux 8.0", Eol),
    ("Oracle Linux 8.1", Eol),
    ("Oracle Linux 8.2", Eol),
    ("Oracle Linux 8.3", Eol),
    ("Oracle Linux 8.4", Eol),
    ("Oracle Linux 8.5", Eol),
    ("Oracle Linux 8.6", Els),
    ("Oracle Linux 8.7", Sup),
    ("Oracle Linux 8.8", Sup),
    ("Oracle Linux 8.9", Sup),
    ("Oracle Linux 9.0", Sup),
    ("Oracle Linux 9.1", Sup),
    ("Oracle Linux 9.2", Sup),
    ("Oracle Linux 9.3", Sup),
    // Windows Server
    ("Windows Server 2012 R2", Eol),
    ("Windows Server 2016", Els),
    ("Windows Server 2019", Sup),
    ("Windows Server 2022", Sup),
];

/// The static descriptor → status strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyStatusTable;

impl LegacyStatusTable {
    /// Create the table.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Status of a descriptor.
    #[must_use]
    pub fn lookup(&self, descriptor: &str) -> LifecycleStatus {
        self.exact(descriptor).unwrap_or_else(|| {
            if LEGACY_FAMILY_PREFIXES
                .iter()
                .any(|prefix| descriptor.starts_with(prefix))
            {
                LifecycleStatus::EndOfLife
            } else {
                LifecycleStatus::Unknown
            }
        })
    }

    /// Status of a descriptor listed verbatim, if it is.
    #[must_use]
    pub fn exact(&self, descriptor: &str) -> Option<LifecycleStatus> {
        LEGACY_TABLE
            .iter()
            .find(|(known, _)| *known == descriptor)
            .map(|(_, status)| *status)
    }

    /// Every listed descriptor of a family, in table order.
    ///
    /// This is what version pickers offer for that family.
    #[must_use]
    pub fn versions(&self, family: OsFamily) -> Vec<(&'static str, LifecycleStatus)> {
        LEGACY_TABLE
            .iter()
            .filter(|(descriptor, _)| detect_family(descriptor) == family)
            .copied()
            .collect()
    }

    /// Every listed descriptor.
    #[must_use]
    pub fn entries(&self) -> &'static [(&'static str, LifecycleStatus)] {
        LEGACY_TABLE
    }
}

impl LifecycleStrategy for LegacyStatusTable {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn resolve_detailed(&self, parsed: &ParsedOs, _now: DateTime<Utc>) -> Resolution {
        let descriptor = parsed.descriptor.as_str();
        if let Some(status) = self.exact(descriptor) {
            return Resolution::matched(status, descriptor);
        }
        match self.lookup(descriptor) {
            LifecycleStatus::Unknown if descriptor.is_empty() => {
                Resolution::unknown(UnknownReason::EmptyDescriptor)
            }
            LifecycleStatus::Unknown => Resolution::unknown(UnknownReason::UnrecognizedFamily),
            status => Resolution::unmatched(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identify;

    #[test]
    fn exact_hits() {
        let table = LegacyStatusTable::new();
        assert_eq!(table.lookup("RHEL 7.9"), LifecycleStatus::ExtendedSupport);
        assert_eq!(table.lookup("RHEL 9.3"), LifecycleStatus::Supported);
        assert_eq!(
            table.lookup("Windows Server 2012 R2"),
            LifecycleStatus::EndOfLife
        );
        assert_eq!(table.lookup("Ubuntu 20.04"), LifecycleStatus::ExtendedSupport);
    }

    #[test]
    fn unlisted_version_of_known_family_is_eol() {
        let table = LegacyStatusTable::new();
        assert_eq!(table.lookup("RHEL 9.4"), LifecycleStatus::EndOfLife);
        assert_eq!(table.lookup("Windows 2003"), LifecycleStatus::EndOfLife);
        assert_eq!(table.lookup("Ubuntu 16.04"), LifecycleStatus::EndOfLife);
    }

    #[test]
    fn unknown_family_is_unknown() {
        let table = LegacyStatusTable::new();
        assert_eq!(table.lookup("Debian 12"), LifecycleStatus::Unknown);
        assert_eq!(table.lookup(""), LifecycleStatus::Unknown);
        assert_eq!(table.lookup("rhel 7.9"), LifecycleStatus::Unknown);
    }

    #[test]
    fn versions_per_family() {
        let table = LegacyStatusTable::new();
        let windows = table.versions(OsFamily::WindowsServer);
        assert_eq!(windows.len(), 4);
        assert_eq!(windows[0], ("Windows Server 2012 R2", LifecycleStatus::EndOfLife));
        assert_eq!(table.versions(OsFamily::Ubuntu).len(), 5);
        assert!(table.versions(OsFamily::Unknown).is_empty());
    }

    #[test]
    fn every_listed_descriptor_is_identifiable() {
        for (descriptor, _) in LegacyStatusTable::new().entries() {
            let parsed = identify(descriptor);
            assert!(parsed.family.is_known(), "{descriptor}");
            assert!(parsed.version.is_some(), "{descriptor}");
        }
    }

    #[test]
    fn strategy_reports_reasons() {
        let table = LegacyStatusTable::new();
        let now = DateTime::UNIX_EPOCH;

        let hit = table.resolve_detailed(&identify("RHEL 8.6"), now);
        assert_eq!(hit.status, LifecycleStatus::ExtendedSupport);
        assert_eq!(hit.matched_cycle.as_deref(), Some("RHEL 8.6"));

        let miss = table.resolve_detailed(&identify("FreeBSD 14"), now);
        assert_eq!(miss.reason, Some(UnknownReason::UnrecognizedFamily));

        let empty = table.resolve_detailed(&identify(""), now);
        assert_eq!(empty.reason, Some(UnknownReason::EmptyDescriptor));
    }
}
