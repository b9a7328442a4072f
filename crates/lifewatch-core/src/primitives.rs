//! # Innate Primitives
//!
//! Hardcoded policy constants and limits for the lifewatch CORE.
//!
//! These values are compiled into the binary. The ones that encode vendor
//! policy (ELS purchase, the Ubuntu 22.04 end date) mirror decisions that
//! were made once for the inventory and are not fetched from the provider.

/// Whether Extended Lifecycle Support was purchased for RHEL 7.
///
/// Only RHEL 7.9 is affected; RHEL 8 and 9 follow their major-version
/// lifecycle. Overridable at runtime through `ResolverOptions`.
pub const RHEL7_ELS_ENABLED: bool = true;

/// Last RHEL 7 minor release. Every earlier 7.x minor is End of Life.
pub const RHEL7_FINAL_MINOR: u32 = 9;

/// Ubuntu version whose end date is pinned instead of looked up.
pub const UBUNTU_PINNED_VERSION: &str = "22.04";

/// Pinned end date for Ubuntu 22.04 as (year, month, day).
///
/// All phases before this date (standard and ESM) count as Supported.
pub const UBUNTU_PINNED_EOL: (i32, u32, u32) = (2032, 4, 30);

/// Literal marker that selects the `2012-R2` cycle for Windows Server 2012.
pub const WINDOWS_R2_MARKER: &str = "R2";

/// Year the legacy static table was curated in.
pub const LEGACY_REFERENCE_YEAR: i32 = 2025;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of descriptors in a single batch classification.
pub const MAX_BATCH_DESCRIPTORS: usize = 1000;

/// Maximum number of servers in a single inventory document.
pub const MAX_INVENTORY_SERVERS: usize = 10_000;

/// Maximum length of a single OS descriptor accepted at the API boundary.
pub const MAX_DESCRIPTOR_LENGTH: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ubuntu_pinned_eol_is_a_real_date() {
        let (y, m, d) = UBUNTU_PINNED_EOL;
        assert!(chrono::NaiveDate::from_ymd_opt(y, m, d).is_some());
    }

    #[test]
    fn rhel7_final_minor_is_nine() {
        assert_eq!(RHEL7_FINAL_MINOR, 9);
    }
}
