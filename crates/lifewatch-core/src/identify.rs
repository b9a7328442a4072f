//! # OS Identifier
//!
//! Reduces a free-text descriptor to `(family, version)`.
//!
//! Detection is table driven: each row holds a family, the case-sensitive
//! prefix that selects it, and the pattern its version is extracted with.
//! Rows are tried in order and the first prefix match wins; its pattern is
//! then searched anywhere in the descriptor and every capture group is
//! joined with `.` to form the version. Adding a family is adding a row.

use crate::{OsFamily, ParsedOs};
use regex::Regex;
use std::sync::LazyLock;

/// One row of the detection table.
struct FamilyRule {
    family: OsFamily,
    prefix: &'static str,
    version: LazyLock<Option<Regex>>,
}

impl FamilyRule {
    fn extract_version(&self, descriptor: &str) -> Option<String> {
        let pattern = self.version.as_ref()?;
        let captures = pattern.captures(descriptor)?;
        let parts: Vec<&str> = captures
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str())
            .collect();
        (!parts.is_empty()).then(|| parts.join("."))
    }
}

/// Detection table, in priority order.
///
/// Windows Server's optional ` R2` is matched but not captured: the version
/// stays the year and the resolver inspects the descriptor for the marker.
static FAMILY_RULES: [FamilyRule; 4] = [
    FamilyRule {
        family: OsFamily::Rhel,
        prefix: "RHEL",
        version: LazyLock::new(|| Regex::new(r"RHEL (\d+)\.(\d+)").ok()),
    },
    FamilyRule {
        family: OsFamily::WindowsServer,
        prefix: "Windows Server",
        version: LazyLock::new(|| Regex::new(r"Windows Server (\d+)(?: R2)?").ok()),
    },
    FamilyRule {
        family: OsFamily::Ubuntu,
        prefix: "Ubuntu",
        version: LazyLock::new(|| Regex::new(r"Ubuntu (\d+\.\d+)").ok()),
    },
    FamilyRule {
        family: OsFamily::OracleLinux,
        prefix: "Oracle Linux",
        version: LazyLock::new(|| Regex::new(r"Oracle Linux (\d+\.\d+)").ok()),
    },
];

fn rule_for(descriptor: &str) -> Option<&'static FamilyRule> {
    FAMILY_RULES
        .iter()
        .find(|rule| descriptor.starts_with(rule.prefix))
}

/// Detect the family of a descriptor by prefix.
#[must_use]
pub fn detect_family(descriptor: &str) -> OsFamily {
    rule_for(descriptor).map_or(OsFamily::Unknown, |rule| rule.family)
}

/// Parse a descriptor into family and version.
///
/// Never fails: an empty or unrecognised descriptor yields
/// `OsFamily::Unknown` with no version, and a recognised family whose
/// version pattern does not match yields `version = None`.
#[must_use]
pub fn identify(descriptor: &str) -> ParsedOs {
    if descriptor.is_empty() {
        return ParsedOs::unknown(descriptor);
    }

    match rule_for(descriptor) {
        Some(rule) => ParsedOs {
            family: rule.family,
            version: rule.extract_version(descriptor),
            descriptor: descriptor.to_string(),
        },
        None => ParsedOs::unknown(descriptor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseFailure;

    #[test]
    fn every_pattern_compiles() {
        for rule in &FAMILY_RULES {
            assert!(rule.version.is_some(), "pattern for {} failed", rule.family);
        }
    }

    #[test]
    fn rhel() {
        let parsed = identify("RHEL 7.9");
        assert_eq!(parsed.family, OsFamily::Rhel);
        assert_eq!(parsed.version.as_deref(), Some("7.9"));
    }

    #[test]
    fn rhel_double_digit_minor() {
        assert_eq!(identify("RHEL 8.10").version.as_deref(), Some("8.10"));
    }

    #[test]
    fn windows_server_r2_keeps_year_only() {
        let parsed = identify("Windows Server 2012 R2");
        assert_eq!(parsed.family, OsFamily::WindowsServer);
        assert_eq!(parsed.version.as_deref(), Some("2012"));
        assert_eq!(parsed.descriptor, "Windows Server 2012 R2");
    }

    #[test]
    fn ubuntu_and_oracle() {
        let ubuntu = identify("Ubuntu 22.04");
        assert_eq!(ubuntu.family, OsFamily::Ubuntu);
        assert_eq!(ubuntu.version.as_deref(), Some("22.04"));

        let oracle = identify("Oracle Linux 8.7");
        assert_eq!(oracle.family, OsFamily::OracleLinux);
        assert_eq!(oracle.version.as_deref(), Some("8.7"));
    }

    #[test]
    fn trailing_text_is_ignored() {
        assert_eq!(
            identify("Ubuntu 20.04 LTS (Focal)").version.as_deref(),
            Some("20.04")
        );
    }

    #[test]
    fn recognised_family_without_version() {
        let parsed = identify("RHEL 8");
        assert_eq!(parsed.family, OsFamily::Rhel);
        assert_eq!(parsed.version, None);
        assert_eq!(
            parsed.parse_failure(),
            Some(ParseFailure::UnparsableVersion)
        );
    }

    #[test]
    fn detection_is_case_sensitive() {
        assert_eq!(identify("rhel 7.9").family, OsFamily::Unknown);
        assert_eq!(identify("ubuntu 22.04").family, OsFamily::Unknown);
    }

    #[test]
    fn plain_windows_is_not_windows_server() {
        assert_eq!(detect_family("Windows 10"), OsFamily::Unknown);
    }

    #[test]
    fn empty_descriptor() {
        let parsed = identify("");
        assert_eq!(parsed.family, OsFamily::Unknown);
        assert_eq!(parsed.version, None);
        assert_eq!(parsed.parse_failure(), Some(ParseFailure::EmptyDescriptor));
    }

    #[test]
    fn unknown_family() {
        let parsed = identify("Debian 12");
        assert_eq!(parsed.family, OsFamily::Unknown);
        assert_eq!(parsed.version, None);
    }
}
