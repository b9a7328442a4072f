//! # Lifecycle Resolver
//!
//! Turns a [`ParsedOs`] into a [`LifecycleStatus`] at a given instant.
//!
//! Two strategies implement [`LifecycleStrategy`]:
//!
//! | Strategy | Source | Role |
//! |----------|--------|------|
//! | [`LifecycleResolver`] | [`PolicyCache`] dates + family rules | canonical |
//! | [`LegacyStatusTable`](crate::LegacyStatusTable) | hardcoded verdicts | fallback |
//!
//! ## Dated rules
//!
//! Evaluated in this order; the first that applies decides:
//!
//! 1. Unparsed descriptor → Unknown
//! 2. Family not in the cache → Unknown
//! 3. Family rule (no matching cycle → Unknown):
//!
//! | Family | Cycle match | Verdict |
//! |--------|-------------|---------|
//! | Windows Server | first of `2012` / `2012-R2` (descriptor has `R2`), or `2016`, `2019`, `2022` | past EOL → EOL; past extended → Extended; else Supported |
//! | RHEL | `cycle == major` | 7.0-7.8 → EOL; 7.9 past EOL → Extended while ELS runs, else EOL; 8/9 past EOL → EOL; others past a set EOL → EOL |
//! | Ubuntu | 22.04 pinned; else `cycle == version` | past EOL → EOL, else Supported |
//! | Oracle Linux | `cycle == version` or `cycle` starts with `version.` | past EOL → EOL, else Supported |
//!
//! Mainstream, maintenance and security phases are all Supported.
//! For RHEL 7.9, 8 and 9 an undefined EOL counts as passed.

use crate::dates::{before, midnight_utc, past, past_or_undefined};
use crate::primitives::{
    RHEL7_ELS_ENABLED, RHEL7_FINAL_MINOR, UBUNTU_PINNED_EOL, UBUNTU_PINNED_VERSION,
    WINDOWS_R2_MARKER,
};
use crate::{LifecycleStatus, OsFamily, ParseFailure, ParsedOs, PolicyCache, PolicyEntry};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// OPTIONS
// =============================================================================

/// Runtime switches for the dated rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    /// Extended Lifecycle Support purchased for RHEL 7.9.
    pub rhel7_els_enabled: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            rhel7_els_enabled: RHEL7_ELS_ENABLED,
        }
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Why a resolution ended in `Unknown`.
///
/// The public status collapses every failure into `Unknown`; this keeps the
/// cause for logs and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnknownReason {
    /// The descriptor was empty.
    EmptyDescriptor,
    /// No family prefix matched.
    UnrecognizedFamily,
    /// The family matched but the version did not parse.
    UnparsableVersion,
    /// A RHEL version without a minor component.
    MissingMinorVersion,
    /// No policy data for the family (never fetched, fetch failed, expired).
    PolicyUnavailable { family: OsFamily },
    /// Policy data exists but no cycle matches the version.
    NoMatchingCycle { family: OsFamily, version: String },
}

impl From<ParseFailure> for UnknownReason {
    fn from(failure: ParseFailure) -> Self {
        match failure {
            ParseFailure::EmptyDescriptor => UnknownReason::EmptyDescriptor,
            ParseFailure::UnrecognizedFamily => UnknownReason::UnrecognizedFamily,
            ParseFailure::UnparsableVersion => UnknownReason::UnparsableVersion,
        }
    }
}

impl fmt::Display for UnknownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownReason::EmptyDescriptor => write!(f, "empty OS descriptor"),
            UnknownReason::UnrecognizedFamily => write!(f, "unrecognized OS family"),
            UnknownReason::UnparsableVersion => write!(f, "version could not be parsed"),
            UnknownReason::MissingMinorVersion => write!(f, "minor version missing"),
            UnknownReason::PolicyUnavailable { family } => {
                write!(f, "no lifecycle data available for {}", family)
            }
            UnknownReason::NoMatchingCycle { family, version } => {
                write!(f, "no {} cycle matches version {}", family, version)
            }
        }
    }
}

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The status.
    pub status: LifecycleStatus,
    /// Cycle (or legacy descriptor) the verdict came from, if any.
    pub matched_cycle: Option<String>,
    /// Cause, when `status` is `Unknown`.
    pub reason: Option<UnknownReason>,
}

impl Resolution {
    pub(crate) fn matched(status: LifecycleStatus, cycle: &str) -> Self {
        Self {
            status,
            matched_cycle: Some(cycle.to_string()),
            reason: None,
        }
    }

    pub(crate) fn unmatched(status: LifecycleStatus) -> Self {
        Self {
            status,
            matched_cycle: None,
            reason: None,
        }
    }

    pub(crate) fn unknown(reason: UnknownReason) -> Self {
        Self {
            status: LifecycleStatus::Unknown,
            matched_cycle: None,
            reason: Some(reason),
        }
    }
}

// =============================================================================
// STRATEGY TRAIT
// =============================================================================

/// A way of deciding the lifecycle status of a parsed descriptor.
///
/// Implementations never fail and never mutate themselves: the same
/// `(parsed, now)` against the same state gives the same answer.
pub trait LifecycleStrategy {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Resolve with the cause of an `Unknown` kept.
    fn resolve_detailed(&self, parsed: &ParsedOs, now: DateTime<Utc>) -> Resolution;

    /// Resolve to a bare status.
    fn resolve(&self, parsed: &ParsedOs, now: DateTime<Utc>) -> LifecycleStatus {
        self.resolve_detailed(parsed, now).status
    }
}

// =============================================================================
// DATED RESOLVER
// =============================================================================

/// The canonical strategy: family rules over cached policy dates.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleResolver<'a> {
    cache: &'a PolicyCache,
    options: ResolverOptions,
}

impl<'a> LifecycleResolver<'a> {
    /// Create a resolver over a cache with default options.
    #[must_use]
    pub fn new(cache: &'a PolicyCache) -> Self {
        Self {
            cache,
            options: ResolverOptions::default(),
        }
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }
}

impl LifecycleStrategy for LifecycleResolver<'_> {
    fn name(&self) -> &'static str {
        "dynamic"
    }

    fn resolve_detailed(&self, parsed: &ParsedOs, now: DateTime<Utc>) -> Resolution {
        if let Some(failure) = parsed.parse_failure() {
            return Resolution::unknown(failure.into());
        }
        let Some(version) = parsed.version.as_deref() else {
            return Resolution::unknown(UnknownReason::UnparsableVersion);
        };
        let Some(entries) = self.cache.get(parsed.family) else {
            return Resolution::unknown(UnknownReason::PolicyUnavailable {
                family: parsed.family,
            });
        };

        match parsed.family {
            OsFamily::WindowsServer => resolve_windows(entries, parsed, version, now),
            OsFamily::Rhel => resolve_rhel(entries, parsed, now, self.options),
            OsFamily::Ubuntu => resolve_ubuntu(entries, version, now),
            OsFamily::OracleLinux => resolve_oracle_linux(entries, version, now),
            OsFamily::Unknown => Resolution::unknown(UnknownReason::UnrecognizedFamily),
        }
    }
}

fn no_match(family: OsFamily, version: &str) -> Resolution {
    Resolution::unknown(UnknownReason::NoMatchingCycle {
        family,
        version: version.to_string(),
    })
}

fn find_cycle<'e>(entries: &'e [PolicyEntry], cycle: &str) -> Option<&'e PolicyEntry> {
    entries.iter().find(|entry| entry.cycle == cycle)
}

// -----------------------------------------------------------------------------
// Windows Server
// -----------------------------------------------------------------------------

/// Whether a provider cycle covers a Windows Server version.
///
/// `2012-R2` is only reachable when the descriptor carries the R2 marker.
fn windows_cycle_matches(cycle: &str, version: &str, descriptor: &str) -> bool {
    match version {
        "2012" => cycle == "2012" || (cycle == "2012-R2" && descriptor.contains(WINDOWS_R2_MARKER)),
        "2016" | "2019" | "2022" => cycle == version,
        _ => false,
    }
}

fn resolve_windows(
    entries: &[PolicyEntry],
    parsed: &ParsedOs,
    version: &str,
    now: DateTime<Utc>,
) -> Resolution {
    let Some(entry) = entries
        .iter()
        .find(|entry| windows_cycle_matches(&entry.cycle, version, &parsed.descriptor))
    else {
        return no_match(OsFamily::WindowsServer, version);
    };

    let status = if past(now, entry.eol) {
        LifecycleStatus::EndOfLife
    } else if past(now, entry.extended_support_end) {
        LifecycleStatus::ExtendedSupport
    } else {
        LifecycleStatus::Supported
    };
    Resolution::matched(status, &entry.cycle)
}

// -----------------------------------------------------------------------------
// RHEL
// -----------------------------------------------------------------------------

fn resolve_rhel(
    entries: &[PolicyEntry],
    parsed: &ParsedOs,
    now: DateTime<Utc>,
    options: ResolverOptions,
) -> Resolution {
    let (Some(major), Some(minor)) = (parsed.major_version(), parsed.minor_version()) else {
        return Resolution::unknown(UnknownReason::MissingMinorVersion);
    };
    let Some(entry) = find_cycle(entries, major) else {
        return no_match(OsFamily::Rhel, parsed.version.as_deref().unwrap_or(major));
    };

    // Branch order matters: a future major must not fall into the 8/9 arm.
    let status = match major {
        "7" => {
            if minor.parse::<u32>().is_ok_and(|m| m < RHEL7_FINAL_MINOR) {
                LifecycleStatus::EndOfLife
            } else if past_or_undefined(now, entry.eol) {
                if options.rhel7_els_enabled && before(now, entry.extended_support_end) {
                    LifecycleStatus::ExtendedSupport
                } else {
                    LifecycleStatus::EndOfLife
                }
            } else {
                LifecycleStatus::Supported
            }
        }
        "8" | "9" => {
            if past_or_undefined(now, entry.eol) {
                LifecycleStatus::EndOfLife
            } else {
                LifecycleStatus::Supported
            }
        }
        _ => {
            if past(now, entry.eol) {
                LifecycleStatus::EndOfLife
            } else {
                LifecycleStatus::Supported
            }
        }
    };
    Resolution::matched(status, &entry.cycle)
}

// -----------------------------------------------------------------------------
// Ubuntu
// -----------------------------------------------------------------------------

fn ubuntu_pinned_eol() -> Option<NaiveDate> {
    let (year, month, day) = UBUNTU_PINNED_EOL;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn resolve_ubuntu(entries: &[PolicyEntry], version: &str, now: DateTime<Utc>) -> Resolution {
    if version == UBUNTU_PINNED_VERSION {
        let Some(eol) = ubuntu_pinned_eol() else {
            return no_match(OsFamily::Ubuntu, version);
        };
        let status = if now > midnight_utc(eol) {
            LifecycleStatus::EndOfLife
        } else {
            LifecycleStatus::Supported
        };
        return Resolution::unmatched(status);
    }

    let Some(entry) = find_cycle(entries, version) else {
        return no_match(OsFamily::Ubuntu, version);
    };
    let status = if past(now, entry.eol) {
        LifecycleStatus::EndOfLife
    } else {
        LifecycleStatus::Supported
    };
    Resolution::matched(status, &entry.cycle)
}

// -----------------------------------------------------------------------------
// Oracle Linux
// -----------------------------------------------------------------------------

fn resolve_oracle_linux(entries: &[PolicyEntry], version: &str, now: DateTime<Utc>) -> Resolution {
    let sub_version_prefix = format!("{}.", version);
    let Some(entry) = entries
        .iter()
        .find(|entry| entry.cycle == version || entry.cycle.starts_with(&sub_version_prefix))
    else {
        return no_match(OsFamily::OracleLinux, version);
    };

    let status = if past(now, entry.eol) {
        LifecycleStatus::EndOfLife
    } else {
        LifecycleStatus::Supported
    };
    Resolution::matched(status, &entry.cycle)
}

// =============================================================================
// TESTS
// =============================================================================
