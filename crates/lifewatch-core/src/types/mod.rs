//! # Core Type Definitions
//!
//! This module contains all core types for the lifewatch engine:
//! - OS families and parsed descriptors (`OsFamily`, `ParsedOs`, `ParseFailure`)
//! - The status code every classification ends in (`LifecycleStatus`)
//! - Error types (`LifewatchError`)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// OS FAMILY
// =============================================================================

/// Operating-system family recognised by the engine.
///
/// Serialized as the provider product key (`rhel`, `windows-server`, ...).
/// `Ord` follows detection priority so `BTreeMap<OsFamily, _>` iterates in
/// the same order the identifier tries prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OsFamily {
    /// Red Hat Enterprise Linux.
    Rhel,
    /// Microsoft Windows Server.
    WindowsServer,
    /// Canonical Ubuntu.
    Ubuntu,
    /// Oracle Linux.
    OracleLinux,
    /// Anything else.
    Unknown,
}

impl OsFamily {
    /// Every family that has lifecycle policy, in detection priority order.
    pub const KNOWN: [OsFamily; 4] = [
        OsFamily::Rhel,
        OsFamily::WindowsServer,
        OsFamily::Ubuntu,
        OsFamily::OracleLinux,
    ];

    /// Key identifying this family at the lifecycle-data provider.
    #[must_use]
    pub fn product_key(&self) -> &'static str {
        match self {
            OsFamily::Rhel => "rhel",
            OsFamily::WindowsServer => "windows-server",
            OsFamily::Ubuntu => "ubuntu",
            OsFamily::OracleLinux => "oracle-linux",
            OsFamily::Unknown => "unknown",
        }
    }

    /// Human-readable family name, as it prefixes descriptors.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            OsFamily::Rhel => "RHEL",
            OsFamily::WindowsServer => "Windows Server",
            OsFamily::Ubuntu => "Ubuntu",
            OsFamily::OracleLinux => "Oracle Linux",
            OsFamily::Unknown => "Unknown",
        }
    }

    /// Resolve a provider product key. `unknown` is not a valid key.
    pub fn from_product_key(key: &str) -> Result<Self, LifewatchError> {
        Self::KNOWN
            .into_iter()
            .find(|family| family.product_key() == key)
            .ok_or_else(|| LifewatchError::UnknownFamily(key.to_string()))
    }

    /// Whether this family has lifecycle policy at all.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, OsFamily::Unknown)
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.product_key())
    }
}

impl FromStr for OsFamily {
    type Err = LifewatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_product_key(s)
    }
}

// =============================================================================
// PARSED OS
// =============================================================================

/// Why a descriptor could not be reduced to (family, version).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailure {
    /// The descriptor was empty.
    EmptyDescriptor,
    /// No family prefix matched.
    UnrecognizedFamily,
    /// The family matched but its version pattern did not.
    UnparsableVersion,
}

/// A descriptor reduced to its family and version.
///
/// The original descriptor is kept: Windows Server 2012 R2 is told apart
/// from 2012 by inspecting it, not by the version string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedOs {
    /// Detected family.
    pub family: OsFamily,
    /// Extracted version, e.g. `"7.9"` or `"2012"`.
    pub version: Option<String>,
    /// The descriptor this was parsed from.
    pub descriptor: String,
}

impl ParsedOs {
    /// Create a parsed descriptor.
    #[must_use]
    pub fn new(family: OsFamily, version: Option<&str>, descriptor: impl Into<String>) -> Self {
        Self {
            family,
            version: version.map(str::to_string),
            descriptor: descriptor.into(),
        }
    }

    /// A descriptor that matched no family.
    #[must_use]
    pub fn unknown(descriptor: impl Into<String>) -> Self {
        Self::new(OsFamily::Unknown, None, descriptor)
    }

    /// Major component of the version (`"7"` for `"7.9"`).
    #[must_use]
    pub fn major_version(&self) -> Option<&str> {
        self.version.as_deref().and_then(|v| v.split('.').next())
    }

    /// Minor component of the version (`"9"` for `"7.9"`), if any.
    #[must_use]
    pub fn minor_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .and_then(|v| v.split('.').nth(1))
            .filter(|minor| !minor.is_empty())
    }

    /// The reason this descriptor cannot be resolved, if any.
    #[must_use]
    pub fn parse_failure(&self) -> Option<ParseFailure> {
        match (self.family, &self.version) {
            (OsFamily::Unknown, _) if self.descriptor.is_empty() => {
                Some(ParseFailure::EmptyDescriptor)
            }
            (OsFamily::Unknown, _) => Some(ParseFailure::UnrecognizedFamily),
            (_, None) => Some(ParseFailure::UnparsableVersion),
            _ => None,
        }
    }
}

// =============================================================================
// LIFECYCLE STATUS
// =============================================================================

/// Support status of an OS release at a given instant.
///
/// Serialized as its numeric code, which is what the rendering and editor
/// collaborators consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LifecycleStatus {
    /// Could not be determined.
    #[default]
    Unknown = -1,
    /// Mainstream, maintenance, or security support.
    Supported = 0,
    /// Paid extended phase (ELS, ESM).
    ExtendedSupport = 1,
    /// No vendor support.
    EndOfLife = 2,
}

impl LifecycleStatus {
    /// All statuses, in code order.
    pub const ALL: [LifecycleStatus; 4] = [
        LifecycleStatus::Unknown,
        LifecycleStatus::Supported,
        LifecycleStatus::ExtendedSupport,
        LifecycleStatus::EndOfLife,
    ];

    /// Numeric code (-1, 0, 1, 2).
    #[must_use]
    pub const fn code(self) -> i8 {
        self as i8
    }

    /// Status for a numeric code. Anything unrecognised is `Unknown`.
    #[must_use]
    pub const fn from_code(code: i8) -> Self {
        match code {
            0 => LifecycleStatus::Supported,
            1 => LifecycleStatus::ExtendedSupport,
            2 => LifecycleStatus::EndOfLife,
            _ => LifecycleStatus::Unknown,
        }
    }

    /// Short machine name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleStatus::Unknown => "unknown",
            LifecycleStatus::Supported => "supported",
            LifecycleStatus::ExtendedSupport => "extended_support",
            LifecycleStatus::EndOfLife => "end_of_life",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for LifecycleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.code())
    }
}

impl<'de> Deserialize<'de> for LifecycleStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i8::deserialize(deserializer).map(LifecycleStatus::from_code)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur around the lifewatch engine.
///
/// The resolver itself never returns these: resolution failures collapse
/// into `LifecycleStatus::Unknown`. These cover the fallible edges
/// (decoding payloads and inventories, parsing dates, I/O).
#[derive(Debug, Error)]
pub enum LifewatchError {
    /// A date or timestamp could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A product key does not name a known family.
    #[error("Unknown OS family: {0}")]
    UnknownFamily(String),

    /// A lifecycle-data payload has the wrong shape.
    #[error("Invalid policy payload: {0}")]
    InvalidPolicy(String),

    /// An inventory document has the wrong shape or size.
    #[error("Invalid inventory: {0}")]
    InvalidInventory(String),

    /// Lifecycle data could not be fetched.
    #[error("Policy fetch failed: {0}")]
    FetchFailed(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
