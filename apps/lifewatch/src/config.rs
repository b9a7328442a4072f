//! # Configuration
//!
//! Settings come from a TOML file, then environment variables on top.
//!
//! ```toml
//! [provider]
//! url_template = "https://endoflife.date/api/{product}.json"
//! timeout_secs = 10
//!
//! [cache]
//! ttl_secs = 86400        # omit or 0: keep for the process lifetime
//!
//! [policy]
//! rhel7_els_enabled = true
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! cors_origins = "http://localhost:3000"
//! ```
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `LIFEWATCH_PROVIDER_URL` | `provider.url_template` |
//! | `LIFEWATCH_CACHE_TTL_SECS` | `cache.ttl_secs` |
//! | `LIFEWATCH_RHEL7_ELS` | `policy.rhel7_els_enabled` |
//! | `LIFEWATCH_CORS_ORIGINS` | `server.cors_origins` |

use chrono::TimeDelta;
use lifewatch_core::primitives::RHEL7_ELS_ENABLED;
use lifewatch_core::{LifewatchError, ResolverOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File read when `--config` is not given. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "lifewatch.toml";

/// Provider URL, `{product}` is replaced by the family product key.
pub const DEFAULT_URL_TEMPLATE: &str = "https://endoflife.date/api/{product}.json";

/// Placeholder substituted in the provider URL template.
pub const PRODUCT_PLACEHOLDER: &str = "{product}";

const ENV_PROVIDER_URL: &str = "LIFEWATCH_PROVIDER_URL";
const ENV_CACHE_TTL: &str = "LIFEWATCH_CACHE_TTL_SECS";
const ENV_RHEL7_ELS: &str = "LIFEWATCH_RHEL7_ELS";
const ENV_CORS_ORIGINS: &str = "LIFEWATCH_CORS_ORIGINS";

// =============================================================================
// ERRORS
// =============================================================================

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(String),

    #[error("invalid value {value:?} for {var}")]
    InvalidOverride { var: &'static str, value: String },

    #[error("provider URL template must contain {{product}}: {0}")]
    MissingPlaceholder(String),
}

impl From<ConfigError> for LifewatchError {
    fn from(e: ConfigError) -> Self {
        LifewatchError::ConfigError(e.to_string())
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Where lifecycle data is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub url_template: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Policy cache lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: Option<u64>,
}

/// Switches of the dated rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub rhel7_els_enabled: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            rhel7_els_enabled: RHEL7_ELS_ENABLED,
        }
    }
}

/// HTTP server defaults; CLI flags win over these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: None,
        }
    }
}

/// Complete lifewatch configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub cache: CacheConfig,
    pub policy: PolicyConfig,
    pub server: ServerConfig,
}

// =============================================================================
// LOADING
// =============================================================================

impl Config {
    /// Load from a file and apply environment overrides.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// read if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse TOML text. Missing keys take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_overrides<L>(&mut self, lookup: L) -> Result<(), ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_PROVIDER_URL) {
            self.provider.url_template = url;
        }
        if let Some(raw) = lookup(ENV_CACHE_TTL) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidOverride {
                    var: ENV_CACHE_TTL,
                    value: raw.clone(),
                })?;
            self.cache.ttl_secs = Some(secs);
        }
        if let Some(raw) = lookup(ENV_RHEL7_ELS) {
            self.policy.rhel7_els_enabled =
                parse_flag(&raw).ok_or(ConfigError::InvalidOverride {
                    var: ENV_RHEL7_ELS,
                    value: raw.clone(),
                })?;
        }
        if let Some(origins) = lookup(ENV_CORS_ORIGINS) {
            self.server.cors_origins = Some(origins);
        }
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.provider.url_template.contains(PRODUCT_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder(
                self.provider.url_template.clone(),
            ));
        }
        Ok(())
    }

    /// Resolver switches.
    #[must_use]
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            rhel7_els_enabled: self.policy.rhel7_els_enabled,
        }
    }

    /// Cache time-to-live. `None` (or 0) keeps entries for the process lifetime.
    #[must_use]
    pub fn cache_ttl(&self) -> Option<TimeDelta> {
        self.cache
            .ttl_secs
            .filter(|secs| *secs > 0)
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(TimeDelta::try_seconds)
    }

    /// Provider request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.provider.url_template, DEFAULT_URL_TEMPLATE);
        assert_eq!(config.server.port, 8080);
        assert!(config.policy.rhel7_els_enabled);
        assert!(config.cache_ttl().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [cache]
            ttl_secs = 3600

            [policy]
            rhel7_els_enabled = false
            "#,
        )
        .expect("parse");
        assert_eq!(config.cache_ttl(), Some(TimeDelta::hours(1)));
        assert!(!config.resolver_options().rhel7_els_enabled);
        assert_eq!(config.provider.timeout_secs, 10);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(matches!(
            Config::from_toml_str("[cache]\nttl_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn overrides_win() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("LIFEWATCH_PROVIDER_URL", "http://mirror:8080/api/lifecycle/{product}"),
                ("LIFEWATCH_CACHE_TTL_SECS", "60"),
                ("LIFEWATCH_RHEL7_ELS", "off"),
                ("LIFEWATCH_CORS_ORIGINS", "*"),
            ]))
            .expect("overrides");
        assert_eq!(
            config.provider.url_template,
            "http://mirror:8080/api/lifecycle/{product}"
        );
        assert_eq!(config.cache_ttl(), Some(TimeDelta::seconds(60)));
        assert!(!config.policy.rhel7_els_enabled);
        assert_eq!(config.server.cors_origins.as_deref(), Some("*"));
    }

    #[test]
    fn bad_overrides_are_errors() {
        let mut config = Config::default();
        assert!(matches!(
            config.apply_overrides(env(&[("LIFEWATCH_CACHE_TTL_SECS", "-5")])),
            Err(ConfigError::InvalidOverride { .. })
        ));
        assert!(matches!(
            config.apply_overrides(env(&[("LIFEWATCH_RHEL7_ELS", "maybe")])),
            Err(ConfigError::InvalidOverride { .. })
        ));
    }

    #[test]
    fn zero_ttl_means_no_expiry() {
        let mut config = Config::default();
        config.cache.ttl_secs = Some(0);
        assert!(config.cache_ttl().is_none());
    }

    #[test]
    fn template_needs_placeholder() {
        let mut config = Config::default();
        config.provider.url_template = "https://example.invalid/rhel.json".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingPlaceholder(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("lifewatch.toml");
        std::fs::write(&path, "[server]\nport = 9090\n").expect("write");
        let config = Config::from_file(&path).expect("load");
        assert_eq!(config.server.port, 9090);

        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            Config::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
