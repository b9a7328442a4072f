//! # Lifecycle-Data Provider
//!
//! The one network dependency: per-family release dates keyed by product
//! (`rhel`, `windows-server`, `ubuntu`, `oracle-linux`).
//!
//! [`PolicyFetcher`] is the seam the Policy Store fetches through.
//! [`HttpPolicyFetcher`] is the production implementation.

use crate::config::{Config, PRODUCT_PLACEHOLDER};
use lifewatch_core::{LifewatchError, OsFamily, PolicyEntry, decode_policy_payload};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Why a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Provider unreachable, or the request timed out.
    #[error("cannot reach provider at {url}: {message}")]
    Connection { url: String, message: String },

    /// Provider answered with a non-success status.
    #[error("provider returned {status} for {url}")]
    Status { url: String, status: u16 },

    /// Body is not a lifecycle payload.
    #[error("malformed payload from {url}: {message}")]
    Decode { url: String, message: String },

    /// The family has no provider product.
    #[error("no lifecycle product for family {0}")]
    UnsupportedFamily(OsFamily),
}

impl From<FetchError> for LifewatchError {
    fn from(e: FetchError) -> Self {
        LifewatchError::FetchFailed(e.to_string())
    }
}

/// Source of lifecycle policy entries for a family.
pub trait PolicyFetcher: Send + Sync + 'static {
    /// Fetch every entry of a family, in provider order.
    fn fetch(
        &self,
        family: OsFamily,
    ) -> impl Future<Output = Result<Vec<PolicyEntry>, FetchError>> + Send;
}

// =============================================================================
// HTTP FETCHER
// =============================================================================

/// Fetches lifecycle payloads over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpPolicyFetcher {
    http: reqwest::Client,
    url_template: String,
}

impl HttpPolicyFetcher {
    /// Create a fetcher for a URL template containing `{product}`.
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let url_template = url_template.into();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lifewatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Connection {
                url: url_template.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { http, url_template })
    }

    /// Create a fetcher from configuration.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            config.provider.url_template.clone(),
            config.request_timeout(),
        )
    }

    /// URL of a family's payload.
    pub fn url_for(&self, family: OsFamily) -> Result<String, FetchError> {
        if !family.is_known() {
            return Err(FetchError::UnsupportedFamily(family));
        }
        Ok(self
            .url_template
            .replace(PRODUCT_PLACEHOLDER, family.product_key()))
    }

    /// Send the request, mapping transport failures.
    async fn send(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        self.http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Connection {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    /// Check the status and decode the body.
    async fn handle_response(
        &self,
        url: &str,
        resp: reqwest::Response,
    ) -> Result<Vec<PolicyEntry>, FetchError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(|e| FetchError::Connection {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        decode_policy_payload(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl PolicyFetcher for HttpPolicyFetcher {
    async fn fetch(&self, family: OsFamily) -> Result<Vec<PolicyEntry>, FetchError> {
        let url = self.url_for(family)?;
        tracing::debug!(%url, "Fetching lifecycle data");
        let resp = self.send(&url).await?;
        self.handle_response(&url, resp).await
    }
}
