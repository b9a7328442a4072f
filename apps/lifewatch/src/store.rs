//! # Policy Store
//!
//! Async owner of the [`PolicyCache`]: fetches a family the first time it is
//! needed (or after its TTL ran out) and keeps the result.
//!
//! ## Concurrency
//!
//! The cache sits behind a `tokio::sync::RwLock` that is never held across
//! the fetch. Concurrent first uses of a family may each fetch; the last
//! insert wins. Resolution works on a [`PolicyStore::snapshot`], so the
//! resolver stays synchronous.
//!
//! ## Failures
//!
//! A failed fetch leaves the cache untouched and records the reason per
//! family. Every lookup against that family resolves to Unknown until a
//! later fetch succeeds.

use crate::provider::{FetchError, PolicyFetcher};
use chrono::{DateTime, TimeDelta, Utc};
use lifewatch_core::{OsFamily, PolicyCache, PolicyEntry};
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// The last failed fetch of a family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    /// What went wrong.
    #[serde(serialize_with = "serialize_display")]
    pub error: FetchError,
    /// When it went wrong.
    pub failed_at: DateTime<Utc>,
}

fn serialize_display<S: serde::Serializer>(
    error: &FetchError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Lazily populated, TTL-bounded store of lifecycle policy.
pub struct PolicyStore<F> {
    fetcher: F,
    cache: RwLock<PolicyCache>,
    failures: RwLock<BTreeMap<OsFamily, FetchFailure>>,
}

impl<F: PolicyFetcher> PolicyStore<F> {
    /// Create a store around a fetcher and an (empty) cache.
    pub fn new(fetcher: F, cache: PolicyCache) -> Self {
        Self {
            fetcher,
            cache: RwLock::new(cache),
            failures: RwLock::new(BTreeMap::new()),
        }
    }

    /// The fetcher in use.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Make sure a family is cached, fetching it if needed.
    pub async fn ensure(&self, family: OsFamily) -> Result<(), FetchError> {
        self.ensure_at(family, Utc::now()).await
    }

    /// [`ensure`](Self::ensure) with an explicit wall-clock instant for the
    /// TTL check and the fetch timestamp.
    pub async fn ensure_at(&self, family: OsFamily, at: DateTime<Utc>) -> Result<(), FetchError> {
        if !family.is_known() {
            return Err(FetchError::UnsupportedFamily(family));
        }
        if self.cache.read().await.is_fresh(family, at) {
            return Ok(());
        }

        let evicted = self.cache.write().await.evict_expired(at);
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted expired lifecycle data");
        }

        tracing::info!(%family, "Fetching lifecycle policy");
        match self.fetcher.fetch(family).await {
            Ok(entries) => {
                for entry in entries.iter().filter(|e| e.date_order_violation()) {
                    tracing::warn!(
                        %family,
                        cycle = %entry.cycle,
                        "Lifecycle dates out of order (support > eol > extended)"
                    );
                }
                let count = entries.len();
                self.cache.write().await.insert(family, entries, at);
                self.failures.write().await.remove(&family);
                tracing::info!(%family, count, "Lifecycle policy cached");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%family, %error, "Lifecycle policy fetch failed");
                self.failures.write().await.insert(
                    family,
                    FetchFailure {
                        error: error.clone(),
                        failed_at: at,
                    },
                );
                Err(error)
            }
        }
    }

    /// Time-to-live of cached families. `None` keeps them for the process lifetime.
    pub async fn ttl(&self) -> Option<TimeDelta> {
        self.cache.read().await.ttl()
    }

    /// Copy of the cache, for synchronous resolution.
    pub async fn snapshot(&self) -> PolicyCache {
        self.cache.read().await.clone()
    }

    /// Cached entries of a family.
    pub async fn entries(&self, family: OsFamily) -> Option<Vec<PolicyEntry>> {
        self.cache.read().await.get(family).map(<[_]>::to_vec)
    }

    /// Families currently cached.
    pub async fn cached_families(&self) -> Vec<OsFamily> {
        self.cache.read().await.families().collect()
    }

    /// The last fetch failure of a family, cleared by a later success.
    pub async fn last_failure(&self, family: OsFamily) -> Option<FetchFailure> {
        self.failures.read().await.get(&family).cloned()
    }

    /// Drop a family so the next use refetches it.
    pub async fn invalidate(&self, family: OsFamily) -> bool {
        self.cache.write().await.invalidate(family)
    }

    /// Drop everything.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
        self.failures.write().await.clear();
    }
}
