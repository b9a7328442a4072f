//! # Classification Service
//!
//! Ties the engine together: identify → ensure policy → resolve → present.
//!
//! The policy fetch happens before any family rule runs, so a family whose
//! fetch fails is Unknown for every version (Ubuntu 22.04 included).

use crate::config::Config;
use crate::provider::{FetchError, HttpPolicyFetcher, PolicyFetcher};
use crate::store::PolicyStore;
use chrono::{DateTime, Utc};
use lifewatch_core::{
    Inventory, InventoryReport, LegacyStatusTable, LifecycleResolver, LifecycleStrategy, OsFamily,
    PolicyCache, PolicyEntry, ResolverOptions, ServerStatus, identify,
};
use std::collections::BTreeSet;

/// Dynamic (canonical) and legacy classification over one Policy Store.
pub struct LifecycleService<F> {
    store: PolicyStore<F>,
    options: ResolverOptions,
    legacy: LegacyStatusTable,
}

impl LifecycleService<HttpPolicyFetcher> {
    /// Build the production service from configuration.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let fetcher = HttpPolicyFetcher::from_config(config)?;
        let cache = match config.cache_ttl() {
            Some(ttl) => PolicyCache::with_ttl(ttl),
            None => PolicyCache::new(),
        };
        Ok(Self::new(
            PolicyStore::new(fetcher, cache),
            config.resolver_options(),
        ))
    }
}

impl<F: PolicyFetcher> LifecycleService<F> {
    /// Create a service.
    pub fn new(store: PolicyStore<F>, options: ResolverOptions) -> Self {
        Self {
            store,
            options,
            legacy: LegacyStatusTable::new(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &PolicyStore<F> {
        &self.store
    }

    /// Resolver options in effect.
    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    /// Classify one descriptor with the dated resolver.
    pub async fn classify(&self, descriptor: &str, now: DateTime<Utc>) -> ServerStatus {
        let parsed = identify(descriptor);
        if parsed.parse_failure().is_none() {
            self.prefetch([parsed.family]).await;
        }
        let cache = self.store.snapshot().await;
        let resolver = LifecycleResolver::new(&cache).with_options(self.options);
        ServerStatus::new(None, descriptor, resolver.resolve_detailed(&parsed, now))
    }

    /// Classify many descriptors; each distinct family is fetched at most once.
    pub async fn classify_many(
        &self,
        descriptors: &[String],
        now: DateTime<Utc>,
    ) -> Vec<ServerStatus> {
        let families: BTreeSet<OsFamily> = descriptors
            .iter()
            .map(|d| identify(d))
            .filter(|parsed| parsed.parse_failure().is_none())
            .map(|parsed| parsed.family)
            .collect();
        self.prefetch(families).await;

        let cache = self.store.snapshot().await;
        let resolver = LifecycleResolver::new(&cache).with_options(self.options);
        descriptors
            .iter()
            .map(|descriptor| ServerStatus::classify(descriptor, &resolver, now))
            .collect()
    }

    /// Classify an inventory with the dated resolver.
    pub async fn classify_inventory(
        &self,
        inventory: &Inventory,
        now: DateTime<Utc>,
    ) -> InventoryReport {
        self.prefetch(inventory.families()).await;
        let cache = self.store.snapshot().await;
        let resolver = LifecycleResolver::new(&cache).with_options(self.options);
        InventoryReport::build(inventory, &resolver, now)
    }

    /// Classify one descriptor with the static table. Never fetches.
    pub fn classify_legacy(&self, descriptor: &str, now: DateTime<Utc>) -> ServerStatus {
        ServerStatus::classify(descriptor, &self.legacy, now)
    }

    /// Classify an inventory with the static table. Never fetches.
    pub fn legacy_inventory(&self, inventory: &Inventory, now: DateTime<Utc>) -> InventoryReport {
        InventoryReport::build(inventory, &self.legacy, now)
    }

    /// Policy entries of a family, fetching them if needed.
    pub async fn policy(&self, family: OsFamily) -> Result<Vec<PolicyEntry>, FetchError> {
        self.store.ensure(family).await?;
        Ok(self.store.entries(family).await.unwrap_or_default())
    }

    async fn prefetch(&self, families: impl IntoIterator<Item = OsFamily>) {
        for family in families {
            // The store logs and records the failure; resolution reports Unknown.
            if self.store.ensure(family).await.is_err() {
                tracing::debug!(%family, "Classifying without lifecycle data");
            }
        }
    }
}
