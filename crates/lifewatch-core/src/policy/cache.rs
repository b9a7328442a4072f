//! # Policy Cache
//!
//! Family → fetched entries, with the instant each family was fetched at
//! and an optional time-to-live. Without a TTL an entry lives as long as the
//! cache does.
//!
//! The cache never reads the clock. Freshness is asked with an explicit
//! instant, and expiry only takes effect when the owner calls
//! [`PolicyCache::evict_expired`]; `get` returns whatever is stored.

use crate::{OsFamily, PolicyEntry};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::BTreeMap;

/// Entries of one family and when they were fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPolicy {
    /// Entries in provider order.
    pub entries: Vec<PolicyEntry>,
    /// Instant the fetch completed.
    pub fetched_at: DateTime<Utc>,
}

/// In-memory cache of fetched lifecycle policy.
#[derive(Debug, Clone, Default)]
pub struct PolicyCache {
    families: BTreeMap<OsFamily, CachedPolicy>,
    ttl: Option<TimeDelta>,
}

impl PolicyCache {
    /// Create a cache whose entries never expire.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache whose entries expire `ttl` after being fetched.
    #[must_use]
    pub fn with_ttl(ttl: TimeDelta) -> Self {
        Self {
            families: BTreeMap::new(),
            ttl: Some(ttl),
        }
    }

    /// The configured time-to-live, if any.
    #[must_use]
    pub fn ttl(&self) -> Option<TimeDelta> {
        self.ttl
    }

    /// Store the entries of a family. Replaces whatever was there.
    pub fn insert(
        &mut self,
        family: OsFamily,
        entries: Vec<PolicyEntry>,
        fetched_at: DateTime<Utc>,
    ) {
        self.families.insert(
            family,
            CachedPolicy {
                entries,
                fetched_at,
            },
        );
    }

    /// Entries of a family, if cached.
    #[must_use]
    pub fn get(&self, family: OsFamily) -> Option<&[PolicyEntry]> {
        self.families.get(&family).map(|cached| cached.entries.as_slice())
    }

    /// Cached record of a family, including its fetch time.
    #[must_use]
    pub fn cached(&self, family: OsFamily) -> Option<&CachedPolicy> {
        self.families.get(&family)
    }

    /// Whether a family is cached and still within its TTL at `at`.
    #[must_use]
    pub fn is_fresh(&self, family: OsFamily, at: DateTime<Utc>) -> bool {
        self.families
            .get(&family)
            .is_some_and(|cached| self.within_ttl(cached, at))
    }

    /// Drop every family whose TTL has run out at `at`.
    ///
    /// Returns the number of families dropped.
    pub fn evict_expired(&mut self, at: DateTime<Utc>) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let before = self.families.len();
        self.families
            .retain(|_, cached| at.signed_duration_since(cached.fetched_at) < ttl);
        before - self.families.len()
    }

    /// Drop one family.
    pub fn invalidate(&mut self, family: OsFamily) -> bool {
        self.families.remove(&family).is_some()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.families.clear();
    }

    /// Families currently cached.
    pub fn families(&self) -> impl Iterator<Item = OsFamily> + '_ {
        self.families.keys().copied()
    }

    /// Number of cached families.
    #[must_use]
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    fn within_ttl(&self, cached: &CachedPolicy, at: DateTime<Utc>) -> bool {
        self.ttl
            .is_none_or(|ttl| at.signed_duration_since(cached.fetched_at) < ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0)
            .single()
            .expect("timestamp")
    }

    #[test]
    fn empty_cache_has_nothing() {
        let cache = PolicyCache::new();
        assert!(cache.is_empty());
        assert!(cache.get(OsFamily::Rhel).is_none());
        assert!(!cache.is_fresh(OsFamily::Rhel, at(0)));
    }

    #[test]
    fn insert_then_get() {
        let mut cache = PolicyCache::new();
        cache.insert(OsFamily::Ubuntu, vec![PolicyEntry::new("24.04")], at(0));
        assert_eq!(cache.get(OsFamily::Ubuntu).map(<[_]>::len), Some(1));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.families().collect::<Vec<_>>(), vec![OsFamily::Ubuntu]);
    }

    #[test]
    fn last_write_wins() {
        let mut cache = PolicyCache::new();
        cache.insert(OsFamily::Rhel, vec![PolicyEntry::new("7")], at(0));
        cache.insert(
            OsFamily::Rhel,
            vec![PolicyEntry::new("8"), PolicyEntry::new("9")],
            at(1),
        );
        let cached = cache.cached(OsFamily::Rhel).expect("cached");
        assert_eq!(cached.entries.len(), 2);
        assert_eq!(cached.fetched_at, at(1));
    }

    #[test]
    fn without_ttl_nothing_expires() {
        let mut cache = PolicyCache::new();
        cache.insert(OsFamily::Rhel, vec![], at(0));
        assert!(cache.is_fresh(OsFamily::Rhel, at(23)));
        assert_eq!(cache.evict_expired(at(23)), 0);
    }

    #[test]
    fn ttl_expiry() {
        let mut cache = PolicyCache::with_ttl(TimeDelta::hours(2));
        cache.insert(OsFamily::Rhel, vec![], at(0));
        cache.insert(OsFamily::Ubuntu, vec![], at(1));

        assert!(cache.is_fresh(OsFamily::Rhel, at(1)));
        assert!(!cache.is_fresh(OsFamily::Rhel, at(2)));
        assert!(cache.is_fresh(OsFamily::Ubuntu, at(2)));

        assert_eq!(cache.evict_expired(at(2)), 1);
        assert!(cache.get(OsFamily::Rhel).is_none());
        assert!(cache.get(OsFamily::Ubuntu).is_some());
    }

    #[test]
    fn invalidate_and_clear() {
        let mut cache = PolicyCache::new();
        cache.insert(OsFamily::Rhel, vec![], at(0));
        cache.insert(OsFamily::OracleLinux, vec![], at(0));
        assert!(cache.invalidate(OsFamily::Rhel));
        assert!(!cache.invalidate(OsFamily::Rhel));
        cache.clear();
        assert!(cache.is_empty());
    }
}
