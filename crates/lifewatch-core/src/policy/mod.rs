//! # Policy Store (data side)
//!
//! The two lifecycle tables lifewatch knows about:
//!
//! - [`PolicyEntry`] / [`PolicyCache`]: per-family release dates fetched from
//!   the lifecycle-data provider. Canonical.
//! - [`LegacyStatusTable`]: exact descriptor → pre-baked status, curated by
//!   hand. Kept for callers that expect its verdicts; never merged with the
//!   dated table.
//!
//! Fetching is not done here; the app owns the network side and hands the
//! decoded entries to [`PolicyCache::insert`].

mod cache;
mod entry;
mod legacy;

pub use cache::{CachedPolicy, PolicyCache};
pub use entry::{PolicyEntry, decode_policy_payload};
pub use legacy::LegacyStatusTable;
