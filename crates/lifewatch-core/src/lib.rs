//! # lifewatch-core
//!
//! The lifecycle-classification engine for lifewatch - THE LOGIC.
//!
//! A free-text OS descriptor such as `"RHEL 7.9"` flows through:
//!
//! ```text
//! descriptor ──► identify ──► ParsedOs ──► LifecycleStrategy ──► LifecycleStatus ──► present
//!                                               │
//!                                 ┌─────────────┴─────────────┐
//!                                 ▼                           ▼
//!                       LifecycleResolver              LegacyStatusTable
//!                    (PolicyCache, canonical)      (static table, fallback)
//! ```
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Never reads the clock: every date-driven decision takes `now` explicitly
//! - Never fails at the resolver boundary: every failure collapses into
//!   [`LifecycleStatus::Unknown`], with the cause kept in [`UnknownReason`]

// =============================================================================
// MODULES
// =============================================================================

pub mod dates;
pub mod identify;
pub mod inventory;
pub mod policy;
pub mod presenter;
pub mod primitives;
pub mod resolver;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{LifecycleStatus, LifewatchError, OsFamily, ParseFailure, ParsedOs};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use identify::identify;
pub use inventory::{Inventory, InventoryReport, ServerRecord, ServerStatus, StatusSummary};
pub use policy::{CachedPolicy, LegacyStatusTable, PolicyCache, PolicyEntry, decode_policy_payload};
pub use presenter::{StatusPresentation, present};
pub use resolver::{
    LifecycleResolver, LifecycleStrategy, Resolution, ResolverOptions, UnknownReason,
};
