//! # lifewatch
//!
//! Library target of the lifewatch binary: everything async or
//! network-aware around `lifewatch-core`.
//!
//! - [`config`]: TOML file + environment overrides
//! - [`provider`]: the lifecycle-data provider seam and its HTTP client
//! - [`store`]: the async Policy Store (fetch once per family, cache, TTL)
//! - [`service`]: identify → ensure → resolve → present
//! - [`cli`] and [`api`]: the two front doors

pub mod api;
pub mod cli;
pub mod config;
pub mod provider;
pub mod service;
pub mod store;
