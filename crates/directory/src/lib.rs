//! Hausbaum Directory - ZIP-code proximity resolver.
//!
//! Answers the geographic questions the directory asks when matching
//! consumers with businesses:
//!
//! - Where is a ZIP code? ([`ZipCodeRepository`])
//! - Which ZIPs lie within N miles of another? ([`ProximityResolver`])
//! - Does a business serve a ZIP, or anything near it? ([`ServiceAreaService`])
//!
//! # Layers
//!
//! - [`store`] - the key-value store boundary (Redis, in-memory, timeout wrapper)
//! - [`db`] - repositories mapping domain types onto store keys
//! - [`services`] - component entry points; these swallow store failures and
//!   return empty results so callers never see infrastructure errors
//! - [`config`] - environment configuration
//!
//! All state lives in values the caller owns. Nothing here is global.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod store;

pub use config::{ConfigError, DirectoryConfig};
pub use db::{
    CategoryRepository, ImportMetadata, ServiceAreaRepository, ZipCache, ZipCodeRepository,
    zip_cache,
};
pub use error::LookupError;
pub use services::{
    BusinessMatch, ImportError, ImportStats, ProximityResolver, ServiceAreaService, ZipImporter,
    ZipValidation,
};
pub use store::{KeyValueStore, MemoryStore, RedisStore, StoreError, TimeoutStore};
