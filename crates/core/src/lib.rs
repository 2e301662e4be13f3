//! Hausbaum Core - Shared types library.
//!
//! This crate provides the domain types used across all Hausbaum components:
//! - `directory` - ZIP coordinate store, radius queries and service areas
//! - `cli` - Command-line tools for imports and lookups
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no store
//! access, no async runtime. This keeps it lightweight and allows it to be
//! used anywhere, including from the web application that embeds the
//! directory.
//!
//! # Modules
//!
//! - [`types`] - Validated newtypes for ZIP codes, coordinates, business IDs,
//!   service areas and the category taxonomy
//! - [`distance`] - Haversine great-circle distance in miles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod distance;
pub mod types;

pub use distance::{EARTH_RADIUS_MILES, distance_miles, format_distance};
pub use types::*;
