//! Core types for Hausbaum.
//!
//! This module provides type-safe wrappers for the directory's domain concepts.

pub mod category;
pub mod coordinates;
pub mod id;
pub mod service_area;
pub mod zip;
pub mod zip_record;

pub use category::{Category, CategoryError};
pub use coordinates::{Coordinates, CoordinatesError};
pub use id::*;
pub use service_area::BusinessServiceArea;
pub use zip::{ZipCode, ZipCodeError};
pub use zip_record::{ZipRecord, ZipWithDistance};
