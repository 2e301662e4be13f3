//! ZIP code records as stored in the coordinate store.

use serde::{Deserialize, Serialize};

use super::{Coordinates, ZipCode};

/// Centroid and administrative metadata for one ZIP code.
///
/// The ZIP code and coordinates are immutable once imported; the descriptive
/// fields change only through re-import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipRecord {
    pub zip_code: ZipCode,
    pub coordinates: Coordinates,
    pub city: String,
    /// Full state name, e.g. "Florida".
    pub state: String,
    /// Two-letter postal abbreviation, e.g. "FL".
    pub state_code: String,
    pub county: String,
    /// IANA timezone name, e.g. "`America/New_York`".
    pub timezone: String,
}

impl ZipRecord {
    /// Latitude of the ZIP centroid.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinates.latitude()
    }

    /// Longitude of the ZIP centroid.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinates.longitude()
    }

    /// Distance in miles between this ZIP's centroid and another's.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        self.coordinates.distance_to(&other.coordinates)
    }
}

/// A radius-query result: a ZIP record and its distance from the center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipWithDistance {
    pub record: ZipRecord,
    pub distance_miles: f64,
}
