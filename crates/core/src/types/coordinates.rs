//! Geographic coordinates.

use serde::{Deserialize, Serialize};

use crate::distance::distance_miles;

/// Errors that can occur when constructing [`Coordinates`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoordinatesError {
    /// Latitude is NaN, infinite or outside [-90, 90].
    #[error("latitude out of range: {0}")]
    Latitude(f64),
    /// Longitude is NaN, infinite or outside [-180, 180].
    #[error("longitude out of range: {0}")]
    Longitude(f64),
}

/// A latitude/longitude pair in decimal degrees.
///
/// Deserialization applies the same checks as [`Coordinates::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = CoordinatesError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    /// Create validated coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is non-finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in miles.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        distance_miles(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_bounds() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(matches!(
            Coordinates::new(91.0, 0.0),
            Err(CoordinatesError::Latitude(_))
        ));
        assert!(matches!(
            Coordinates::new(0.0, -180.5),
            Err(CoordinatesError::Longitude(_))
        ));
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_distance_to() {
        let miami = Coordinates::new(25.7697, -80.1892).unwrap();
        let new_york = Coordinates::new(40.7501, -73.9964).unwrap();
        let d = miami.distance_to(&new_york);
        assert!((d - 1092.0).abs() <= 5.0);
        assert!(miami.distance_to(&miami).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Coordinates =
            serde_json::from_str(r#"{"latitude":40.846,"longitude":-81.4409}"#).unwrap();
        assert!((ok.latitude() - 40.846).abs() < f64::EPSILON);

        assert!(
            serde_json::from_str::<Coordinates>(r#"{"latitude":123.0,"longitude":0.0}"#).is_err()
        );
        assert!(
            serde_json::from_str::<Coordinates>(r#"{"latitude":0.0,"longitude":-200.0}"#).is_err()
        );
    }
}
