//! Great-circle distance between two points on the Earth's surface.

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Compute the Haversine distance in miles between two coordinates given in
/// degrees.
///
/// ```text
/// a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)
/// c = 2·atan2(√a, √(1-a))
/// d = R·c
/// ```
///
/// Non-finite inputs produce `0.0`.
///
/// # Examples
///
/// ```
/// use hausbaum_core::distance_miles;
///
/// // Miami (33131) to New York (10001)
/// let d = distance_miles(25.7697, -80.1892, 40.7501, -73.9964);
/// assert!((d - 1092.0).abs() < 5.0);
/// ```
#[must_use]
pub fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if !(lat1.is_finite() && lon1.is_finite() && lat2.is_finite() && lon2.is_finite()) {
        tracing::warn!(lat1, lon1, lat2, lon2, "Non-finite coordinates in distance calculation");
        return 0.0;
    }

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    // Rounding can push `a` a hair outside [0, 1] for antipodal points.
    let a = ((d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Format a distance in miles for display.
///
/// Distances under a tenth of a mile render as `"< 0.1 mi"`.
#[must_use]
pub fn format_distance(miles: f64) -> String {
    if miles < 0.1 {
        return "< 0.1 mi".to_owned();
    }
    format!("{miles:.1} mi")
}
