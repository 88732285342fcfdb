//! Great-circle distance between WGS84 coordinates.
//!
//! Coordinates follow the `geo` convention used throughout the crate:
//! `x = longitude`, `y = latitude`, both in degrees.

use geo::Coord;

/// Fixed spherical Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Build a coordinate from a latitude/longitude pair in degrees.
///
/// # Examples
/// ```
/// use locality_core::lat_lng;
///
/// let coord = lat_lng(12.935, 77.614);
/// assert_eq!(coord.y, 12.935);
/// assert_eq!(coord.x, 77.614);
/// ```
#[must_use]
pub const fn lat_lng(lat: f64, lng: f64) -> Coord<f64> {
    Coord { x: lng, y: lat }
}

/// Haversine distance in meters between two coordinates.
///
/// The Earth is treated as a sphere of radius [`EARTH_RADIUS_M`]. The result
/// is symmetric, non-negative and zero for identical inputs.
///
/// # Examples
/// ```
/// use locality_core::{haversine_distance, lat_lng};
///
/// let a = lat_lng(12.935, 77.614);
/// assert_eq!(haversine_distance(a, a), 0.0);
///
/// let b = lat_lng(12.945, 77.614);
/// let d = haversine_distance(a, b);
/// assert!((d - 1_111.95).abs() < 1.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the haversine formula is floating-point trigonometry"
)]
pub fn haversine_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let phi1 = a.y.to_radians();
    let phi2 = b.y.to_radians();
    let d_phi = (b.y - a.y).to_radians();
    let d_lambda = (b.x - a.x).to_radians();

    let raw = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push the term fractionally outside [0, 1] near antipodes.
    let h = raw.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}
