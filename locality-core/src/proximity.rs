//! Transfer functions from proximity measurements to `0..=100` sub-scores.
//!
//! A category score blends two signals: how close the nearest facility is
//! and how many facilities are within reach. Distance dominates with a
//! 70/30 split.

/// Share of the category score driven by the nearest distance.
pub const DISTANCE_SHARE: f64 = 0.7;

/// Share of the category score driven by the number of options.
pub const COUNT_SHARE: f64 = 0.3;

/// Highest sub-score or category score.
pub const MAX_SCORE: f64 = 100.0;

/// Round to two decimal places.
///
/// Rounding works on the exact binary value, so `15.245`, stored just below
/// the half, rounds down.
///
/// # Examples
/// ```
/// use locality_core::round2;
///
/// assert_eq!(round2(84.996), 85.0);
/// assert_eq!(round2(12.344), 12.34);
/// assert_eq!(round2(15.245), 15.24);
/// ```
#[must_use]
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Map the distance to the nearest facility onto `0..=100`.
///
/// Returns [`MAX_SCORE`] at or inside `ideal_radius_m`, zero at or beyond
/// `max_radius_m`, and a linear ramp in between rounded to two decimals.
/// `None` means nothing was found and always scores zero.
///
/// # Examples
/// ```
/// use locality_core::distance_subscore;
///
/// assert_eq!(distance_subscore(Some(900.0), 1_000.0, 5_000.0), 100.0);
/// assert_eq!(distance_subscore(Some(3_000.0), 1_000.0, 5_000.0), 50.0);
/// assert_eq!(distance_subscore(Some(5_000.0), 1_000.0, 5_000.0), 0.0);
/// assert_eq!(distance_subscore(None, 1_000.0, 5_000.0), 0.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "linear interpolation between the ideal and maximum radii"
)]
pub fn distance_subscore(distance_m: Option<f64>, ideal_radius_m: f64, max_radius_m: f64) -> f64 {
    let Some(distance) = distance_m else {
        return 0.0;
    };
    if distance <= ideal_radius_m {
        return MAX_SCORE;
    }
    if distance >= max_radius_m {
        return 0.0;
    }
    let ratio = (distance - ideal_radius_m) / (max_radius_m - ideal_radius_m);
    round2(MAX_SCORE * (1.0 - ratio))
}

/// Map the number of facilities in range onto `0..=100`.
///
/// One facility is adequate but fragile; several options score higher.
///
/// | count | sub-score |
/// |-------|-----------|
/// | 0     | 0         |
/// | 1     | 50        |
/// | 2–3   | 75        |
/// | 4–6   | 90        |
/// | 7+    | 100       |
#[must_use]
pub const fn count_subscore(count: usize) -> f64 {
    match count {
        0 => 0.0,
        1 => 50.0,
        2..=3 => 75.0,
        4..=6 => 90.0,
        _ => MAX_SCORE,
    }
}

/// Blend the two sub-scores into a category score rounded to two decimals.
///
/// # Examples
/// ```
/// use locality_core::combined_score;
///
/// assert_eq!(combined_score(100.0, 50.0), 85.0);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "weighted blend of sub-scores")]
pub fn combined_score(distance_subscore: f64, count_subscore: f64) -> f64 {
    round2(DISTANCE_SHARE * distance_subscore + COUNT_SHARE * count_subscore)
}
