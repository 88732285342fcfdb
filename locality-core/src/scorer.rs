//! Score each category from its measurement.
//!
//! Scoring is a pure application of the proximity transfer functions
//! with the category's own radii. Categories never
//! influence each other at this step.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    CategoryDefinition, CategoryMeasurement, combined_score, count_subscore, distance_subscore,
};

/// Proximity score for one category.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CategoryScore {
    /// Category identifier.
    pub category_id: String,
    /// Weight copied from the definition for aggregation.
    pub weight: f64,
    /// Combined score in `0..=100`.
    pub score: f64,
    /// Distance component in `0..=100`.
    pub distance_subscore: f64,
    /// Count component in `0..=100`.
    pub count_subscore: f64,
    /// Measurement the score was computed from.
    pub measurement: CategoryMeasurement,
}

/// Score a category measurement with the category's calibration.
///
/// # Examples
/// ```
/// use locality_core::{CategoryMeasurement, CategoryTable, score_category};
///
/// let table = CategoryTable::default();
/// let metro = table.get("metro").expect("default table has metro");
/// let measurement = CategoryMeasurement { nearest_distance_m: Some(900.0), count_in_radius: 1 };
///
/// let scored = score_category(metro, measurement);
/// assert_eq!(scored.distance_subscore, 100.0);
/// assert_eq!(scored.count_subscore, 50.0);
/// assert_eq!(scored.score, 85.0);
/// ```
#[must_use]
pub fn score_category(
    definition: &CategoryDefinition,
    measurement: CategoryMeasurement,
) -> CategoryScore {
    let distance = distance_subscore(
        measurement.nearest_distance_m,
        definition.ideal_radius_m,
        definition.max_radius_m,
    );
    let count = count_subscore(measurement.count_in_radius);
    CategoryScore {
        category_id: definition.id.clone(),
        weight: definition.weight,
        score: combined_score(distance, count),
        distance_subscore: distance,
        count_subscore: count,
        measurement,
    }
}
