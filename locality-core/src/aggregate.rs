//! Weighted aggregation of category scores.

use crate::{CategoryScore, round2};

/// Score reported when no meaningful signal is available.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Weighted mean of category scores, rounded to two decimals.
///
/// The sum is divided by the total weight of the categories present, so
/// weights need not sum to one. Without categories the neutral
/// [`NEUTRAL_SCORE`] is returned.
///
/// # Examples
/// ```
/// use locality_core::{NEUTRAL_SCORE, aggregate};
///
/// assert_eq!(aggregate(&[]), NEUTRAL_SCORE);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "weighted mean of scores")]
pub fn aggregate(scores: &[CategoryScore]) -> f64 {
    let (weighted_sum, total_weight) = scores
        .iter()
        .fold((0.0_f64, 0.0_f64), |(sum, weight), category| {
            (sum + category.score * category.weight, weight + category.weight)
        });
    if total_weight <= 0.0 {
        return NEUTRAL_SCORE;
    }
    round2(weighted_sum / total_weight)
}
