//! Human-readable findings derived from a scored locality.
//!
//! Insights are assembled in fixed phases: one overall assessment, the two
//! strongest categories, then up to two weak categories. The list is capped
//! at [`MAX_INSIGHTS`] entries.

use crate::CategoryScore;

/// Maximum number of insights reported for a locality.
pub const MAX_INSIGHTS: usize = 5;

/// Number of categories highlighted as strengths.
const STRENGTH_SLOTS: usize = 2;

/// Number of categories inspected as potential weaknesses.
const WEAKNESS_SLOTS: usize = 2;

/// Category scores below this value are reported as weaknesses.
pub const WEAKNESS_THRESHOLD: f64 = 50.0;

/// Quality band of a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// `>= 80`.
    Excellent,
    /// `>= 60`.
    Good,
    /// `>= 40`.
    Moderate,
    /// Below 40.
    Poor,
}

impl ScoreBand {
    /// Classify a final score.
    ///
    /// # Examples
    /// ```
    /// use locality_core::ScoreBand;
    ///
    /// assert_eq!(ScoreBand::from_score(80.0), ScoreBand::Excellent);
    /// assert_eq!(ScoreBand::from_score(79.99), ScoreBand::Good);
    /// assert_eq!(ScoreBand::from_score(12.0), ScoreBand::Poor);
    /// ```
    #[must_use]
    pub const fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Moderate
        } else {
            Self::Poor
        }
    }

    /// Overall assessment sentence embedding `score` as computed.
    #[must_use]
    pub fn describe(self, score: f64) -> String {
        match self {
            Self::Excellent => {
                format!("Excellent infrastructure connectivity (score: {score:?}/100)")
            }
            Self::Good => {
                format!("Good infrastructure with room for improvement (score: {score:?}/100)")
            }
            Self::Moderate => {
                format!("Moderate infrastructure — some gaps exist (score: {score:?}/100)")
            }
            Self::Poor => format!("Poor infrastructure connectivity (score: {score:?}/100)"),
        }
    }
}

/// Order categories by score, best first. Equal scores keep their input
/// order.
#[must_use]
pub fn rank_categories(scores: &[CategoryScore]) -> Vec<&CategoryScore> {
    let mut ranked: Vec<&CategoryScore> = scores.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Incremental insight list with explicit phases.
///
/// Phases may be skipped but are always emitted in the order they are
/// called; [`InsightBuilder::build`] applies the [`MAX_INSIGHTS`] cap.
///
/// # Examples
/// ```
/// use locality_core::InsightBuilder;
///
/// let insights = InsightBuilder::new(&[], 50.0).overall().build();
/// assert_eq!(insights, ["Moderate infrastructure — some gaps exist (score: 50.0/100)"]);
/// ```
#[derive(Debug, Clone)]
pub struct InsightBuilder<'a> {
    ranked: Vec<&'a CategoryScore>,
    final_score: f64,
    insights: Vec<String>,
}

impl<'a> InsightBuilder<'a> {
    /// Start a builder for `scores` aggregated into `final_score`.
    #[must_use]
    pub fn new(scores: &'a [CategoryScore], final_score: f64) -> Self {
        Self {
            ranked: rank_categories(scores),
            final_score,
            insights: Vec::with_capacity(MAX_INSIGHTS),
        }
    }

    /// Add the overall assessment for the final score.
    #[must_use]
    pub fn overall(mut self) -> Self {
        let band = ScoreBand::from_score(self.final_score);
        self.insights.push(band.describe(self.final_score));
        self
    }

    /// Add the two highest-ranked categories.
    #[must_use]
    pub fn strengths(mut self) -> Self {
        for category in self.ranked.iter().take(STRENGTH_SLOTS) {
            let nearest = category
                .measurement
                .nearest_distance_m
                .map_or_else(|| "unknown distance".to_owned(), whole_meters);
            self.insights.push(format!(
                "Strong {} access: {} options, nearest at {nearest}",
                category.category_id, category.measurement.count_in_radius
            ));
        }
        self
    }

    /// Add the two lowest-ranked categories, when they score below
    /// [`WEAKNESS_THRESHOLD`].
    #[must_use]
    pub fn weaknesses(mut self) -> Self {
        let start = self.ranked.len().saturating_sub(WEAKNESS_SLOTS);
        for category in self.ranked.iter().skip(start) {
            if category.score >= WEAKNESS_THRESHOLD {
                continue;
            }
            let detail = category
                .measurement
                .nearest_distance_m
                .map_or_else(
                    || "none found nearby".to_owned(),
                    |distance| format!("{} away", whole_meters(distance)),
                );
            self.insights.push(format!(
                "Limited {} access: {detail}",
                category.category_id
            ));
        }
        self
    }

    /// Finish the list, keeping at most [`MAX_INSIGHTS`] entries.
    #[must_use]
    pub fn build(mut self) -> Vec<String> {
        self.insights.truncate(MAX_INSIGHTS);
        self.insights
    }
}

fn whole_meters(distance_m: f64) -> String {
    format!("{:.0}m", distance_m.trunc())
}

/// Produce the standard insight list: overall assessment, strengths,
/// weaknesses.
///
/// # Examples
/// ```
/// use locality_core::{CategoryMeasurement, CategoryTable, generate_insights, score_category};
///
/// let table = CategoryTable::default();
/// let metro = table.get("metro").expect("default table has metro");
/// let measurement = CategoryMeasurement { nearest_distance_m: Some(900.0), count_in_radius: 1 };
/// let scores = [score_category(metro, measurement)];
///
/// let insights = generate_insights(&scores, 85.0);
/// assert_eq!(insights[0], "Excellent infrastructure connectivity (score: 85.0/100)");
/// assert_eq!(insights[1], "Strong metro access: 1 options, nearest at 900m");
/// ```
#[must_use]
pub fn generate_insights(scores: &[CategoryScore], final_score: f64) -> Vec<String> {
    InsightBuilder::new(scores, final_score)
        .overall()
        .strengths()
        .weaknesses()
        .build()
}
