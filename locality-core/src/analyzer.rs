//! End-to-end infrastructure analysis of a locality.
//!
//! [`InfrastructureAnalyzer`] runs a linear pipeline per call:
//! geocode, collect, score, aggregate, describe. Only unusable credentials
//! surface as an error. A locality that cannot be geocoded yields the
//! neutral score with a single explanatory insight, and failing discovery
//! queries merely thin out the data they would have contributed.

use std::fmt;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    CategoryCollector, CategoryScore, CategoryTable, CollectorConfig, CredentialError,
    DiscoveryError, NEUTRAL_SCORE, NearbyPlace, PlaceDiscovery, QueryOutcome, ResolvedLocation,
    aggregate, generate_insights, score_category,
};

/// Insight reported when the locality could not be located.
pub const GEOCODE_FALLBACK_INSIGHT: &str = "Could not geocode locality — using neutral score";

/// Errors that prevent an analysis from running at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The discovery adapter's credentials are missing or malformed.
    #[error("discovery credentials are unusable: {0}")]
    Credentials(#[from] CredentialError),
}

/// Pipeline stage, reported in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    /// Resolving the locality to a coordinate.
    Geocoding,
    /// Running discovery queries.
    Collecting,
    /// Scoring each category.
    Scoring,
    /// Combining category scores.
    Aggregating,
    /// Writing insights.
    Insighting,
    /// Result assembled.
    Done,
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Geocoding => "geocoding",
            Self::Collecting => "collecting",
            Self::Scoring => "scoring",
            Self::Aggregating => "aggregating",
            Self::Insighting => "insighting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Why an analysis fell back to the neutral score.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "reason", rename_all = "snake_case"))]
pub enum FallbackReason {
    /// The geocoder found no match for the locality.
    NotFound,
    /// The geocoder could not be reached or answered with an error.
    GeocoderFailed {
        /// Failure reported by the adapter.
        #[cfg_attr(
            feature = "serde",
            serde(serialize_with = "crate::collect::display_error")
        )]
        error: DiscoveryError,
    },
}

/// Score and supporting evidence for one category.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CategoryReport {
    /// Category score and the measurement behind it.
    pub score: CategoryScore,
    /// Deduplicated places ordered by distance, nearest first.
    pub places: Vec<NearbyPlace>,
    /// One outcome per place-type query.
    pub queries: Vec<QueryOutcome>,
}

impl CategoryReport {
    /// Number of place-type queries that failed for this category.
    #[must_use]
    pub fn failed_queries(&self) -> usize {
        QueryOutcome::count_failed(&self.queries)
    }
}

/// Breakdown of a fully scored locality.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AnalysisDetail {
    /// Where the locality resolved to.
    pub location: ResolvedLocation,
    /// Per-category reports in table order.
    pub categories: Vec<CategoryReport>,
    /// Weighted aggregate of the category scores.
    pub final_score: f64,
}

/// How the final score was obtained.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnalysisOutcome {
    /// The pipeline ran to completion.
    Scored(AnalysisDetail),
    /// Geocoding failed and the neutral score was used.
    Neutral(FallbackReason),
}

/// Outcome of [`InfrastructureAnalyzer::analyze`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AnalysisResult {
    /// Locality as supplied by the caller.
    pub locality: String,
    /// City as supplied by the caller.
    pub city: String,
    /// Infrastructure score in `0..=100`.
    pub final_score: f64,
    /// Ordered findings, at most [`MAX_INSIGHTS`](crate::MAX_INSIGHTS).
    pub insights: Vec<String>,
    /// Full breakdown or the fallback reason.
    pub outcome: AnalysisOutcome,
}

impl AnalysisResult {
    fn neutral(locality: &str, city: &str, reason: FallbackReason) -> Self {
        Self {
            locality: locality.to_owned(),
            city: city.to_owned(),
            final_score: NEUTRAL_SCORE,
            insights: vec![GEOCODE_FALLBACK_INSIGHT.to_owned()],
            outcome: AnalysisOutcome::Neutral(reason),
        }
    }

    /// Report whether the neutral fallback was used.
    #[must_use]
    pub const fn is_neutral(&self) -> bool {
        matches!(self.outcome, AnalysisOutcome::Neutral(_))
    }

    /// Detailed breakdown, absent for neutral results.
    #[must_use]
    pub const fn detail(&self) -> Option<&AnalysisDetail> {
        match &self.outcome {
            AnalysisOutcome::Scored(detail) => Some(detail),
            AnalysisOutcome::Neutral(_) => None,
        }
    }

    /// Score of the category `id`, if it was scored.
    #[must_use]
    pub fn category_score(&self, id: &str) -> Option<&CategoryScore> {
        self.detail()?
            .categories
            .iter()
            .map(|report| &report.score)
            .find(|score| score.category_id == id)
    }
}

/// Scores localities using a [`PlaceDiscovery`] adapter.
///
/// The analyzer holds no per-call state, so one instance may serve many
/// localities concurrently when its adapter allows it.
///
/// [`analyze`](Self::analyze) blocks the calling thread until every
/// discovery query has finished. Async callers should run it through
/// `tokio::task::spawn_blocking` rather than on a runtime worker.
///
/// # Examples
///
/// ```
/// use locality_core::test_support::StubDiscovery;
/// use locality_core::{InfrastructureAnalyzer, GEOCODE_FALLBACK_INSIGHT};
///
/// let analyzer = InfrastructureAnalyzer::new(StubDiscovery::new());
/// let (score, insights) = analyzer.score("Atlantis", "Nowhere")?;
///
/// assert_eq!(score, 50.0);
/// assert_eq!(insights, [GEOCODE_FALLBACK_INSIGHT]);
/// # Ok::<(), locality_core::AnalysisError>(())
/// ```
#[derive(Debug)]
pub struct InfrastructureAnalyzer<D> {
    discovery: D,
    table: CategoryTable,
    collector: CollectorConfig,
}

impl<D: PlaceDiscovery> InfrastructureAnalyzer<D> {
    /// Create an analyzer with the standard category table and default
    /// collector settings.
    #[must_use]
    pub fn new(discovery: D) -> Self {
        Self {
            discovery,
            table: CategoryTable::default(),
            collector: CollectorConfig::default(),
        }
    }

    /// Replace the category table.
    #[must_use]
    pub fn with_table(mut self, table: CategoryTable) -> Self {
        self.table = table;
        self
    }

    /// Replace the collector settings.
    #[must_use]
    pub const fn with_collector_config(mut self, config: CollectorConfig) -> Self {
        self.collector = config;
        self
    }

    /// Categories this analyzer scores.
    #[must_use]
    pub const fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Adapter used for geocoding and discovery.
    #[must_use]
    pub const fn discovery(&self) -> &D {
        &self.discovery
    }

    /// Analyse `locality` within `city`.
    ///
    /// # Errors
    /// Returns [`AnalysisError::Credentials`] before any query is issued
    /// when the adapter's credentials are unusable. Every other failure is
    /// absorbed into the result.
    pub fn analyze(&self, locality: &str, city: &str) -> Result<AnalysisResult, AnalysisError> {
        self.discovery.check_credentials()?;
        log::info!("analysing infrastructure for {locality}, {city}");

        enter(locality, AnalysisStage::Geocoding);
        let location = match self.discovery.geocode(locality, city) {
            Ok(Some(location)) => location,
            Ok(None) => {
                log::warn!("could not geocode {locality}, {city}; using neutral score");
                return Ok(AnalysisResult::neutral(
                    locality,
                    city,
                    FallbackReason::NotFound,
                ));
            }
            Err(error) => {
                log::warn!("geocoding {locality}, {city} failed: {error}; using neutral score");
                return Ok(AnalysisResult::neutral(
                    locality,
                    city,
                    FallbackReason::GeocoderFailed { error },
                ));
            }
        };

        enter(locality, AnalysisStage::Collecting);
        let collections = CategoryCollector::new(&self.discovery, self.collector)
            .collect(location.location, &self.table);

        enter(locality, AnalysisStage::Scoring);
        let categories: Vec<CategoryReport> = self
            .table
            .iter()
            .zip(collections)
            .map(|(definition, collection)| CategoryReport {
                score: score_category(definition, collection.measurement),
                places: collection.places,
                queries: collection.queries,
            })
            .collect();
        let scores: Vec<CategoryScore> =
            categories.iter().map(|report| report.score.clone()).collect();

        enter(locality, AnalysisStage::Aggregating);
        let final_score = aggregate(&scores);

        enter(locality, AnalysisStage::Insighting);
        let insights = generate_insights(&scores, final_score);

        enter(locality, AnalysisStage::Done);
        log::info!("{locality}, {city} scored {final_score}");
        Ok(AnalysisResult {
            locality: locality.to_owned(),
            city: city.to_owned(),
            final_score,
            insights,
            outcome: AnalysisOutcome::Scored(AnalysisDetail {
                location,
                categories,
                final_score,
            }),
        })
    }

    /// Analyse `locality` and return only the score and insights.
    ///
    /// # Errors
    /// See [`InfrastructureAnalyzer::analyze`].
    pub fn score(&self, locality: &str, city: &str) -> Result<(f64, Vec<String>), AnalysisError> {
        self.analyze(locality, city)
            .map(|result| (result.final_score, result.insights))
    }
}

fn enter(locality: &str, stage: AnalysisStage) {
    log::debug!("{locality}: {stage}");
}
