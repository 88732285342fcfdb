//! Core domain logic for the locality infrastructure engine.
//!
//! The crate turns a locality name into a `0..=100` infrastructure score by
//! measuring how close, and how plentiful, everyday facilities are:
//!
//! 1. geocode the locality through a [`PlaceDiscovery`] adapter;
//! 2. search each [`CategoryDefinition`]'s place types within its maximum
//!    radius and deduplicate the answers;
//! 3. score every category from its nearest distance and in-radius count;
//! 4. take the weighted mean and describe the strongest and weakest
//!    categories.
//!
//! Boundaries:
//! - No network access. Concrete adapters live in `locality-data`.
//! - No global state. Tables and settings are injected by value.
//!
//! Invariants:
//! - Scores stay within `0..=100` and are rounded to two decimals.
//! - Category results depend only on that category's own queries.

#![forbid(unsafe_code)]

mod aggregate;
mod analyzer;
mod category;
mod collect;
mod discovery;
mod distance;
mod insight;
mod place;
mod proximity;
mod scorer;

#[doc(hidden)]
pub mod test_support;

pub use aggregate::{NEUTRAL_SCORE, aggregate};
pub use analyzer::{
    AnalysisDetail, AnalysisError, AnalysisOutcome, AnalysisResult, AnalysisStage,
    CategoryReport, FallbackReason, GEOCODE_FALLBACK_INSIGHT, InfrastructureAnalyzer,
};
pub use category::{CategoryDefinition, CategoryError, CategoryTable};
pub use collect::{
    CategoryCollection, CategoryCollector, CategoryMeasurement, CollectorConfig,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_RATE_LIMIT_BACKOFF, NearbyPlace, QueryOutcome, deduplicate,
    measure,
};
pub use discovery::{CredentialError, DiscoveryError, PlaceDiscovery};
pub use distance::{EARTH_RADIUS_M, haversine_distance, lat_lng};
pub use insight::{
    InsightBuilder, MAX_INSIGHTS, ScoreBand, WEAKNESS_THRESHOLD, generate_insights,
    rank_categories,
};
pub use place::{Place, ResolvedLocation};
pub use proximity::{
    COUNT_SHARE, DISTANCE_SHARE, MAX_SCORE, combined_score, count_subscore, distance_subscore,
    round2,
};
pub use scorer::{CategoryScore, score_category};
