//! Gather and measure the places around a locality, category by category.
//!
//! Every (category, place-type) pair becomes one discovery query issued with
//! the category's maximum radius. Answers are merged per category, collapsed
//! by [`Place::dedup_key`], and reduced to a [`CategoryMeasurement`].
//!
//! A failing query never aborts collection. Quota rejections are retried
//! once after [`CollectorConfig::rate_limit_backoff`]; anything still failing
//! contributes no places and is reported as [`QueryOutcome::Failed`].

mod pool;

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

use geo::Coord;

#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

use crate::{
    CategoryDefinition, CategoryTable, DiscoveryError, Place, PlaceDiscovery, haversine_distance,
};

/// Default number of discovery queries in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 6;

/// Default pause before retrying a rate-limited query.
pub const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_millis(500);

/// Proximity measurement for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CategoryMeasurement {
    /// Distance in meters to the closest place, `None` when nothing was
    /// found.
    pub nearest_distance_m: Option<f64>,
    /// Number of places within the category's maximum radius.
    pub count_in_radius: usize,
}

/// A deduplicated place together with its distance from the locality.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NearbyPlace {
    /// The discovered place.
    pub place: Place,
    /// Great-circle distance from the locality in meters.
    pub distance_m: f64,
}

/// Result of one discovery query.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", rename_all = "snake_case"))]
pub enum QueryOutcome {
    /// The query returned places.
    Found {
        /// Place-type tag searched.
        place_type: String,
        /// Number of places returned, before deduplication.
        count: usize,
    },
    /// The query succeeded but nothing of that type is nearby.
    Empty {
        /// Place-type tag searched.
        place_type: String,
    },
    /// The query failed and was treated as returning nothing.
    Failed {
        /// Place-type tag searched.
        place_type: String,
        /// Failure reported by the provider.
        #[cfg_attr(feature = "serde", serde(serialize_with = "display_error"))]
        error: DiscoveryError,
    },
}

impl QueryOutcome {
    /// Place-type tag the query searched for.
    #[must_use]
    pub fn place_type(&self) -> &str {
        match self {
            Self::Found { place_type, .. }
            | Self::Empty { place_type }
            | Self::Failed { place_type, .. } => place_type,
        }
    }

    /// Report whether the query failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Count the failed outcomes in `queries`.
    #[must_use]
    pub fn count_failed(queries: &[Self]) -> usize {
        queries.iter().filter(|query| query.is_failed()).count()
    }
}

#[cfg(feature = "serde")]
pub(crate) fn display_error<S: Serializer>(
    error: &DiscoveryError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Everything gathered for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCollection {
    /// Category identifier.
    pub category_id: String,
    /// Deduplicated places ordered by distance, nearest first.
    pub places: Vec<NearbyPlace>,
    /// Measurement derived from `places`.
    pub measurement: CategoryMeasurement,
    /// One outcome per place-type tag, in tag order.
    pub queries: Vec<QueryOutcome>,
}

impl CategoryCollection {
    /// Number of queries for this category that failed.
    #[must_use]
    pub fn failed_queries(&self) -> usize {
        QueryOutcome::count_failed(&self.queries)
    }
}

/// Tuning for the collector's fan-out.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use std::time::Duration;
/// use locality_core::CollectorConfig;
///
/// let config = CollectorConfig::default()
///     .with_max_concurrency(NonZeroUsize::MIN)
///     .with_rate_limit_backoff(Duration::ZERO);
/// assert_eq!(config.max_concurrency.get(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Upper bound on queries in flight. `1` runs the queries one at a
    /// time.
    pub max_concurrency: NonZeroUsize,
    /// Pause before the single retry of a rate-limited query.
    pub rate_limit_backoff: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: NonZeroUsize::new(DEFAULT_MAX_CONCURRENCY)
                .unwrap_or(NonZeroUsize::MIN),
            rate_limit_backoff: DEFAULT_RATE_LIMIT_BACKOFF,
        }
    }
}

impl CollectorConfig {
    /// Override the number of concurrent queries.
    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: NonZeroUsize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Override the rate-limit backoff.
    #[must_use]
    pub const fn with_rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.rate_limit_backoff = backoff;
        self
    }
}

/// Drop repeated places, keeping the first occurrence of each
/// [`Place::dedup_key`].
///
/// # Examples
/// ```
/// use locality_core::{Place, deduplicate, lat_lng};
///
/// let station = Place::new(Some("p1".into()), "Central", lat_lng(0.0, 0.0));
/// let merged = deduplicate(vec![station.clone(), station]);
/// assert_eq!(merged.len(), 1);
/// ```
#[must_use]
pub fn deduplicate(places: Vec<Place>) -> Vec<Place> {
    let mut seen = HashSet::new();
    places
        .into_iter()
        .filter(|place| seen.insert(place.dedup_key().to_owned()))
        .collect()
}

/// Measure a set of places as seen from `center`.
///
/// The nearest distance considers every place; the count only those within
/// `max_radius_m`, inclusive.
#[must_use]
pub fn measure(center: Coord<f64>, places: &[Place], max_radius_m: f64) -> CategoryMeasurement {
    measure_distances(
        places
            .iter()
            .map(|place| haversine_distance(center, place.location)),
        max_radius_m,
    )
}

fn measure_distances(
    distances: impl IntoIterator<Item = f64>,
    max_radius_m: f64,
) -> CategoryMeasurement {
    distances
        .into_iter()
        .fold(CategoryMeasurement::default(), |acc, distance| {
            CategoryMeasurement {
                nearest_distance_m: Some(
                    acc.nearest_distance_m
                        .map_or(distance, |nearest| nearest.min(distance)),
                ),
                count_in_radius: acc.count_in_radius + usize::from(distance <= max_radius_m),
            }
        })
}

/// One scheduled discovery query.
#[derive(Debug)]
struct QueryJob<'a> {
    category_id: &'a str,
    place_type: &'a str,
    radius_m: f64,
}

/// Issues the discovery queries for a category table and assembles the
/// per-category collections.
#[derive(Debug)]
pub struct CategoryCollector<'a, D> {
    discovery: &'a D,
    config: CollectorConfig,
}

impl<'a, D: PlaceDiscovery> CategoryCollector<'a, D> {
    /// Create a collector over `discovery`.
    #[must_use]
    pub const fn new(discovery: &'a D, config: CollectorConfig) -> Self {
        Self { discovery, config }
    }

    /// Collect every category of `table` around `center`.
    ///
    /// The result is in table order and has one entry per category, even
    /// when every query failed.
    #[must_use]
    pub fn collect(&self, center: Coord<f64>, table: &CategoryTable) -> Vec<CategoryCollection> {
        let jobs: Vec<QueryJob<'_>> = table
            .iter()
            .flat_map(|definition| {
                definition.place_types.iter().map(move |place_type| QueryJob {
                    category_id: &definition.id,
                    place_type,
                    radius_m: definition.max_radius_m,
                })
            })
            .collect();

        let answers = pool::run_bounded(&jobs, self.config.max_concurrency, |job| {
            self.run_query(center, job)
        });

        let mut finished = jobs.iter().zip(answers);
        table
            .iter()
            .map(|definition| {
                let tagged = finished
                    .by_ref()
                    .take(definition.place_types.len())
                    .map(|(job, answer)| (job.place_type, answer));
                assemble(center, definition, tagged)
            })
            .collect()
    }

    fn run_query(
        &self,
        center: Coord<f64>,
        job: &QueryJob<'_>,
    ) -> Result<Vec<Place>, DiscoveryError> {
        match self
            .discovery
            .search_nearby(center, job.place_type, job.radius_m)
        {
            Err(error) if error.is_rate_limited() => {
                log::debug!(
                    "{} query for {} rate limited, retrying in {:?}",
                    job.category_id,
                    job.place_type,
                    self.config.rate_limit_backoff
                );
                thread::sleep(self.config.rate_limit_backoff);
                self.discovery
                    .search_nearby(center, job.place_type, job.radius_m)
            }
            answer => answer,
        }
    }
}

type Answer = Option<Result<Vec<Place>, DiscoveryError>>;

fn assemble<'t>(
    center: Coord<f64>,
    definition: &CategoryDefinition,
    tagged: impl Iterator<Item = (&'t str, Answer)>,
) -> CategoryCollection {
    let mut merged = Vec::new();
    let mut queries = Vec::with_capacity(definition.place_types.len());
    for (tag, answer) in tagged {
        let place_type = tag.to_owned();
        let result = answer.unwrap_or_else(|| {
            Err(DiscoveryError::Interrupted {
                place_type: place_type.clone(),
            })
        });
        match result {
            Ok(places) if places.is_empty() => {
                log::debug!("{}: no {} nearby", definition.id, place_type);
                queries.push(QueryOutcome::Empty { place_type });
            }
            Ok(places) => {
                log::debug!("{}: {} {} found", definition.id, places.len(), place_type);
                queries.push(QueryOutcome::Found {
                    place_type,
                    count: places.len(),
                });
                merged.extend(places);
            }
            Err(error) => {
                log::warn!(
                    "{} query for {} degraded to no results: {error}",
                    definition.id,
                    place_type
                );
                queries.push(QueryOutcome::Failed { place_type, error });
            }
        }
    }

    let mut places: Vec<NearbyPlace> = deduplicate(merged)
        .into_iter()
        .map(|place| NearbyPlace {
            distance_m: haversine_distance(center, place.location),
            place,
        })
        .collect();
    places.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    let measurement = measure_distances(
        places.iter().map(|nearby| nearby.distance_m),
        definition.max_radius_m,
    );

    CategoryCollection {
        category_id: definition.id.clone(),
        places,
        measurement,
        queries,
    }
}
