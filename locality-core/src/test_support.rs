//! Test-only, in-memory `PlaceDiscovery` implementation used by unit and
//! behaviour tests.

use std::collections::{HashMap, HashSet};
use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use geo::Coord;

use crate::{CredentialError, DiscoveryError, Place, PlaceDiscovery, ResolvedLocation};

/// Canned geocoding answer.
#[derive(Debug, Clone)]
enum GeocodeResponse {
    Found(ResolvedLocation),
    NotFound,
    Error(DiscoveryError),
}

/// One recorded `search_nearby` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    /// Centre passed by the caller.
    pub center: Coord<f64>,
    /// Place-type tag searched.
    pub place_type: String,
    /// Search radius in meters.
    pub radius_m: f64,
}

/// Deterministic `PlaceDiscovery` serving pre-configured responses.
///
/// Unknown place types return an empty result. Calls are recorded so tests
/// can assert how many queries ran and with which radius.
///
/// # Example
///
/// ```
/// use locality_core::test_support::StubDiscovery;
/// use locality_core::{Place, PlaceDiscovery, ResolvedLocation, lat_lng};
///
/// let stub = StubDiscovery::new()
///     .with_location(ResolvedLocation::new(lat_lng(12.935, 77.614), "Koramangala"))
///     .with_places("hospital", vec![Place::new(None, "Clinic", lat_lng(12.94, 77.61))]);
///
/// let places = stub.search_nearby(lat_lng(12.935, 77.614), "hospital", 8_000.0);
/// assert_eq!(places.map(|p| p.len()), Ok(1));
/// assert_eq!(stub.search_calls(), 1);
/// ```
#[derive(Debug)]
pub struct StubDiscovery {
    geocode: GeocodeResponse,
    places: HashMap<String, Vec<Place>>,
    failures: HashMap<String, DiscoveryError>,
    panics: HashSet<String>,
    rate_limits: Mutex<HashMap<String, usize>>,
    credentials: Option<CredentialError>,
    geocode_calls: AtomicUsize,
    searches: Mutex<Vec<SearchCall>>,
}

impl Default for StubDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl StubDiscovery {
    /// Create a stub whose geocoder finds nothing and whose searches are
    /// empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            geocode: GeocodeResponse::NotFound,
            places: HashMap::new(),
            failures: HashMap::new(),
            panics: HashSet::new(),
            rate_limits: Mutex::new(HashMap::new()),
            credentials: None,
            geocode_calls: AtomicUsize::new(0),
            searches: Mutex::new(Vec::new()),
        }
    }

    /// Resolve every locality to `location`.
    #[must_use]
    pub fn with_location(mut self, location: ResolvedLocation) -> Self {
        self.geocode = GeocodeResponse::Found(location);
        self
    }

    /// Fail every geocoding request with `error`.
    #[must_use]
    pub fn with_geocode_error(mut self, error: DiscoveryError) -> Self {
        self.geocode = GeocodeResponse::Error(error);
        self
    }

    /// Return `places` for searches tagged `place_type`.
    ///
    /// Places are returned verbatim, even when they lie outside the
    /// requested radius.
    #[must_use]
    pub fn with_places(mut self, place_type: impl Into<String>, places: Vec<Place>) -> Self {
        self.places.insert(place_type.into(), places);
        self
    }

    /// Fail every search tagged `place_type` with `error`.
    #[must_use]
    pub fn with_failure(mut self, place_type: impl Into<String>, error: DiscoveryError) -> Self {
        self.failures.insert(place_type.into(), error);
        self
    }

    /// Unwind out of every search tagged `place_type`, as a buggy adapter
    /// would.
    #[must_use]
    pub fn with_panic(mut self, place_type: impl Into<String>) -> Self {
        self.panics.insert(place_type.into());
        self
    }

    /// Reject the first `times` searches tagged `place_type` as rate limited.
    #[must_use]
    pub fn with_rate_limit(self, place_type: impl Into<String>, times: usize) -> Self {
        lock(&self.rate_limits).insert(place_type.into(), times);
        self
    }

    /// Report `error` from [`PlaceDiscovery::check_credentials`].
    #[must_use]
    pub fn with_credential_error(mut self, error: CredentialError) -> Self {
        self.credentials = Some(error);
        self
    }

    /// Number of geocoding requests received.
    #[must_use]
    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    /// Number of search requests received.
    #[must_use]
    pub fn search_calls(&self) -> usize {
        lock(&self.searches).len()
    }

    /// Recorded searches in arrival order.
    #[must_use]
    pub fn searches(&self) -> Vec<SearchCall> {
        lock(&self.searches).clone()
    }

    fn take_rate_limit(&self, place_type: &str) -> bool {
        let mut remaining = lock(&self.rate_limits);
        match remaining.get_mut(place_type) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

impl PlaceDiscovery for StubDiscovery {
    fn check_credentials(&self) -> Result<(), CredentialError> {
        self.credentials.clone().map_or(Ok(()), Err)
    }

    fn geocode(
        &self,
        _locality: &str,
        _region: &str,
    ) -> Result<Option<ResolvedLocation>, DiscoveryError> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        match &self.geocode {
            GeocodeResponse::Found(location) => Ok(Some(location.clone())),
            GeocodeResponse::NotFound => Ok(None),
            GeocodeResponse::Error(error) => Err(error.clone()),
        }
    }

    fn search_nearby(
        &self,
        center: Coord<f64>,
        place_type: &str,
        radius_m: f64,
    ) -> Result<Vec<Place>, DiscoveryError> {
        lock(&self.searches).push(SearchCall {
            center,
            place_type: place_type.to_owned(),
            radius_m,
        });
        if self.panics.contains(place_type) {
            panic::resume_unwind(Box::new(format!("stub search for {place_type} failed")));
        }
        if self.take_rate_limit(place_type) {
            return Err(DiscoveryError::RateLimited {
                endpoint: "stub://nearby".to_owned(),
            });
        }
        if let Some(error) = self.failures.get(place_type) {
            return Err(error.clone());
        }
        Ok(self.places.get(place_type).cloned().unwrap_or_default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
