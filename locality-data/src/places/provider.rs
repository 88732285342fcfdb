//! `PlaceDiscovery` backed by the Google Maps Geocoding and Places APIs.
//!
//! # Architecture
//!
//! [`PlaceDiscovery`] is synchronous so the core stays embeddable in
//! synchronous contexts and can fan queries out over worker threads. This
//! provider bridges to the async HTTP client by blocking on a Tokio runtime
//! it owns, or on the caller's multi-threaded runtime when one is active.
//!
//! Every request carries the API key as a query parameter. Errors only ever
//! report the endpoint without its query string, so the key never leaks into
//! logs.
//!
//! # Example
//!
//! ```no_run
//! use locality_core::{PlaceDiscovery, lat_lng};
//! use locality_data::places::{GoogleMapsConfig, GoogleMapsDiscovery};
//!
//! let config = GoogleMapsConfig::from_env()?;
//! let provider = GoogleMapsDiscovery::new(config)?;
//!
//! if let Some(found) = provider.geocode("Koramangala", "Bengaluru")? {
//!     let hospitals = provider.search_nearby(found.location, "hospital", 8_000.0)?;
//!     println!("{} hospitals near {}", hospitals.len(), found.display_name);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::future::Future;
use std::time::Duration;

use geo::Coord;
use locality_core::{CredentialError, DiscoveryError, Place, PlaceDiscovery, ResolvedLocation};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::api::{GeocodeResponse, NearbySearchResponse};

/// Provider name reported in credential errors.
pub const PROVIDER_NAME: &str = "google-maps";

/// Environment variable read by [`GoogleMapsConfig::from_env`].
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Default Geocoding API endpoint.
pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Default Places Nearby Search endpoint.
pub const DEFAULT_NEARBY_SEARCH_URL: &str =
    "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

/// Default country appended to geocoding queries.
pub const DEFAULT_COUNTRY: &str = "India";

/// Default user agent for API requests.
pub const DEFAULT_USER_AGENT: &str = "locality-engine/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of runtime worker threads.
const DEFAULT_WORKER_THREADS: usize = 2;

/// Errors raised while loading a [`GoogleMapsConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be decoded.
    #[error("failed to parse Google Maps configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A required environment variable was absent or not valid Unicode.
    #[error("environment variable {name} is not usable: {source}")]
    Env {
        /// Variable name.
        name: &'static str,
        /// Underlying lookup failure.
        source: std::env::VarError,
    },
}

/// Errors raised while constructing a [`GoogleMapsDiscovery`].
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// The API key is missing or malformed.
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    /// A configured endpoint is not a valid absolute URL.
    #[error("invalid endpoint {url}: {source}")]
    InvalidUrl {
        /// Offending URL.
        url: String,
        /// Parser failure.
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`GoogleMapsDiscovery`].
///
/// Deserialises from JSON with every field optional except in practice the
/// key; `timeout_secs` holds the per-request timeout in whole seconds.
///
/// ```
/// use std::time::Duration;
/// use locality_data::places::GoogleMapsConfig;
///
/// let config = GoogleMapsConfig::from_json(r#"{"api_key": "abc123", "timeout_secs": 5}"#)?;
/// assert_eq!(config.timeout, Duration::from_secs(5));
/// assert_eq!(config.country, "India");
/// # Ok::<(), locality_data::places::ConfigError>(())
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoogleMapsConfig {
    /// Google Maps API key with Geocoding and Places enabled.
    pub api_key: String,
    /// Geocoding endpoint.
    pub geocode_url: String,
    /// Places Nearby Search endpoint.
    pub nearby_search_url: String,
    /// Country appended to every geocoding query.
    pub country: String,
    /// Per-request timeout.
    #[serde(rename = "timeout_secs", deserialize_with = "duration_from_secs")]
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Worker threads of the provider's own Tokio runtime.
    pub worker_threads: usize,
}

fn duration_from_secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}

impl Default for GoogleMapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            geocode_url: DEFAULT_GEOCODE_URL.to_owned(),
            nearby_search_url: DEFAULT_NEARBY_SEARCH_URL.to_owned(),
            country: DEFAULT_COUNTRY.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            worker_threads: DEFAULT_WORKER_THREADS,
        }
    }
}

impl std::fmt::Debug for GoogleMapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("GoogleMapsConfig")
            .field("api_key", &key)
            .field("geocode_url", &self.geocode_url)
            .field("nearby_search_url", &self.nearby_search_url)
            .field("country", &self.country)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("worker_threads", &self.worker_threads)
            .finish()
    }
}

impl GoogleMapsConfig {
    /// Create a configuration with the given API key and default endpoints.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Read the API key from [`API_KEY_ENV`].
    ///
    /// # Errors
    /// Returns [`ConfigError::Env`] when the variable is unset or not valid
    /// Unicode.
    pub fn from_env() -> Result<Self, ConfigError> {
        std::env::var(API_KEY_ENV)
            .map(Self::new)
            .map_err(|source| ConfigError::Env {
                name: API_KEY_ENV,
                source,
            })
    }

    /// Decode a configuration from JSON, defaulting absent fields.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Override both endpoints, e.g. to target a proxy.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        geocode_url: impl Into<String>,
        nearby_search_url: impl Into<String>,
    ) -> Self {
        self.geocode_url = geocode_url.into();
        self.nearby_search_url = nearby_search_url.into();
        self
    }

    /// Set the country appended to geocoding queries.
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the number of runtime worker threads. Zero is treated as one.
    #[must_use]
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }
}

/// Check that `api_key` looks like a Google Maps key.
///
/// Keys are URL-safe tokens: ASCII letters, digits, `-` and `_`. The key
/// itself is never echoed back in the error.
///
/// # Errors
/// Returns [`CredentialError::Missing`] for a blank key and
/// [`CredentialError::Malformed`] for any other character.
pub fn validate_api_key(api_key: &str) -> Result<(), CredentialError> {
    if api_key.trim().is_empty() {
        return Err(CredentialError::Missing {
            provider: PROVIDER_NAME,
        });
    }
    match api_key
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_'))
    {
        Some((position, _)) => Err(CredentialError::Malformed {
            provider: PROVIDER_NAME,
            reason: format!("unexpected character at position {position}"),
        }),
        None => Ok(()),
    }
}

/// Google Maps implementation of [`PlaceDiscovery`].
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime, and inside a `current_thread` runtime, requests
/// run on the provider's own multi-threaded runtime. Inside a multi-threaded
/// runtime the caller's handle is used through
/// [`tokio::task::block_in_place`].
///
/// The provider is `Send + Sync`; concurrent searches share one connection
/// pool.
pub struct GoogleMapsDiscovery {
    client: Client,
    config: GoogleMapsConfig,
    geocode_endpoint: Url,
    nearby_endpoint: Url,
    runtime: Runtime,
}

impl std::fmt::Debug for GoogleMapsDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMapsDiscovery")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl GoogleMapsDiscovery {
    /// Create a provider with the given API key and default settings.
    ///
    /// # Errors
    /// See [`GoogleMapsDiscovery::new`].
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::new(GoogleMapsConfig::new(api_key))
    }

    /// Create a provider from explicit configuration.
    ///
    /// # Errors
    /// Returns an error when the key is unusable, an endpoint is not a valid
    /// URL, or the HTTP client or Tokio runtime fails to build.
    pub fn new(config: GoogleMapsConfig) -> Result<Self, ProviderBuildError> {
        validate_api_key(&config.api_key)?;
        let geocode_endpoint = parse_endpoint(&config.geocode_url)?;
        let nearby_endpoint = parse_endpoint(&config.nearby_search_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads.max(1))
            .thread_name("locality-maps")
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            geocode_endpoint,
            nearby_endpoint,
            runtime,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &GoogleMapsConfig {
        &self.config
    }

    /// Free-text geocoding query for a locality.
    fn geocode_query(&self, locality: &str, region: &str) -> String {
        format!("{locality}, {region}, {}", self.config.country)
    }

    fn geocode_request_url(&self, query: &str) -> Url {
        let mut url = self.geocode_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("address", query)
            .append_pair("key", &self.config.api_key);
        url
    }

    fn nearby_request_url(&self, center: Coord<f64>, place_type: &str, radius_m: f64) -> Url {
        let mut url = self.nearby_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("location", &format!("{},{}", center.y, center.x))
            .append_pair("radius", &format!("{radius_m:.0}"))
            .append_pair("type", place_type)
            .append_pair("key", &self.config.api_key);
        url
    }

    async fn geocode_async(
        &self,
        locality: &str,
        region: &str,
    ) -> Result<Option<ResolvedLocation>, DiscoveryError> {
        let query = self.geocode_query(locality, region);
        let endpoint = self.geocode_endpoint.as_str();
        let response: GeocodeResponse = self
            .fetch_json(self.geocode_request_url(&query), endpoint)
            .await?;
        let location = response.into_location(endpoint, &query)?;
        if location.is_none() {
            log::debug!("no geocoding results for {query}");
        }
        Ok(location)
    }

    async fn search_nearby_async(
        &self,
        center: Coord<f64>,
        place_type: &str,
        radius_m: f64,
    ) -> Result<Vec<Place>, DiscoveryError> {
        let endpoint = self.nearby_endpoint.as_str();
        let response: NearbySearchResponse = self
            .fetch_json(self.nearby_request_url(center, place_type, radius_m), endpoint)
            .await?;
        response.into_places(endpoint)
    }

    /// Issue a GET and decode its JSON body.
    ///
    /// `endpoint` is the key-free URL reported in errors.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: Url,
        endpoint: &str,
    ) -> Result<T, DiscoveryError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, endpoint))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(DiscoveryError::RateLimited {
                endpoint: endpoint.to_owned(),
            });
        }

        response
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, endpoint))?
            .json()
            .await
            .map_err(|err| DiscoveryError::Parse {
                message: err.without_url().to_string(),
            })
    }

    /// Convert a reqwest error to a [`DiscoveryError`], stripping the request
    /// URL and with it the key.
    fn convert_reqwest_error(&self, error: reqwest::Error, endpoint: &str) -> DiscoveryError {
        if error.is_timeout() {
            return DiscoveryError::Timeout {
                endpoint: endpoint.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return DiscoveryError::Http {
                endpoint: endpoint.to_owned(),
                status: status.as_u16(),
                message: error.without_url().to_string(),
            };
        }

        DiscoveryError::Network {
            endpoint: endpoint.to_owned(),
            message: error.without_url().to_string(),
        }
    }

    /// Drive `future` to completion from synchronous code.
    ///
    /// `block_in_place` requires a multi-threaded runtime; inside a
    /// `current_thread` runtime the provider's own runtime is used instead.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ProviderBuildError> {
    let mut url = Url::parse(raw).map_err(|source| ProviderBuildError::InvalidUrl {
        url: raw.to_owned(),
        source,
    })?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

impl PlaceDiscovery for GoogleMapsDiscovery {
    fn check_credentials(&self) -> Result<(), CredentialError> {
        validate_api_key(&self.config.api_key)
    }

    fn geocode(
        &self,
        locality: &str,
        region: &str,
    ) -> Result<Option<ResolvedLocation>, DiscoveryError> {
        self.block_on(self.geocode_async(locality, region))
    }

    fn search_nearby(
        &self,
        center: Coord<f64>,
        place_type: &str,
        radius_m: f64,
    ) -> Result<Vec<Place>, DiscoveryError> {
        self.block_on(self.search_nearby_async(center, place_type, radius_m))
    }
}
