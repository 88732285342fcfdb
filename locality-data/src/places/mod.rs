//! Place discovery through the Google Maps web services.
//!
//! [`GoogleMapsDiscovery`] implements [`locality_core::PlaceDiscovery`] on top
//! of the Geocoding API and the Places Nearby Search API. Configuration comes
//! from [`GoogleMapsConfig`], built in code, decoded from JSON, or seeded from
//! the `GOOGLE_MAPS_API_KEY` environment variable.

mod api;
mod provider;

pub use provider::{
    API_KEY_ENV, ConfigError, DEFAULT_COUNTRY, DEFAULT_GEOCODE_URL, DEFAULT_NEARBY_SEARCH_URL,
    DEFAULT_USER_AGENT, GoogleMapsConfig, GoogleMapsDiscovery, PROVIDER_NAME, ProviderBuildError,
    validate_api_key,
};
