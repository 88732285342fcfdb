//! Shared fixtures for tests that run the Google Maps adapter against
//! `httpmock`.

use std::path::PathBuf;
use std::time::Duration;

use httpmock::prelude::*;
use locality_core::CategoryTable;
use locality_data::places::{GoogleMapsConfig, GoogleMapsDiscovery};

/// Key configured on every provider under test.
pub const API_KEY: &str = "secret-key-123";

/// Geocoding path served by the mock.
pub const GEOCODE_PATH: &str = "/geocode/json";

/// Nearby Search path served by the mock.
pub const NEARBY_PATH: &str = "/nearbysearch/json";

/// Directory containing canned provider responses.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Read a fixture body by file name.
pub fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|err| {
        panic!("failed to read fixture {path:?}: {err}");
    })
}

/// Provider pointed at `server` with a one-second request timeout.
pub fn discovery_for(server: &MockServer) -> GoogleMapsDiscovery {
    let config = GoogleMapsConfig::new(API_KEY)
        .with_endpoints(server.url(GEOCODE_PATH), server.url(NEARBY_PATH))
        .with_timeout(Duration::from_secs(1));
    GoogleMapsDiscovery::new(config).expect("provider should build")
}

/// Serve Koramangala from the geocoder, one metro station for
/// `subway_station`, and nothing for every other place type of the default
/// table.
pub fn mock_metro_area(server: &MockServer) {
    let geocode = fixture("geocode_koramangala.json");
    server.mock(|when, then| {
        when.method(GET).path(GEOCODE_PATH);
        then.status(200)
            .header("content-type", "application/json")
            .body(geocode);
    });

    let table = CategoryTable::default();
    for place_type in table.iter().flat_map(|definition| &definition.place_types) {
        let body = if place_type == "subway_station" {
            fixture("nearby_metro.json")
        } else {
            fixture("zero_results.json")
        };
        server.mock(|when, then| {
            when.method(GET)
                .path(NEARBY_PATH)
                .query_param("type", place_type.as_str())
                .query_param("key", API_KEY);
            then.status(200)
                .header("content-type", "application/json")
                .body(body);
        });
    }
}
