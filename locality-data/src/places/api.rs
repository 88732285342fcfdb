//! Google Maps web-service response types.
//!
//! Only the fields the engine consumes are modelled. Both services wrap their
//! payload in a `status` envelope:
//!
//! - `"OK"`: results are present.
//! - `"ZERO_RESULTS"`: the query was valid but matched nothing.
//! - `"OVER_QUERY_LIMIT"`: a quota was exhausted; worth retrying later.
//! - anything else (`"REQUEST_DENIED"`, `"INVALID_REQUEST"`, ...): a
//!   provider-side failure.
//!
//! See <https://developers.google.com/maps/documentation/geocoding/requests-geocoding>
//! and <https://developers.google.com/maps/documentation/places/web-service/search-nearby>.

use locality_core::{DiscoveryError, Place, ResolvedLocation, lat_lng};
use serde::Deserialize;

/// Name used for places the provider returns without one.
const UNKNOWN_PLACE_NAME: &str = "Unknown";

/// Envelope status shared by the Geocoding and Places services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    Other(String),
}

impl ApiStatus {
    pub(crate) fn parse(status: &str) -> Self {
        match status {
            "OK" => Self::Ok,
            "ZERO_RESULTS" => Self::ZeroResults,
            "OVER_QUERY_LIMIT" => Self::OverQueryLimit,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Map the status onto "has results", "no results" or an error.
    fn check(
        self,
        error_message: Option<String>,
        endpoint: &str,
    ) -> Result<bool, DiscoveryError> {
        match self {
            Self::Ok => Ok(true),
            Self::ZeroResults => Ok(false),
            Self::OverQueryLimit => Err(DiscoveryError::RateLimited {
                endpoint: endpoint.to_owned(),
            }),
            Self::Other(status) => Err(DiscoveryError::Service {
                status,
                message: error_message.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    pub location: LatLng,
}

/// Geocoding API response.
#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
}

impl GeocodeResponse {
    /// Resolve the first result, falling back to `query` for the display
    /// name.
    pub(crate) fn into_location(
        self,
        endpoint: &str,
        query: &str,
    ) -> Result<Option<ResolvedLocation>, DiscoveryError> {
        if !ApiStatus::parse(&self.status).check(self.error_message, endpoint)? {
            return Ok(None);
        }
        Ok(self.results.into_iter().next().map(|first| {
            let display_name = first
                .formatted_address
                .unwrap_or_else(|| query.to_owned());
            ResolvedLocation::new(
                lat_lng(first.geometry.location.lat, first.geometry.location.lng),
                display_name,
            )
        }))
    }
}

/// Places Nearby Search response.
#[derive(Debug, Deserialize)]
pub(crate) struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaceResult {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub geometry: Geometry,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub vicinity: Option<String>,
}

impl NearbySearchResponse {
    pub(crate) fn into_places(self, endpoint: &str) -> Result<Vec<Place>, DiscoveryError> {
        if !ApiStatus::parse(&self.status).check(self.error_message, endpoint)? {
            return Ok(Vec::new());
        }
        Ok(self.results.into_iter().map(PlaceResult::into_place).collect())
    }
}

impl PlaceResult {
    fn into_place(self) -> Place {
        let name = self.name.unwrap_or_else(|| UNKNOWN_PLACE_NAME.to_owned());
        let location = lat_lng(self.geometry.location.lat, self.geometry.location.lng);
        let mut place = Place::new(self.place_id, name, location);
        place.rating = self.rating;
        place.vicinity = self.vicinity.filter(|vicinity| !vicinity.is_empty());
        place
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ENDPOINT: &str = "https://maps.example/api/json";

    #[rstest]
    #[case("OK", ApiStatus::Ok)]
    #[case("ZERO_RESULTS", ApiStatus::ZeroResults)]
    #[case("OVER_QUERY_LIMIT", ApiStatus::OverQueryLimit)]
    #[case("REQUEST_DENIED", ApiStatus::Other("REQUEST_DENIED".to_owned()))]
    fn parses_statuses(#[case] raw: &str, #[case] expected: ApiStatus) {
        assert_eq!(ApiStatus::parse(raw), expected);
    }

    #[rstest]
    fn geocode_takes_the_first_result() {
        let json = r#"{
            "status": "OK",
            "results": [
                {
                    "formatted_address": "Koramangala, Bengaluru, Karnataka, India",
                    "geometry": {"location": {"lat": 12.9352, "lng": 77.6245}}
                },
                {
                    "formatted_address": "Elsewhere",
                    "geometry": {"location": {"lat": 1.0, "lng": 2.0}}
                }
            ]
        }"#;
        let response: GeocodeResponse = serde_json::from_str(json).expect("should deserialise");

        let location = response
            .into_location(ENDPOINT, "Koramangala, Bengaluru, India")
            .expect("status OK")
            .expect("location present");

        assert_eq!(location.location, lat_lng(12.9352, 77.6245));
        assert_eq!(
            location.display_name,
            "Koramangala, Bengaluru, Karnataka, India"
        );
    }

    #[rstest]
    fn geocode_defaults_display_name_to_query() {
        let json = r#"{
            "status": "OK",
            "results": [{"geometry": {"location": {"lat": 1.5, "lng": 2.5}}}]
        }"#;
        let response: GeocodeResponse = serde_json::from_str(json).expect("should deserialise");

        let location = response
            .into_location(ENDPOINT, "Whitefield, Bengaluru, India")
            .expect("status OK")
            .expect("location present");

        assert_eq!(location.display_name, "Whitefield, Bengaluru, India");
    }

    #[rstest]
    fn geocode_zero_results_is_not_found() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#)
                .expect("should deserialise");
        assert_eq!(response.into_location(ENDPOINT, "Atlantis"), Ok(None));
    }

    #[rstest]
    fn quota_exhaustion_is_rate_limited() {
        let response: NearbySearchResponse =
            serde_json::from_str(r#"{"status": "OVER_QUERY_LIMIT"}"#).expect("should deserialise");
        assert_eq!(
            response.into_places(ENDPOINT),
            Err(DiscoveryError::RateLimited {
                endpoint: ENDPOINT.to_owned(),
            })
        );
    }

    #[rstest]
    fn denied_request_is_a_service_error() {
        let json = r#"{
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        }"#;
        let response: NearbySearchResponse =
            serde_json::from_str(json).expect("should deserialise");

        let err = response.into_places(ENDPOINT).expect_err("should fail");

        assert_eq!(
            err,
            DiscoveryError::Service {
                status: "REQUEST_DENIED".to_owned(),
                message: "The provided API key is invalid.".to_owned(),
            }
        );
    }

    #[rstest]
    fn nearby_results_become_places() {
        let json = r#"{
            "status": "OK",
            "results": [
                {
                    "place_id": "ChIJ1",
                    "name": "St. John's Hospital",
                    "geometry": {"location": {"lat": 12.93, "lng": 77.62}},
                    "rating": 4.1,
                    "vicinity": "Sarjapur Road"
                },
                {
                    "geometry": {"location": {"lat": 12.94, "lng": 77.61}},
                    "vicinity": ""
                }
            ],
            "next_page_token": "ignored"
        }"#;
        let response: NearbySearchResponse =
            serde_json::from_str(json).expect("should deserialise");

        let places = response.into_places(ENDPOINT).expect("status OK");

        assert_eq!(places.len(), 2);
        let first = places.first().expect("first place");
        assert_eq!(first.id.as_deref(), Some("ChIJ1"));
        assert_eq!(first.rating, Some(4.1));
        assert_eq!(first.vicinity.as_deref(), Some("Sarjapur Road"));
        let second = places.get(1).expect("second place");
        assert_eq!(second.name, "Unknown");
        assert_eq!(second.id, None);
        assert_eq!(second.vicinity, None);
    }
}
