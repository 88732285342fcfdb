//! Behavioural tests for [`GoogleMapsDiscovery`].
//!
//! Each scenario points the provider at an `httpmock` server that replays
//! recorded Google Maps responses.

mod support;

use httpmock::prelude::*;
use locality_core::{
    AnalysisError, AnalysisResult, CategoryTable, DiscoveryError, InfrastructureAnalyzer, Place,
    PlaceDiscovery, ResolvedLocation, lat_lng,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::time::Duration;
use support::{API_KEY, GEOCODE_PATH, NEARBY_PATH, discovery_for, fixture, mock_metro_area};

type ServerCell = RefCell<Option<MockServer>>;
type GeocodeCell = RefCell<Option<Result<Option<ResolvedLocation>, DiscoveryError>>>;
type SearchCell = RefCell<Option<Result<Vec<Place>, DiscoveryError>>>;
type AnalysisCell = RefCell<Option<Result<AnalysisResult, AnalysisError>>>;

#[fixture]
fn server() -> ServerCell {
    RefCell::new(None)
}

#[fixture]
fn geocoded() -> GeocodeCell {
    RefCell::new(None)
}

#[fixture]
fn searched() -> SearchCell {
    RefCell::new(None)
}

#[fixture]
fn analysed() -> AnalysisCell {
    RefCell::new(None)
}

/// Start a server answering every request on `path` with `status` and
/// `body` after `delay`.
fn serve(server: &ServerCell, path: &str, status: u16, body: String, delay: Duration) {
    let mock_server = MockServer::start();
    mock_server.mock(|when, then| {
        when.method(GET).path(path);
        then.status(status)
            .header("content-type", "application/json")
            .body(body)
            .delay(delay);
    });
    *server.borrow_mut() = Some(mock_server);
}

fn with_server<T>(server: &ServerCell, run: impl FnOnce(&MockServer) -> T) -> T {
    let guard = server.borrow();
    run(guard.as_ref().expect("server must be started"))
}

fn search_error(searched: &SearchCell) -> DiscoveryError {
    let borrowed = searched.borrow();
    match borrowed.as_ref().expect("a search ran") {
        Err(err) => err.clone(),
        Ok(places) => panic!("expected an error, got {places:?}"),
    }
}

fn analysis(analysed: &AnalysisCell) -> AnalysisResult {
    let borrowed = analysed.borrow();
    match borrowed.as_ref().expect("an analysis ran") {
        Ok(result) => result.clone(),
        Err(err) => panic!("analysis failed: {err}"),
    }
}

// --- Given steps ---

#[given("a maps service that resolves the query and key it receives")]
fn resolving_service(#[from(server)] server: &ServerCell) {
    let mock_server = MockServer::start();
    let body = fixture("geocode_koramangala.json");
    // Requests without the expected parameters fall through to a 404.
    mock_server.mock(|when, then| {
        when.method(GET)
            .path(GEOCODE_PATH)
            .query_param("address", "Koramangala, Bengaluru, India")
            .query_param("key", API_KEY);
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    });
    *server.borrow_mut() = Some(mock_server);
}

#[given("a maps service with no match for the locality")]
fn empty_service(#[from(server)] server: &ServerCell) {
    let body = fixture("zero_results.json");
    serve(server, GEOCODE_PATH, 200, body, Duration::ZERO);
}

#[given("a maps service whose quota is exhausted")]
fn exhausted_service(#[from(server)] server: &ServerCell) {
    let body = fixture("over_query_limit.json");
    serve(server, NEARBY_PATH, 200, body, Duration::ZERO);
}

#[given("a maps service that answers HTTP 429")]
fn throttling_service(#[from(server)] server: &ServerCell) {
    serve(server, NEARBY_PATH, 429, "{}".to_owned(), Duration::ZERO);
}

#[given("a maps service that denies the API key")]
fn denying_service(#[from(server)] server: &ServerCell) {
    let body = fixture("request_denied.json");
    serve(server, NEARBY_PATH, 200, body, Duration::ZERO);
}

#[given("a maps service that fails with HTTP 500")]
fn failing_service(#[from(server)] server: &ServerCell) {
    serve(server, NEARBY_PATH, 500, "{}".to_owned(), Duration::ZERO);
}

#[given("a maps service that answers too slowly")]
fn slow_service(#[from(server)] server: &ServerCell) {
    let body = fixture("zero_results.json");
    serve(server, NEARBY_PATH, 200, body, Duration::from_secs(3));
}

#[given("a maps service with one metro station nearby")]
fn metro_service(#[from(server)] server: &ServerCell) {
    let mock_server = MockServer::start();
    mock_metro_area(&mock_server);
    *server.borrow_mut() = Some(mock_server);
}

// --- When steps ---

#[when("the locality is geocoded")]
fn geocode(#[from(server)] server: &ServerCell, #[from(geocoded)] geocoded: &GeocodeCell) {
    let provider = with_server(server, discovery_for);
    *geocoded.borrow_mut() = Some(provider.geocode("Koramangala", "Bengaluru"));
}

#[when("nearby hospitals are searched")]
fn search_hospitals(#[from(server)] server: &ServerCell, #[from(searched)] searched: &SearchCell) {
    let provider = with_server(server, discovery_for);
    *searched.borrow_mut() =
        Some(provider.search_nearby(lat_lng(12.935, 77.614), "hospital", 8_000.0));
}

#[when("the locality is analysed")]
fn analyse(#[from(server)] server: &ServerCell, #[from(analysed)] analysed: &AnalysisCell) {
    let analyzer = InfrastructureAnalyzer::new(with_server(server, discovery_for));
    *analysed.borrow_mut() = Some(analyzer.analyze("Koramangala", "Bengaluru"));
}

// --- Then steps ---

#[then("the resolved location is returned")]
fn resolved(#[from(geocoded)] geocoded: &GeocodeCell) {
    let borrowed = geocoded.borrow();
    let location = borrowed
        .as_ref()
        .expect("geocoding ran")
        .as_ref()
        .expect("geocoding succeeded")
        .as_ref()
        .expect("location found");
    assert_eq!(location.location, lat_lng(12.935, 77.614));
    assert_eq!(
        location.display_name,
        "Koramangala, Bengaluru, Karnataka, India"
    );
}

#[then("no location is returned")]
fn not_found(#[from(geocoded)] geocoded: &GeocodeCell) {
    let borrowed = geocoded.borrow();
    assert!(
        matches!(borrowed.as_ref(), Some(Ok(None))),
        "expected no location, got {borrowed:?}"
    );
}

#[then("a rate limited error is returned")]
fn rate_limited(#[from(searched)] searched: &SearchCell) {
    let err = search_error(searched);
    assert!(err.is_rate_limited(), "expected RateLimited, got {err:?}");
}

#[then("a service error is returned")]
fn service_error(#[from(searched)] searched: &SearchCell) {
    let err = search_error(searched);
    assert_eq!(
        err,
        DiscoveryError::Service {
            status: "REQUEST_DENIED".to_owned(),
            message: "The provided API key is invalid.".to_owned(),
        }
    );
}

#[then("an HTTP error is returned")]
fn http_error(#[from(searched)] searched: &SearchCell) {
    let err = search_error(searched);
    assert!(
        matches!(err, DiscoveryError::Http { status: 500, .. }),
        "expected Http 500, got {err:?}"
    );
}

#[then("a timeout error is returned")]
fn timeout_error(#[from(searched)] searched: &SearchCell) {
    let err = search_error(searched);
    assert!(
        matches!(err, DiscoveryError::Timeout { timeout_secs: 1, .. }),
        "expected Timeout, got {err:?}"
    );
}

#[then("the error does not reveal the API key")]
fn key_hidden(#[from(searched)] searched: &SearchCell) {
    let err = search_error(searched);
    assert!(!err.to_string().contains(API_KEY), "key leaked: {err}");
    assert!(!format!("{err:?}").contains(API_KEY), "key leaked: {err:?}");
}

#[then("the metro category scores 85.0")]
fn metro_scores(#[from(analysed)] analysed: &AnalysisCell) {
    let result = analysis(analysed);
    let metro = result.category_score("metro").expect("metro scored");
    assert_eq!(metro.score, 85.0);
    assert_eq!(metro.measurement.count_in_radius, 1);
}

#[then("the final score is 21.25")]
fn final_score(#[from(analysed)] analysed: &AnalysisCell) {
    assert_eq!(analysis(analysed).final_score, 21.25);
}

#[then("every place type query succeeded")]
fn every_query_succeeded(#[from(analysed)] analysed: &AnalysisCell) {
    let result = analysis(analysed);
    let detail = result.detail().expect("scored result");
    let queries: usize = detail.categories.iter().map(|report| report.queries.len()).sum();
    assert_eq!(queries, CategoryTable::default().query_count());
    for report in &detail.categories {
        assert_eq!(report.failed_queries(), 0, "{}", report.score.category_id);
    }
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/google_maps.feature", name = $title)]
        fn $fn_name(
            server: ServerCell,
            geocoded: GeocodeCell,
            searched: SearchCell,
            analysed: AnalysisCell,
        ) {
            let _ = (server, geocoded, searched, analysed);
        }
    };
}

register_scenario!(geocoding_known_locality, "geocoding a known locality");
register_scenario!(
    geocoding_without_matches,
    "geocoding a locality without matches"
);
register_scenario!(reporting_exhausted_quota, "reporting an exhausted quota");
register_scenario!(reporting_http_rate_limit, "reporting an HTTP rate limit");
register_scenario!(reporting_denied_request, "reporting a denied request");
register_scenario!(reporting_server_failure, "reporting a server failure");
register_scenario!(reporting_slow_service, "reporting a slow service");
register_scenario!(analysing_end_to_end, "analysing a locality end to end");
