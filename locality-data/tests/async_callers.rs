//! Running an analysis from async code.
//!
//! `InfrastructureAnalyzer::analyze` blocks for the whole fan-out, so async
//! callers hand it to the blocking pool.

mod support;

use httpmock::MockServer;
use locality_core::InfrastructureAnalyzer;
use rstest::rstest;
use support::{discovery_for, mock_metro_area};

#[rstest]
fn analysis_runs_on_the_blocking_pool_of_a_multi_thread_runtime() {
    let server = MockServer::start();
    mock_metro_area(&server);
    let analyzer = InfrastructureAnalyzer::new(discovery_for(&server));
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("runtime should build");

    let (analyzer, result) = runtime.block_on(async move {
        tokio::task::spawn_blocking(move || {
            let result = analyzer.analyze("Koramangala", "Bengaluru");
            (analyzer, result)
        })
        .await
        .expect("blocking task should finish")
    });
    drop(runtime);
    drop(analyzer);

    let result = result.expect("credentials valid");
    assert_eq!(result.final_score, 21.25);
    assert!(!result.is_neutral());
}
