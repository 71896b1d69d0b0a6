use launcher_core::config::HealthCheckConfig;
use launcher_core::error::launch::LaunchError;
use launcher_core::readiness::health::{check_health, health_url, wait_for_health};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// **VALUE**: Verifies the health poller succeeds against a responding server.
///
/// **WHY THIS MATTERS**: With health confirmation enabled the window waits on this; if it
/// never succeeds every launch stalls for the full budget.
#[tokio::test]
async fn given_healthy_server_when_waiting_then_ok() {
    // GIVEN: A server answering the Streamlit health endpoint
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_stcore/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    // WHEN: Waiting for health
    let result = wait_for_health(&server.uri(), &HealthCheckConfig::default()).await;

    // THEN: Succeeds
    assert!(result.is_ok(), "Expected healthy server: {result:?}");
}

/// **VALUE**: Verifies a server stuck on 503 produces a Timeout within the budget.
///
/// **BUG THIS CATCHES**: Would catch an unbounded retry loop.
#[tokio::test]
async fn given_unhealthy_server_when_waiting_then_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_stcore/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = HealthCheckConfig {
        path: String::from("/_stcore/health"),
        max_wait_secs: 1,
    };

    let result = wait_for_health(&server.uri(), &config).await;

    assert!(matches!(result, Err(LaunchError::Timeout { .. })));
}

#[tokio::test]
async fn given_non_success_status_when_checking_then_false() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(!check_health(&health_url(&server.uri(), "/missing")).await);
}

#[test]
fn given_trailing_slash_when_joining_health_url_then_single_slash() {
    assert_eq!(
        health_url("http://localhost:8501/", "/_stcore/health"),
        "http://localhost:8501/_stcore/health"
    );
}
