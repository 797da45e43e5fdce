//! Tests for health check endpoints.

use axum::http::StatusCode;
use integration_tests::setup::TestContext;
use serde_json::Value;

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let server = TestContext::new().server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body.get("status").is_some(), "Response should have 'status' field");
    assert!(
        body.get("auth_connected").is_some(),
        "Response should have 'auth_connected' field"
    );
    assert_eq!(body["database_connected"], true);

    let status = body["status"].as_str().unwrap_or("");
    assert!(
        status == "healthy" || status == "degraded" || status == "unhealthy",
        "Status should be 'healthy', 'degraded', or 'unhealthy', got '{}'",
        status
    );
}

/// Test /health reports an unreachable store
#[tokio::test]
async fn test_health_reports_store_down() {
    let (ctx, store) = TestContext::flaky();
    store.set_should_fail(true);

    let body: Value = ctx.server().get("/health").await.json();
    assert_eq!(body["database_connected"], false);
    assert_eq!(body["status"], "unhealthy");
}

/// Test /health/live always returns 200
#[tokio::test]
async fn test_liveness_probe() {
    let server = TestContext::new().server();
    server.get("/health/live").await.assert_status(StatusCode::OK);
}

/// Test /health/ready is 200 while the store answers
#[tokio::test]
async fn test_ready_when_store_answers() {
    let server = TestContext::new().server();
    server.get("/health/ready").await.assert_status(StatusCode::OK);
}

/// Test /health/ready is 503 when the store is down
#[tokio::test]
async fn test_not_ready_when_store_down() {
    let (ctx, store) = TestContext::flaky();
    store.set_should_fail(true);

    ctx.server()
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

/// Test a router in mock auth mode reports the auth component healthy
#[tokio::test]
async fn test_mock_auth_reports_healthy() {
    let body: Value = TestContext::new().server().get("/health").await.json();
    assert_eq!(body["auth_connected"], true);
    assert_eq!(body["database_connected"], true);
    assert_eq!(body["status"], "healthy");
}

/// Health routes don't require authentication
#[tokio::test]
async fn test_health_is_public() {
    let server = TestContext::new().server();
    server.get("/health").await.assert_status_ok();
}
