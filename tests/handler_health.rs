mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use shortener_service::api::handlers::health_handler;
use shortener_service::infrastructure::persistence::MemoryUrlRepository;
use shortener_service::state::AppState;
use std::sync::Arc;

fn server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let (state, _rx) = common::create_test_state();
    let server = server(state);

    let response = server.get("/api/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["event_queue"]["status"], "ok");
    assert_eq!(json["checks"]["event_transport"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let (state, _rx) = common::create_test_state();
    let server = server(state);

    let response = server.get("/api/health").await;

    let json = response.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("store").is_some());
    assert!(json["checks"].get("event_queue").is_some());
    assert!(json["checks"].get("event_transport").is_some());
}

#[tokio::test]
async fn test_health_degraded_when_store_down() {
    let (state, _rx) = common::create_state_with(
        Arc::new(common::UnavailableRepository),
        Arc::new(common::RecordingPublisher::default()),
    );
    let server = server(state);

    let response = server.get("/api/health").await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["store"]["status"], "error");
}

#[tokio::test]
async fn test_health_degraded_when_transport_down() {
    let (state, _rx) = common::create_state_with(
        Arc::new(MemoryUrlRepository::new()),
        Arc::new(common::RecordingPublisher::failing()),
    );
    let server = server(state);

    let response = server.get("/api/health").await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["checks"]["event_transport"]["status"], "error");
    assert_eq!(json["checks"]["store"]["status"], "ok");
}

#[tokio::test]
async fn test_health_degraded_when_event_queue_closed() {
    let (state, rx) = common::create_test_state();
    drop(rx);
    let server = server(state);

    let response = server.get("/api/health").await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["checks"]["event_queue"]["status"], "error");
}
