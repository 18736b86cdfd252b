//! Integration tests for the forwarding sink client.

use iotgate_core::{InboundEvent, LogEntry};
use iotgate_upstream::{ClientConfig, SinkClient, UpstreamError};
use serde_json::json;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn test_event() -> iotgate_core::NormalizedEvent {
    InboundEvent {
        event_id: "SESSION_START-123".into(),
        event_type: "SESSION_START".into(),
        timestamp: "2010-01-07T01:20:55.685Z".into(),
        signature: "sig".into(),
        data: String::new(),
    }
    .normalize("8901311242888845458".into(), json!({"iccid": "8901311242888845458"}))
}

fn test_client(base_url: &str) -> SinkClient {
    SinkClient::new(base_url, &ClientConfig::default()).expect("build sink client")
}

#[tokio::test]
async fn forward_posts_serialized_event() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/events"))
        .and(matchers::body_partial_json(json!({
            "eventId": "SESSION_START-123",
            "device": "8901311242888845458",
            "data": {"iccid": "8901311242888845458"}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.forward(&test_event()).await.expect("forward");
}

#[tokio::test]
async fn log_entries_go_to_the_logs_path() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/logs"))
        .and(matchers::body_partial_json(json!({
            "device": "8901311242888845458"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.write_log(&LogEntry::access_denied("8901311242888845458")).await.expect("log");
}

#[tokio::test]
async fn sink_rejection_surfaces_as_error() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.forward(&test_event()).await.unwrap_err();

    assert!(matches!(err, UpstreamError::UnexpectedStatus { status: 503, .. }));
}

#[tokio::test]
async fn forward_and_log_fail_independently() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/events"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/logs"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());

    client.forward(&test_event()).await.expect("forward succeeds");
    assert!(client.write_log(&LogEntry::access_denied("dev")).await.is_err());
}
