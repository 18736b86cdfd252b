//! Integration tests for the device registry client.
//!
//! Exercises the authorization contract: present records, the three shapes
//! of "not registered", and the error outcomes that must stay distinct
//! from a denial.

use iotgate_upstream::{ClientConfig, RegistryClient, UpstreamError};
use serde_json::json;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> RegistryClient {
    RegistryClient::new(base_url, &ClientConfig::default()).expect("build registry client")
}

#[tokio::test]
async fn known_device_returns_record() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/devices/8901311242888845458"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "8901311242888845458"})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let record = client.fetch_device("8901311242888845458").await.expect("lookup");

    assert_eq!(record.unwrap()["_id"], "8901311242888845458");
}

#[tokio::test]
async fn missing_device_is_a_denial_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let record = client.fetch_device("unknown-device").await.expect("lookup");

    assert!(record.is_none());
}

#[tokio::test]
async fn null_record_counts_as_missing() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Null))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.fetch_device("dev").await.expect("lookup").is_none());
}

#[tokio::test]
async fn empty_object_record_counts_as_missing() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.fetch_device("dev").await.expect("lookup").is_none());
}

#[tokio::test]
async fn scalar_record_counts_as_missing() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.fetch_device("dev").await.expect("lookup").is_none());
}

#[tokio::test]
async fn empty_body_counts_as_missing() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.fetch_device("dev").await.expect("lookup").is_none());
}

#[tokio::test]
async fn server_error_is_a_lookup_failure() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.fetch_device("dev").await.unwrap_err();

    assert!(matches!(err, UpstreamError::UnexpectedStatus { status: 500, .. }));
}

#[tokio::test]
async fn unparseable_body_is_a_lookup_failure() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.fetch_device("dev").await.unwrap_err();

    assert!(matches!(err, UpstreamError::InvalidBody { .. }));
}

#[tokio::test]
async fn non_responding_registry_times_out() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = ClientConfig {
        timeout: std::time::Duration::from_millis(100),
        ..ClientConfig::default()
    };
    let client = RegistryClient::new(server.uri(), &config).expect("build registry client");
    let err = client.fetch_device("dev").await.unwrap_err();

    assert!(matches!(err, UpstreamError::Timeout { .. }));
}
