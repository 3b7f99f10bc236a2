//! Snippet hydration behavior against a mocked API.
//!
//! Call counts are enforced with wiremock's `expect`, which is verified
//! when each `MockServer` is dropped.

use canaryapi::{ApiResource, CanaryClient, CanaryError, Endpoint, Resource};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> CanaryClient {
    CanaryClient::with_base_url(&server.uri(), "test-key").unwrap()
}

fn endpoint_snippet(server: &MockServer) -> Resource {
    Resource::snippet(
        client_for(server),
        "endpoint",
        json!({
            "id": 7,
            "hostname": "workstation-7",
            "url": format!("{}/endpoints/7", server.uri())
        }),
    )
    .unwrap()
}

#[tokio::test]
async fn test_snippet_field_hit_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut resource = endpoint_snippet(&server);
    assert!(resource.is_snippet());
    let hostname = resource.get_field("hostname").await.unwrap();
    assert_eq!(hostname, json!("workstation-7"));
    assert!(resource.is_snippet());
}

#[tokio::test]
async fn test_snippet_miss_hydrates_exactly_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/endpoints/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 7,
                "hostname": "workstation-7",
                "operating_system": "Windows 10"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut resource = endpoint_snippet(&server);
    let os = resource.get_field("operating_system").await.unwrap();
    assert_eq!(os, json!("Windows 10"));
    assert!(!resource.is_snippet());

    // Now full: further accesses answer from the backing data. The
    // expect(1) above fails at drop if another request goes out.
    let os = resource.get_field("operating_system").await.unwrap();
    assert_eq!(os, json!("Windows 10"));
    let hostname = resource.get_field("hostname").await.unwrap();
    assert_eq!(hostname, json!("workstation-7"));
}

#[tokio::test]
async fn test_full_resource_never_fetches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut resource = Resource::full(
        client_for(&server),
        "endpoint",
        json!({"id": 7, "hostname": "workstation-7"}),
    )
    .unwrap();

    assert_eq!(
        resource.get_field("hostname").await.unwrap(),
        json!("workstation-7")
    );
    let err = resource.get_field("operating_system").await.unwrap_err();
    assert!(matches!(err, CanaryError::MissingField { field, .. } if field == "operating_system"));
}

#[tokio::test]
async fn test_missing_field_after_hydration() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/endpoints/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 7, "hostname": "workstation-7"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut resource = endpoint_snippet(&server);
    let err = resource.get_field("no_such_field").await.unwrap_err();
    assert!(matches!(err, CanaryError::MissingField { field, .. } if field == "no_such_field"));
    // The hydration itself succeeded
    assert!(!resource.is_snippet());
}

#[tokio::test]
async fn test_failed_hydration_leaves_snippet_and_is_retryable() {
    let server = MockServer::start().await;

    // First detail request fails, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/endpoints/7"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/endpoints/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 7, "operating_system": "Windows 10"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut resource = endpoint_snippet(&server);
    let err = resource.get_field("operating_system").await.unwrap_err();
    match err {
        CanaryError::ApiError { status_code, .. } => assert_eq!(status_code, Some(404)),
        other => panic!("expected ApiError, got {other:?}"),
    }
    assert!(resource.is_snippet());

    // Hydration is idempotent, so a later access simply tries again
    let os = resource.get_field("operating_system").await.unwrap();
    assert_eq!(os, json!("Windows 10"));
    assert!(!resource.is_snippet());
}

#[tokio::test]
async fn test_has_many_produces_independent_snippets() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/detections/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1, "summary": "Full detection record"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut endpoint = Endpoint::from_resource(
        Resource::snippet(
            client_for(&server),
            "endpoint",
            json!({
                "id": 7,
                "detections": [
                    {"id": 1, "headline": "[1] Bad", "url": format!("{}/detections/1", server.uri())},
                    {"id": 2, "headline": "[2] Worse", "url": format!("{}/detections/2", server.uri())}
                ]
            }),
        )
        .unwrap(),
    );

    let mut detections = endpoint.detections().await.unwrap();
    assert_eq!(detections.len(), 2);

    // Snippet fields answer locally
    assert_eq!(detections[0].headline().await.unwrap(), "[1] Bad");
    assert_eq!(detections[1].headline().await.unwrap(), "[2] Worse");

    // A miss hydrates only the resource it was asked of
    assert_eq!(
        detections[0].summary().await.unwrap(),
        "Full detection record"
    );
}
