//! Typed model flows against a mocked API: detail fetches, relationship
//! traversal, nested collections, and the detection write path.

use canaryapi::{
    ApiResource, CanaryClient, Detection, Detector, RemediationState, ResponsePlan,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> CanaryClient {
    CanaryClient::with_base_url(&server.uri(), "test-key").unwrap()
}

#[tokio::test]
async fn test_find_returns_full_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/detections/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 42,
                "headline": "[42] Malicious software on host",
                "severity": "high",
                "summary": "Long analyst summary"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut detection = Detection::find(&client, 42).await.unwrap();
    assert_eq!(detection.id().await.unwrap(), 42);
    assert_eq!(
        detection.headline().await.unwrap(),
        "[42] Malicious software on host"
    );
    // Full record: no further requests for any present field
    assert_eq!(detection.summary().await.unwrap(), "Long analyst summary");
}

#[tokio::test]
async fn test_detection_relationships() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/detections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 1,
                "headline": "[1] Malicious software on host",
                "endpoint": {
                    "id": 7,
                    "hostname": "workstation-7",
                    "url": format!("{}/endpoints/7", server.uri())
                },
                "response_plans": [
                    {"id": 3, "state": "open", "url": format!("{}/response_plans/3", server.uri())}
                ],
                "event_timeline": [
                    {"timestamp": "2020-01-01T00:00:00Z", "type": "Process", "path": "/tmp/x"}
                ]
            }],
            "meta": { "total_items": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/endpoints/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 7, "hostname": "workstation-7", "operating_system": "macOS"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut detections = Detection::all(&client);
    let mut detection = detections.try_next().await.unwrap().unwrap();

    let mut endpoint = detection.endpoint().await.unwrap();
    assert_eq!(endpoint.hostname().await.unwrap(), "workstation-7");
    assert_eq!(endpoint.operating_system().await.unwrap(), "macOS");

    let mut plans = detection.response_plans().await.unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].state().await.unwrap(), "open");

    let mut timeline = detection.timeline().await.unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].entry_type().await.unwrap(), "Process");
    assert_eq!(timeline[0].path().await.unwrap().as_deref(), Some("/tmp/x"));
}

#[tokio::test]
async fn test_nested_indicator_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/detections/1/indicators"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 10, "type": "md5"},
                {"id": 11, "type": "domain"}
            ],
            "meta": { "total_items": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut detection = Detection::from_resource(
        canaryapi::Resource::full(
            client.clone(),
            "detection",
            json!({
                "id": 1,
                "indicators": {
                    "count": 2,
                    "url": format!("{}/detections/1/indicators", server.uri())
                }
            }),
        )
        .unwrap(),
    );

    assert_eq!(detection.num_indicators().await.unwrap(), 2);

    let mut indicators = detection.indicators().await.unwrap();
    let mut types = Vec::new();
    while let Some(mut indicator) = indicators.try_next().await.unwrap() {
        types.push(indicator.indicator_type().await.unwrap());
    }
    assert_eq!(types, vec!["md5", "domain"]);
}

#[tokio::test]
async fn test_acknowledge_patches_and_returns_update() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/detections/42/mark_acknowledged"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 42, "acknowledged_by": "analyst@example.com"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut detection = Detection::from_resource(
        canaryapi::Resource::full(client.clone(), "detection", json!({"id": 42})).unwrap(),
    );

    let mut updated = detection.acknowledge().await.unwrap();
    assert_eq!(
        updated
            .resource_mut()
            .get_field("acknowledged_by")
            .await
            .unwrap(),
        json!("analyst@example.com")
    );
}

#[tokio::test]
async fn test_update_remediation_state_sends_params() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/detections/42/update_remediation_state"))
        .and(query_param("remediation_state", "remediated"))
        .and(query_param("comment", "cleaned and reimaged"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 42, "remediation_state": "remediated"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut detection = Detection::from_resource(
        canaryapi::Resource::full(client.clone(), "detection", json!({"id": 42})).unwrap(),
    );

    let mut updated = detection
        .update_remediation_state(RemediationState::Remediated, Some("cleaned and reimaged"))
        .await
        .unwrap();
    assert_eq!(
        updated
            .resource_mut()
            .get_string("remediation_state")
            .await
            .unwrap(),
        "remediated"
    );
}

#[tokio::test]
async fn test_detector_reads_through_attributes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/detectors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 99,
                "attributes": {
                    "name": "Suspicious PowerShell",
                    "description": "Encoded command execution",
                    "contributing_intelligence": "Red Canary Threat Intel",
                    "attack_technique_identifiers": ["T1059.001"]
                }
            }],
            "meta": { "total_items": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut detectors = Detector::all(&client);
    let mut detector = detectors.try_next().await.unwrap().unwrap();

    assert_eq!(detector.id().await.unwrap(), 99);
    assert_eq!(detector.name().await.unwrap(), "Suspicious PowerShell");
    assert_eq!(
        detector.attack_technique_identifiers().await.unwrap(),
        vec!["T1059.001".to_string()]
    );
}

#[tokio::test]
async fn test_response_plan_collection_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/response_plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 3,
                "state": "open",
                "detection": {"id": 1, "headline": "[1] Bad"},
                "endpoint": {"id": 7, "hostname": "workstation-7"}
            }],
            "meta": { "total_items": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut plans = ResponsePlan::all(&client);
    let mut plan = plans.try_next().await.unwrap().unwrap();

    assert_eq!(plan.state().await.unwrap(), "open");
    let mut detection = plan.detection().await.unwrap();
    assert_eq!(detection.headline().await.unwrap(), "[1] Bad");
    let mut endpoint = plan.endpoint().await.unwrap();
    assert_eq!(endpoint.hostname().await.unwrap(), "workstation-7");
}
