//! Integration tests for the REST backend against a local stub server.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use base64::Engine;
use pubsub_publisher::auth::{Credentials, StaticCredentialsProvider};
use pubsub_publisher::backend::rest::RestBackend;
use pubsub_publisher::backend::PublishBackend;
use pubsub_publisher::client::{create_client, BackendTarget, ClientOptions};
use pubsub_publisher::config::PublisherConfig;
use pubsub_publisher::pipeline;
use pubsub_publisher::sample::generate;
use pubsub_publisher::types::{OutgoingMessage, TopicPath};
use pubsub_publisher::Error;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A request captured by the stub server
#[derive(Debug, Clone)]
struct CapturedRequest {
    project: String,
    topic_action: String,
    authorization: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct StubState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    reject: bool,
}

async fn topic_handler(
    Path((project, topic_action)): Path<(String, String)>,
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut requests = state.requests.lock().await;
    requests.push(CapturedRequest {
        project,
        topic_action,
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    if state.reject {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": {"code": 404, "message": "Topic not found", "status": "NOT_FOUND"}
            })),
        );
    }

    let id = 1000 + requests.len();
    (StatusCode::OK, Json(json!({ "messageIds": [id.to_string()] })))
}

/// Start the stub server and return its base URL
async fn start_stub(state: StubState) -> String {
    let app = Router::new()
        .route("/v1/projects/{project}/topics/{topic_action}", post(topic_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn topic() -> TopicPath {
    TopicPath::new("local-project", "my-example-topic").unwrap()
}

#[tokio::test]
async fn test_rest_publish_wire_format() {
    let state = StubState::default();
    let endpoint = start_stub(state.clone()).await;

    let backend = RestBackend::new(&endpoint, &Credentials::bearer("test-token", None)).unwrap();
    let message = OutgoingMessage::new(r#"{"hello":"world"}"#).with_attribute("origin", "test");

    let id = backend.publish(&topic(), &message).await.expect("Failed to publish");
    assert_eq!(id, "1001");

    let requests = state.requests.lock().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.project, "local-project");
    assert_eq!(request.topic_action, "my-example-topic:publish");
    assert_eq!(request.authorization.as_deref(), Some("Bearer test-token"));

    let data = request.body["messages"][0]["data"].as_str().unwrap();
    let decoded = base64::engine::general_purpose::STANDARD.decode(data).unwrap();
    assert_eq!(decoded, br#"{"hello":"world"}"#);
    assert_eq!(request.body["messages"][0]["attributes"]["origin"], "test");
}

#[tokio::test]
async fn test_rest_publish_anonymous_has_no_auth_header() {
    let state = StubState::default();
    let endpoint = start_stub(state.clone()).await;
    // Emulator style host:port endpoint
    let host = endpoint.trim_start_matches("http://").to_string();

    let backend = RestBackend::new(&host, &Credentials::anonymous(None)).unwrap();
    backend
        .publish(&topic(), &OutgoingMessage::new("x"))
        .await
        .expect("Failed to publish");

    let requests = state.requests.lock().await;
    assert!(requests[0].authorization.is_none());
}

#[tokio::test]
async fn test_rest_publish_rejected() {
    let state = StubState {
        reject: true,
        ..Default::default()
    };
    let endpoint = start_stub(state.clone()).await;

    let backend = RestBackend::new(&endpoint, &Credentials::anonymous(None)).unwrap();
    let err = backend
        .publish(&topic(), &OutgoingMessage::new("x"))
        .await
        .unwrap_err();

    match err {
        Error::Publish(reason) => {
            assert!(reason.contains("404"));
            assert!(reason.contains("Topic not found"));
        }
        other => panic!("expected publish error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rest_publish_connection_refused() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = create_client(
        &StaticCredentialsProvider::new(Credentials::anonymous(None)),
        BackendTarget::Rest {
            endpoint: format!("http://{}", addr),
        },
        ClientOptions::default(),
    )
    .await
    .unwrap();

    let err = client.publish(&topic(), "payload").await.unwrap_err();
    assert!(matches!(err, Error::Publish(_)));
}

#[tokio::test]
async fn test_pipeline_over_rest() {
    let state = StubState::default();
    let endpoint = start_stub(state.clone()).await;

    let mut config = PublisherConfig::default();
    config.pubsub.project_id = "local-project".to_string();
    config.pubsub.endpoint = endpoint.clone();
    config.pubsub.attach_idempotency_key = true;

    let published = pipeline::run(
        &config,
        &StaticCredentialsProvider::new(Credentials::anonymous(Some("local-project".into()))),
        BackendTarget::Rest { endpoint },
    )
    .await
    .expect("Run failed");

    let ids: Vec<&str> = published.iter().map(|p| p.message_id.as_str()).collect();
    assert_eq!(ids, vec!["1001", "1002", "1003", "1004", "1005"]);

    let requests = state.requests.lock().await;
    assert_eq!(requests.len(), 5);
    for (request, expected) in requests.iter().zip(generate(5)) {
        let message = &request.body["messages"][0];
        assert!(message["attributes"]["idempotency_key"].is_string());

        let data = message["data"].as_str().unwrap();
        let decoded = base64::engine::general_purpose::STANDARD.decode(data).unwrap();
        let payload: Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(payload["message_id"], expected.message_id.as_str());
        assert_eq!(payload["metadata"]["sequence"], expected.metadata.sequence);
    }
}
