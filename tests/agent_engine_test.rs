//! Agent engine client tests using wiremock.
//!
//! These tests verify session creation and streamed queries against a mock
//! engine, including request shape, framing and error mapping.

use futures::StreamExt;
use serde_json::json;
use streamprobe::client::{Client, ClientError, StreamingClient};
use streamprobe::decoder::FramingMode;
use streamprobe::model::{RenderEvent, StreamQuery};
use streamprobe::options::{HttpTransport, TransportOptions};
use streamprobe::providers::AgentEngineClient;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENGINE_PATH: &str = "/v1/projects/p/locations/l/reasoningEngines/42";

fn test_token() -> String {
    "test-access-token".to_string()
}

fn client_for(server: &MockServer, framing: FramingMode) -> AgentEngineClient {
    let transport = HttpTransport::new(test_token())
        .with_endpoint(format!("{}{}", server.uri(), ENGINE_PATH))
        .with_framing(framing);
    AgentEngineClient::new(TransportOptions::new(transport))
}

async fn collect_events(client: &AgentEngineClient, query: StreamQuery) -> Vec<RenderEvent> {
    let stream = client.stream_query(query).await.expect("stream should start");
    stream
        .map(|event| event.expect("event should decode"))
        .collect()
        .await
}

#[tokio::test]
async fn test_create_session_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{}:query", ENGINE_PATH)))
        .and(header("Authorization", format!("Bearer {}", test_token())))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "class_method": "async_create_session",
            "input": {"user_id": "alice"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"id": "session-123", "user_id": "alice", "state": {}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, FramingMode::Sse);
    let session = client.create_session("alice").await.unwrap();

    assert_eq!(session.session_id, "session-123");
    assert_eq!(session.user_id, "alice");
}

#[tokio::test]
async fn test_create_session_missing_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{}:query", ENGINE_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": {}})))
        .mount(&server)
        .await;

    let client = client_for(&server, FramingMode::Sse);
    let result = client.create_session("alice").await;

    assert!(
        matches!(result, Err(ClientError::MissingSessionId)),
        "Expected MissingSessionId, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_create_session_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{}:query", ENGINE_PATH)))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&server)
        .await;

    let client = client_for(&server, FramingMode::Sse);
    let err = client.create_session("alice").await.unwrap_err();

    match &err {
        ClientError::Status { status, body } => {
            assert_eq!(*status, 403);
            assert_eq!(body, "permission denied");
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
    assert_eq!(err.to_string(), "HTTP error! status: 403");
}

#[tokio::test]
async fn test_stream_query_sse() {
    let server = MockServer::start().await;

    let body = concat!(
        "data: {\"content\":{\"parts\":[{\"text\":\"Hel\"}]}}\n\n",
        "event: ping\n",
        "data: not json\n\n",
        "data: [DONE]\n\n",
        "data: {\"ignored\":true}\n",
    );

    Mock::given(method("POST"))
        .and(path(format!("{}:streamQuery", ENGINE_PATH)))
        .and(query_param("alt", "sse"))
        .and(header("Accept", "text/event-stream"))
        .and(body_json(json!({
            "class_method": "async_stream_query",
            "input": {"user_id": "alice", "session_id": "s-1", "message": "Hi"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, FramingMode::Sse);
    let events = collect_events(&client, StreamQuery::new("alice", "s-1", "Hi")).await;

    assert_eq!(
        events,
        vec![
            RenderEvent::Json(json!({"content": {"parts": [{"text": "Hel"}]}})),
            RenderEvent::Text("event: ping".to_string()),
            RenderEvent::Text("not json".to_string()),
            RenderEvent::Done,
        ]
    );
}

#[tokio::test]
async fn test_stream_query_json_lines() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{}:streamQuery", ENGINE_PATH)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("{\"y\":2}\n{\"z\":3}\ntrailing", "application/json"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, FramingMode::JsonLines);
    let events = collect_events(&client, StreamQuery::new("", "", "Hi")).await;

    assert_eq!(
        events,
        vec![
            RenderEvent::Json(json!({"y": 2})),
            RenderEvent::Json(json!({"z": 3})),
            RenderEvent::Done,
        ]
    );
}

#[tokio::test]
async fn test_stream_query_http_error_before_decoding() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{}:streamQuery", ENGINE_PATH)))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server, FramingMode::Sse);
    let result = client.stream_query(StreamQuery::new("a", "s", "Hi")).await;

    assert!(matches!(
        result,
        Err(ClientError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_missing_endpoint_is_config_error() {
    let client = AgentEngineClient::new(TransportOptions::new(HttpTransport::new(test_token())));
    let result = client.create_session("alice").await;

    assert!(matches!(result, Err(ClientError::Config(_))));
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    // Bind then drop a listener so its port is closed.
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let transport = HttpTransport::new(test_token()).with_endpoint(format!("{}{}", uri, ENGINE_PATH));
    let client = AgentEngineClient::new(TransportOptions::new(transport));
    let result = client.stream_query(StreamQuery::new("a", "s", "Hi")).await;

    assert!(matches!(result, Err(ClientError::Http(_))));
}
