use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use extension_actions::testing::{test_extension_node, StubTransport};
use extension_actions::{
    ExtensionActionResponse, ExtensionHandleTransportRequest, ExtensionNode,
    RegisterTransportActionsRequest, RemoteExtensionActionResponse, StaticDirectory,
    TransportActionRequestFromExtension, REQUEST_EXTENSION_HANDLE_TRANSPORT_ACTION,
};
use extension_gateway::app::build_router;
use extension_gateway::build_dispatcher;
use extension_gateway::transport::{HttpTransport, TRANSPORT_ACTION_HEADER};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn test_app(nodes: Vec<ExtensionNode>) -> Router {
    let directory = StaticDirectory::new(nodes).expect("directory");
    let dispatcher = build_dispatcher(
        directory,
        Arc::new(StubTransport::disconnected()),
        "test".to_string(),
    );
    build_router(dispatcher)
}

fn http_app(nodes: Vec<ExtensionNode>) -> Router {
    let directory = StaticDirectory::new(nodes).expect("directory");
    let transport = HttpTransport::new(Duration::from_secs(5)).expect("http transport");
    let dispatcher = build_dispatcher(directory, Arc::new(transport), "test".to_string());
    build_router(dispatcher)
}

async fn send_json(app: &Router, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn register(app: &Router, unique_id: &str, actions: &[&str]) -> bool {
    let request = RegisterTransportActionsRequest::new(unique_id, actions.iter().copied());
    let (status, body) = send_json(
        app,
        Method::POST,
        "/v1/extensions/actions/register",
        Some(serde_json::to_value(&request).expect("serialize")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["status"].as_bool().expect("status flag")
}

async fn request_action(app: &Router, action: &str, bytes: &str, sender: &str) -> RemoteExtensionActionResponse {
    let request = TransportActionRequestFromExtension::new(action, bytes, sender);
    let (status, body) = send_json(
        app,
        Method::POST,
        "/v1/extensions/actions/request",
        Some(serde_json::to_value(&request).expect("serialize")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(body).expect("remote response")
}

fn node_at(unique_id: &str, address: SocketAddr) -> ExtensionNode {
    let mut node = test_extension_node(unique_id);
    node.address = address;
    node
}

async fn spawn_extension() -> SocketAddr {
    async fn handle(
        headers: HeaderMap,
        Json(request): Json<ExtensionHandleTransportRequest>,
    ) -> Json<ExtensionActionResponse> {
        let transport_action = headers
            .get(TRANSPORT_ACTION_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let mut body = format!("{transport_action}|{}|", request.action).into_bytes();
        body.extend(request.request_bytes);
        Json(ExtensionActionResponse::new(body))
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind extension");
    let addr = listener.local_addr().expect("extension addr");
    let app = Router::new().route("/v1/transport", post(handle));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn closed_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    listener.local_addr().expect("probe addr")
}

#[tokio::test]
async fn health() {
    let app = test_app(vec![test_extension_node("uniqueid1")]);
    let (status, body) = send_json(&app, Method::GET, "/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn register_actions_acknowledges_once() {
    let app = test_app(vec![test_extension_node("uniqueid1")]);
    assert!(register(&app, "uniqueid1", &["test-action"]).await);
    assert!(!register(&app, "uniqueid1", &["test-action"]).await);
    assert!(!register(&app, "unknown", &["other-action"]).await);
}

#[tokio::test]
async fn unregistered_action_request_fails_as_value() {
    let app = test_app(vec![test_extension_node("uniqueid1")]);
    let response = request_action(&app, "test-action", "requestBytes", "uniqueid1").await;
    assert!(!response.success);
    assert_eq!(
        response.response_bytes_as_string(),
        "Request failed: action [test-action] is not registered for any extension."
    );
}

#[tokio::test]
async fn cluster_state_lists_extension_nodes() {
    let app = test_app(vec![test_extension_node("uniqueid1")]);
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/v1/cluster/state",
        Some(json!({ "metadata": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clusterName"], "test");
    assert_eq!(body["state"]["nodes"]["uniqueid1"]["name"], "firstExtension");
    assert!(body["state"].get("metadata").is_none());
}

#[tokio::test]
async fn malformed_body_is_problem_details() {
    let app = test_app(vec![test_extension_node("uniqueid1")]);
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/v1/extensions/actions/request",
        Some(json!({ "action": "test-action", "requestBytes": "%%%", "uniqueId": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "urn:extension-gateway:error:invalid_request");
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn action_request_is_routed_to_owning_extension() {
    let extension_addr = spawn_extension().await;
    let app = http_app(vec![
        test_extension_node("uniqueid1"),
        node_at("uniqueid2", extension_addr),
    ]);
    assert!(register(&app, "uniqueid2", &["test-action"]).await);

    let response = request_action(&app, "test-action", "requestBytes", "uniqueid1").await;
    assert!(response.success, "{}", response.response_bytes_as_string());
    assert_eq!(
        response.response_bytes_as_string(),
        format!("{REQUEST_EXTENSION_HANDLE_TRANSPORT_ACTION}|test-action|requestBytes")
    );
}

#[tokio::test]
async fn disconnected_owner_is_reported_to_sender() {
    let app = http_app(vec![
        test_extension_node("uniqueid1"),
        node_at("uniqueid2", closed_address()),
    ]);
    assert!(register(&app, "uniqueid2", &["test-action"]).await);

    let response = request_action(&app, "test-action", "requestBytes", "uniqueid1").await;
    assert!(!response.success);
    assert!(
        response.response_bytes_as_string().ends_with("Node not connected"),
        "{}",
        response.response_bytes_as_string()
    );
}
