use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body, BodyDataStream},
    http::{Request, StatusCode},
    Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures_util::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use umlforge_client::config::ClientConfig;
use umlforge_client::generator::GeneratorClient;
use umlforge_client::server::{router, AppState};
use umlforge_core::Event;
use umlforge_dom::Snapshot;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const MAX_SIZE: usize = 1024 * 1024;

const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

fn state_for(base_url: Option<String>) -> Arc<AppState> {
    let cfg = ClientConfig {
        base_url,
        api_key: "secret".into(),
        ..ClientConfig::default()
    };
    let generator = Arc::new(GeneratorClient::from_config(&cfg).unwrap());
    Arc::new(AppState::new(&cfg, generator))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), MAX_SIZE).await.unwrap();
    (status, body.to_vec())
}

fn post_action(name: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/actions/{name}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Read the next `\n\n`-terminated SSE frame, buffering partial chunks.
async fn next_frame(stream: &mut Pin<Box<BodyDataStream>>, buf: &mut String) -> String {
    loop {
        if let Some(end) = buf.find("\n\n") {
            let frame = buf[..end].to_string();
            buf.drain(..end + 2);
            return frame;
        }
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("frame within timeout")
            .expect("stream still open")
            .unwrap();
        buf.push_str(std::str::from_utf8(&chunk).unwrap());
    }
}

async fn wait_until_settled(state: &AppState) {
    let mut rx = state.store.subscribe();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|rev| !rev.state.request.pending))
        .await
        .expect("request should settle")
        .unwrap();
}

#[tokio::test]
async fn test_page_renders_initial_view() {
    let state = state_for(None);
    let (status, body) = send(router(state), get("/")).await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Enter PlantUML Prompt"));
    assert!(html.contains("Generate UML"));
    assert!(html.contains("Enter a description and generate UML."));
    assert!(html.contains("<script src=\"/studio.js\"></script>"));
    assert!(html.contains("UmlForge.connect(\"/sse\", \"#app\");"));
}

#[tokio::test]
async fn test_studio_script_is_served() {
    let resp = router(state_for(None)).oneshot(get("/studio.js")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/javascript");
}

#[tokio::test]
async fn test_draft_input_updates_prompt_only() {
    let state = state_for(None);
    let (status, body) = send(
        router(state.clone()),
        post_action("draft_input", json!({ "payload": { "value": "class diagram for a car" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let snap: Snapshot = serde_json::from_slice(&body).unwrap();
    let prompt = snap.root.find_key("prompt").unwrap();
    assert_eq!(prompt.attr("value"), Some("class diagram for a car"));
    assert_eq!(state.draft.get(), "class diagram for a car");
    assert_eq!(state.store.current().seq, 0);
}

#[tokio::test]
async fn test_generate_uses_draft_and_shows_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/uml/generator/"))
        .and(header("X-API-Key", "secret"))
        .and(body_json(json!({ "description": "class diagram for a car" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "payload": STANDARD.encode(PNG) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(Some(server.uri()));
    state.draft.set("class diagram for a car".into());

    let (status, body) =
        send(router(state.clone()), post_action("generate", json!({ "payload": {} }))).await;
    assert_eq!(status, StatusCode::OK);
    let snap: Snapshot = serde_json::from_slice(&body).unwrap();
    assert!(snap.root.find_key("loading").is_some());

    wait_until_settled(&state).await;
    let snap = state.snapshot();
    let img = snap.root.find_key("diagram").expect("image shown");
    assert!(img.attr("src").unwrap().starts_with("data:image/png;base64,"));
    assert!(snap.root.find_key("loading").is_none());
    // The draft survives the request.
    assert_eq!(state.draft.get(), "class diagram for a car");
}

#[tokio::test]
async fn test_explicit_description_wins_over_shared_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/uml/generator/"))
        .and(body_json(json!({ "description": "tab A prompt" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "payload": "A" })))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(Some(server.uri()));
    for value in ["tab A prompt", "tab B prompt"] {
        let req = post_action("draft_input", json!({ "payload": { "value": value } }));
        send(router(state.clone()), req).await;
    }
    assert_eq!(state.draft.get(), "tab B prompt");

    let req = post_action("generate", json!({ "payload": { "description": "tab A prompt" } }));
    let (status, _) = send(router(state.clone()), req).await;
    assert_eq!(status, StatusCode::OK);

    wait_until_settled(&state).await;
    let rev = state.store.current();
    assert!(rev.state.request.success, "unexpected state: {:?}", rev.state);
    assert_eq!(rev.state.payload(), Some("A"));
}

#[tokio::test]
async fn test_sse_streams_snapshot_on_connect_and_on_change() {
    let state = state_for(None);
    let resp = router(state.clone()).oneshot(get("/sse")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "text/event-stream");

    let mut stream = Box::pin(resp.into_body().into_data_stream());
    let mut buf = String::new();

    let first = next_frame(&mut stream, &mut buf).await;
    assert!(first.contains("event: message"), "first frame: {first}");
    assert!(first.contains(r#"data: {"root":{"tag":"div","key":"studio""#), "{first}");

    state.draft.set("sequence diagram for checkout".into());
    let frame = next_frame(&mut stream, &mut buf).await;
    assert!(frame.contains("event: message"));
    assert!(frame.contains("sequence diagram for checkout"), "{frame}");

    state.store.apply(Event::Pending);
    let frame = next_frame(&mut stream, &mut buf).await;
    assert!(frame.contains(r#""key":"loading""#), "{frame}");

    state.dispatcher.shutdown();
    let end = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("stream should end after shutdown");
    assert!(end.is_none());
}

#[tokio::test]
async fn test_text_payload_falls_back_to_textarea() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/uml/generator/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "payload": "@startuml\nA -> B\n@enduml" })),
        )
        .mount(&server)
        .await;

    let state = state_for(Some(server.uri()));
    send(
        router(state.clone()),
        post_action("generate", json!({ "payload": { "description": "sequence" } })),
    )
    .await;
    wait_until_settled(&state).await;

    let snap = state.snapshot();
    assert!(snap.root.find_key("diagram").is_none());
    let source = snap.root.find_key("source").unwrap();
    assert_eq!(source.text.as_deref(), Some("@startuml\nA -> B\n@enduml"));
}

#[tokio::test]
async fn test_unconfigured_generate_shows_placeholder() {
    let state = state_for(None);
    send(router(state.clone()), post_action("generate", json!({}))).await;
    wait_until_settled(&state).await;

    let (status, body) = send(router(state.clone()), get("/api/state")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["request"]["failure"], true);
    assert!(json["response"].is_null());
    assert!(json["last_error"].as_str().unwrap().contains("base URL"));

    let snap = state.snapshot();
    let source = snap.root.find_key("source").unwrap();
    assert_eq!(source.text.as_deref(), Some("Enter a description and generate UML."));
}

#[tokio::test]
async fn test_unknown_action_changes_nothing() {
    let state = state_for(None);
    let before = state.snapshot();
    let (status, body) =
        send(router(state.clone()), post_action("frobnicate", json!({ "payload": {} }))).await;
    assert_eq!(status, StatusCode::OK);
    let snap: Snapshot = serde_json::from_slice(&body).unwrap();
    assert_eq!(snap, before);
    assert_eq!(state.store.current().seq, 0);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let req = Request::builder()
        .method("POST")
        .uri("/actions/generate")
        .body(Body::from("not json"))
        .unwrap();
    let state = state_for(None);
    let (status, body) = send(router(state.clone()), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());
    assert_eq!(state.store.current().seq, 0);
}

#[tokio::test]
async fn test_generate_after_shutdown_is_unavailable() {
    let state = state_for(None);
    state.dispatcher.shutdown();
    let (status, _) = send(router(state.clone()), post_action("generate", json!({}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(state.store.current().seq, 0);
}

#[tokio::test]
async fn test_health_reports_generator() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (_, body) = send(router(state_for(Some(server.uri()))), get("/health")).await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({ "status": "ok", "generator": true }));

    let (_, body) = send(router(state_for(None)), get("/health")).await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({ "status": "ok", "generator": false }));
}
