//! Integration tests for the HTTP API
//!
//! Requests are driven straight through the router with `oneshot`, backed
//! by an engine over the scripted source.

mod helpers;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use vesta_sync::api::{router, AppContext};
use vesta_sync::{EngineOptions, PublishStrategy, SyncEngine};

use helpers::{song, FakeSource, GOOD_CODE};

const ORIGIN: &str = "http://localhost:3000";

fn setup() -> (Router, SyncEngine, Arc<FakeSource>) {
    let source = Arc::new(FakeSource::new());
    let engine = SyncEngine::new(
        source.clone(),
        EngineOptions {
            publish: PublishStrategy::Direct,
            ..Default::default()
        },
    );
    let app = router(
        AppContext {
            engine: engine.clone(),
        },
        ORIGIN,
    )
    .expect("valid origin");
    (app, engine, source)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

#[tokio::test]
async fn auth_flow_round_trip() {
    let (app, _engine, source) = setup();
    source.set_playing(Some(song("X")), Some(song("Y")));

    let (status, body) = send(&app, Method::GET, "/auth_status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "data": false}));

    let (status, body) = send(&app, Method::GET, "/get_auth_url", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().starts_with("https://accounts.example/"));

    let uri = format!("/send_auth_token?code={GOOD_CODE}");
    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body, json!(true));

    let (_, body) = send(&app, Method::GET, "/auth_status", None).await;
    assert_eq!(body["data"], json!(true));

    let (_, body) = send(&app, Method::GET, "/connected_user", None).await;
    assert_eq!(body, json!("Test Listener"));

    let (status, _) = send(&app, Method::GET, "/logout", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, Method::GET, "/connected_user", None).await;
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn bad_auth_code_returns_false() {
    let (app, engine, _source) = setup();

    let (status, body) = send(&app, Method::GET, "/send_auth_token?code=nope", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(false));
    assert!(!engine.is_connected().await);
}

#[tokio::test]
async fn current_reports_cached_state() {
    let (app, engine, source) = setup();
    source.set_playing(Some(song("X")), Some(song("Y")));
    assert!(engine.login(GOOD_CODE).await);

    let (status, body) = send(&app, Method::GET, "/current", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isConnected"], json!(true));
    assert_eq!(body["isPlaying"], json!(true));
    assert_eq!(body["connectedUser"], json!("Test Listener"));
    assert_eq!(body["nowPlaying"]["title"], json!("X"));
    assert_eq!(body["nowPlaying"]["albumArt"], json!("https://img/X"));
    assert_eq!(body["upNext"]["title"], json!("Y"));
}

#[tokio::test]
async fn request_song_queues_first_match() {
    let (app, _engine, source) = setup();

    let (status, body) = send(
        &app,
        Method::POST,
        "/request_song",
        Some(json!({"query": "Harder Better Faster Stronger"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], json!("Harder Better Faster Stronger"));
    assert_eq!(source.queued(), vec!["Harder Better Faster Stronger"]);
}

#[tokio::test]
async fn request_song_failure_is_bad_gateway() {
    let (app, _engine, _source) = setup();

    let (status, body) = send(&app, Method::POST, "/request_song", Some(json!({"query": ""}))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("no track matches"));
}

#[tokio::test]
async fn queue_lists_upcoming_songs() {
    let (app, _engine, source) = setup();
    source.set_playing(Some(song("X")), Some(song("Y")));

    let (status, body) = send(&app, Method::GET, "/queue", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["artist"], json!("Y Artist"));
}

#[tokio::test]
async fn cors_allows_front_end_origin() {
    let (app, _engine, _source) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/auth_status")
                .header(header::ORIGIN, ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        ORIGIN
    );
}

#[test]
fn invalid_origin_is_rejected() {
    let source = Arc::new(FakeSource::new());
    let engine = SyncEngine::new(source, EngineOptions::default());
    assert!(router(AppContext { engine }, "bad\norigin").is_err());
}
