//! Integration tests for the HTTP API, driven through the router in-process

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use neet_tutor::config::Config;
use neet_tutor::flashcards::{FallbackChain, SeedSource};
use neet_tutor::server::{router, ServerState};
use neet_tutor::TutorState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let chain = FallbackChain::new().with_source(Arc::new(SeedSource::bundled()));
    let state = ServerState::with_chain(Config::default(), TutorState::in_memory(), chain).unwrap();
    router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn onboarded(app: &Router, weak_subject: &str) {
    let (status, _) = post(
        app,
        "/api/auth/sign-in",
        json!({"email": "aspirant@example.com", "password": "secret123"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        app,
        "/api/onboarding",
        json!({
            "dailyStudyTime": 3,
            "preferredFormat": "visual",
            "weakSubject": weak_subject,
            "confidence": 4
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
}

#[tokio::test]
async fn test_status_and_catalog() {
    let app = app();
    let (status, body) = get(&app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["demoMode"], true);
    assert_eq!(body["version"], neet_tutor::VERSION);

    let (status, body) = get(&app, "/api/topics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().iter().any(|t| t["id"] == "math-calculus"));
}

#[tokio::test]
async fn test_sign_in_validation_reports_every_field() {
    let app = app();
    let (status, body) = post(&app, "/api/auth/sign-in", json!({"email": "nope", "password": "123"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"].as_array().unwrap().len(), 2);

    let (status, body) = post(
        &app,
        "/api/auth/sign-in",
        json!({"email": "aspirant@example.com", "password": "secret123"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next"], "/onboarding");
    assert_eq!(body["user"]["name"], "aspirant");
}

#[tokio::test]
async fn test_guards_redirect() {
    let app = app();
    let (status, body) = get(&app, "/api/learn").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["redirect"], "/onboarding");

    let (status, body) = get(&app, "/api/navigate?path=/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"], "/auth/sign-in");
    assert_eq!(body["redirectedFrom"], "/dashboard");

    let (status, body) = get(&app, "/api/profile").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["redirect"], "/auth/sign-in");
}

#[tokio::test]
async fn test_learning_flow_over_http() {
    let app = app();
    onboarded(&app, "Biology").await;

    let (status, body) = get(&app, "/api/learn").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"]["id"], "biology-genetics");
    assert_eq!(body["activeStep"], "topic");

    let (status, body) = post(&app, "/api/learn/complete", json!({"step": "topic"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activeStep"], "flashcards");
    assert_eq!(body["progress"]["completedSteps"], json!(["topic"]));

    let (status, body) = post(
        &app,
        "/api/learn/complete",
        json!({"step": "quiz", "accuracy": 85, "timeSpent": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"]["accuracy"], 85.0);
    assert_eq!(body["progress"]["currentStep"], "analysis");

    let (status, _) = post(&app, "/api/learn/complete", json!({"step": "homework"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(&app, "/api/learn/complete", json!({"step": "quiz", "accuracy": 150})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "accuracy");

    let (status, body) = get(&app, "/api/learn?step=video").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activeStep"], "video");

    let (status, body) = get(&app, "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topicsStarted"], 1);
    assert_eq!(body["currentTopic"]["percent"], 40.0);
}

#[tokio::test]
async fn test_profile_update() {
    let app = app();
    onboarded(&app, "Physics").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/profile",
        Some(json!({"name": "Asha", "confidence": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Asha");
    assert_eq!(body["confidence"], 5);

    let (_, body) = send(&app, Method::PUT, "/api/profile", Some(json!({"examDate": "2027-05-02"}))).await;
    assert_eq!(body["examDate"], "2027-05-02");
    let (_, body) = send(&app, Method::PUT, "/api/profile", Some(json!({"examDate": null}))).await;
    assert!(body["examDate"].is_null());
    assert_eq!(body["name"], "Asha");

    let (status, _) = send(&app, Method::PUT, "/api/profile", Some(json!({"confidence": 9}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = post(&app, "/api/auth/logout", json!({})).await;
    assert_eq!(body["next"], "/");
    let (_, state) = get(&app, "/api/state").await;
    assert!(state["user"].is_null());
    assert!(state["currentTopic"].is_null());
}

#[tokio::test]
async fn test_flashcard_endpoints() {
    let app = app();
    let (status, body) = get(&app, "/api/flashcards?topic=physics-waves").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);

    let (status, _) = get(&app, "/api/flashcards?topic=math-calculus").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, "/vr/seeds.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["topics"].is_array());
    assert!(body["flashcards"].is_array());
}

#[tokio::test]
async fn test_vr_quiz_gating_over_http() {
    let app = app();
    onboarded(&app, "Chemistry").await;

    let (status, body) = post(&app, "/api/vr/hotspot", json!({"hotspot": "quiz"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    let (_, body) = post(&app, "/api/vr/message", json!({"type": "VIDEO_PROGRESS", "progress": 59})).await;
    assert_eq!(body["handled"], true);
    assert_eq!(body["unlocked"]["quiz"], false);

    let (_, body) = post(&app, "/api/vr/message", json!({"type": "VIDEO_PROGRESS", "progress": 60})).await;
    assert_eq!(body["unlocked"]["quiz"], true);

    let (status, body) = post(&app, "/api/vr/hotspot", json!({"hotspot": "quiz"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"], "/learn");
    assert_eq!(body["fragment"], "quiz");

    let (_, scene) = get(&app, "/api/vr/scene").await;
    let quiz = scene["hotspots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|h| h["id"] == "quiz")
        .unwrap()
        .clone();
    assert_eq!(quiz["enabled"], true);
    assert_eq!(quiz["position"], json!({"x": 0.0, "y": 2.5, "z": -4.0}));
}

#[tokio::test]
async fn test_vr_topic_and_video() {
    let app = app();

    let (status, body) = post(&app, "/api/vr/topic", json!({"topicId": "math-calculus"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flashcards"], 0);

    let (_, body) = post(&app, "/api/vr/open-video", json!({"embedded": true})).await;
    assert_eq!(body["target"], "parent");
    assert_eq!(body["message"]["type"], "VR_OPEN_VIDEO");
    assert_eq!(body["message"]["url"], "/learn/video?topic=math-calculus&vr=true");

    let (_, body) = post(&app, "/api/vr/open-video", json!({})).await;
    assert_eq!(body["target"], "newWindow");

    let (_, body) = post(&app, "/api/vr/complete", json!({})).await;
    assert_eq!(body["added"], true);
    let (_, body) = post(&app, "/api/vr/complete", json!({})).await;
    assert_eq!(body["added"], false);

    let (status, _) = post(&app, "/api/vr/topic", json!({"topicId": "  "})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_settings() {
    let app = app();
    let (_, body) = post(&app, "/api/settings/vr-mode", json!({})).await;
    assert_eq!(body["isVRMode"], true);
    let (_, body) = post(&app, "/api/settings/demo-mode", json!({"enabled": false})).await;
    assert_eq!(body["demoMode"], false);

    let (_, state) = get(&app, "/api/state").await;
    assert_eq!(state["isVRMode"], true);
    assert_eq!(state["demoMode"], false);
}
