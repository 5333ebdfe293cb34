#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use vocab_quiz_backend::services::random::RandomSource;
use vocab_quiz_backend::state::AppState;

pub fn create_test_app() -> Router {
    vocab_quiz_backend::create_app()
}

pub fn create_test_app_with(random: impl RandomSource + 'static) -> Router {
    vocab_quiz_backend::build_app(AppState::in_memory().with_random(random))
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn add_word(app: &Router, english: &str, korean: &str, category: &str) {
    let (status, body) = post(
        app,
        "/api/words",
        serde_json::json!({"english": english, "korean": korean, "category": category}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "add {english}: {body}");
}
