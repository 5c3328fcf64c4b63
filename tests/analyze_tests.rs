// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weight analysis endpoint tests.
//!
//! The endpoint keeps the original frontend contract: Japanese error
//! strings, 400 for missing input, 500 for a missing credential.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn analyze_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze-weight")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_empty_weights_rejected() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(analyze_request(
            r#"{"weights": [], "catData": {"name": "Tama"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "体重データがありません");
}

#[tokio::test]
async fn test_missing_weights_field_rejected() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(analyze_request(r#"{"catData": {"name": "Tama"}}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_api_key_reported() {
    let (app, _state) = common::create_test_app_without_gemini_key();

    let response = app
        .oneshot(analyze_request(
            r#"{"weights": [{"date": "2025-01-01T12:00:00Z", "weight": 4.5}], "catData": {"name": "Tama"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "APIキーが設定されていません");
}

#[tokio::test]
async fn test_analyze_is_public() {
    // No session token: the request must reach the handler, not bounce off
    // the auth middleware.
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(analyze_request(
            r#"{"weights": [], "catData": {"name": "Tama"}}"#,
        ))
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}
