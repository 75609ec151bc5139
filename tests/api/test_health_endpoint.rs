// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Health and landing page tests
//!
//! These tests verify that:
//! - GET /api/health always answers 200 with status "healthy"
//! - The message identifies the running variant
//! - The lightweight variant adds a note
//! - GET / serves the HTML landing page

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use tower::util::ServiceExt;

use super::common::{full_app, lightweight_app, send_json, StubModelPipeline};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_full() {
    let (status, body) = send_json(full_app(StubModelPipeline::with_person()), get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(
        body["message"],
        "Object Detection and Depth Estimation API is running"
    );
    assert!(body.get("note").is_none());
}

#[tokio::test]
async fn test_health_lightweight() {
    let (status, body) = send_json(lightweight_app(1), get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(
        body["message"],
        "Object Detection API is running (Lightweight Version)"
    );
    assert!(body["note"].as_str().unwrap().contains("simulates"));
}

#[tokio::test]
async fn test_health_ok_even_when_pipeline_fails() {
    let (status, _) = send_json(full_app(StubModelPipeline::failing()), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_landing_page() {
    let response = lightweight_app(1).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("/api/detect_url"));
    assert!(html.contains("simulated"));
}
