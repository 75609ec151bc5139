// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Tests for POST /api/detect_url
//!
//! Remote images are served by an httpmock server. These tests verify that:
//! - A missing or malformed body yields "No image URL provided" (400)
//! - Unparseable and non-http URLs are rejected (400)
//! - Non-200 downloads yield "Failed to download image, status code: N" (400)
//! - Downloaded images go through the same pipeline as uploads

use axum::http::StatusCode;
use httpmock::prelude::*;

use super::common::{
    assert_detections_valid, full_app, json_request, lightweight_app, png_bytes,
    processed_image_size, send_json, StubModelPipeline,
};

const URI: &str = "/api/detect_url";

#[tokio::test]
async fn test_missing_url() {
    let (status, body) = send_json(lightweight_app(1), json_request(URI, "{}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image URL provided");
}

#[tokio::test]
async fn test_malformed_json() {
    let (status, body) = send_json(lightweight_app(1), json_request(URI, "{\"url\": ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image URL provided");
}

#[tokio::test]
async fn test_empty_url() {
    let (status, body) = send_json(lightweight_app(1), json_request(URI, r#"{"url": ""}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image URL provided");
}

#[tokio::test]
async fn test_invalid_url() {
    for url in ["not a url", "ftp://example.com/cat.jpg"] {
        let body = serde_json::json!({ "url": url }).to_string();
        let (status, body) = send_json(lightweight_app(1), json_request(URI, &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"].as_str().unwrap().starts_with("Invalid image URL"),
            "{}",
            body
        );
    }
}

#[tokio::test]
async fn test_remote_404() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/missing.jpg");
            then.status(404).body("not found");
        })
        .await;

    let body = serde_json::json!({ "url": server.url("/missing.jpg") }).to_string();
    let (status, body) = send_json(lightweight_app(1), json_request(URI, &body)).await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to download image, status code: 404");
}

#[tokio::test]
async fn test_remote_500() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/flaky.png");
            then.status(500);
        })
        .await;

    let body = serde_json::json!({ "url": server.url("/flaky.png") }).to_string();
    let (status, body) = send_json(lightweight_app(1), json_request(URI, &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to download image, status code: 500");
}

#[tokio::test]
async fn test_connection_refused() {
    // Port 9 (discard) is not expected to be listening locally
    let body = serde_json::json!({ "url": "http://127.0.0.1:9/cat.png" }).to_string();
    let (status, body) = send_json(lightweight_app(1), json_request(URI, &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to download image"));
}

#[tokio::test]
async fn test_remote_not_an_image() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/page.html");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html>hello</html>");
        })
        .await;

    let body = serde_json::json!({ "url": server.url("/page.html") }).to_string();
    let (status, body) = send_json(lightweight_app(1), json_request(URI, &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid image format"));
}

#[tokio::test]
async fn test_lightweight_detect_url_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/zidane.png");
            then.status(200)
                .header("content-type", "image/png")
                .body(png_bytes(120, 90));
        })
        .await;

    let body = serde_json::json!({ "url": server.url("/zidane.png") }).to_string();
    let (status, body) = send_json(lightweight_app(11), json_request(URI, &body)).await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let count = body["detections"].as_array().unwrap().len();
    assert!((1..=3).contains(&count));
    assert_detections_valid(&body, 120, 90);
    assert!(body["note"].is_string());
    assert_eq!(processed_image_size(&body), (120, 90));
}

#[tokio::test]
async fn test_full_detect_url_success() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/people.png");
            then.status(200).body(png_bytes(64, 64));
        })
        .await;

    let body = serde_json::json!({ "url": server.url("/people.png") }).to_string();
    let (status, body) =
        send_json(full_app(StubModelPipeline::with_person()), json_request(URI, &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detections"][0]["class"], "person");
    assert_detections_valid(&body, 64, 64);
    assert_eq!(processed_image_size(&body), (128, 64));
}
