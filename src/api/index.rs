// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Landing page listing the endpoints

use axum::{extract::State, response::Html};

use super::http_server::AppState;
use crate::config::ServiceMode;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Object Detection API</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; }
        h1 { color: #333; }
        .endpoint { background-color: #f5f5f5; padding: 15px; margin-bottom: 20px; border-radius: 5px; }
        code { background-color: #eee; padding: 2px 5px; border-radius: 3px; }
        .note { color: #666; font-style: italic; }
    </style>
</head>
<body>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

/// GET / - Short HTML description of the API
pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.pipeline.mode()))
}

pub fn render_index(mode: ServiceMode) -> String {
    let (title, intro, note) = match mode {
        ServiceMode::Full => (
            "Object Detection and Depth Estimation API",
            "Detects objects with YOLO and estimates depth with MiDaS. The processed image \
             shows the detections next to a colourised depth map.",
            "",
        ),
        ServiceMode::Lightweight => (
            "Object Detection API",
            "This is a lightweight API for object detection. Due to disk quota limitations, \
             this version provides simulated detection results.",
            r#"<p class="note">Note: In this lightweight version, detection is simulated.</p>"#,
        ),
    };

    let mut page = String::from(PAGE_HEAD);
    page.push_str(&format!("    <h1>{}</h1>\n    <p>{}</p>\n", title, intro));

    page.push_str(
        r#"    <div class="endpoint">
        <h2>Health Check</h2>
        <p><code>GET /api/health</code></p>
        <p>Check if the API is running.</p>
        <p>Example: <a href="/api/health" target="_blank">/api/health</a></p>
    </div>
"#,
    );

    page.push_str(&format!(
        r#"    <div class="endpoint">
        <h2>Detect Objects</h2>
        <p><code>POST /api/detect</code></p>
        <p>Upload an image (multipart field <code>image</code>) to detect objects.</p>
        {note}
    </div>
    <div class="endpoint">
        <h2>Detect from URL</h2>
        <p><code>POST /api/detect_url</code></p>
        <p>Provide an image URL as JSON <code>{{"url": "..."}}</code> to detect objects.</p>
        {note}
    </div>
"#,
        note = note
    ));

    page.push_str(PAGE_TAIL);
    page
}
