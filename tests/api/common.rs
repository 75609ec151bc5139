// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers for the API tests
//!
//! The router is driven in-process with `oneshot`. Two pipelines are used:
//! the real lightweight pipeline (no latency, seeded) and a stub standing in
//! for the model pipeline so the full response shape can be checked without
//! ONNX weights.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use object_depth_api::{
    api::{create_app, AppState},
    config::{LightweightConfig, ServiceConfig, ServiceMode},
    pipeline::{ImagePipeline, PipelineError, PipelineOutput, SimulatedPipeline},
    vision::{Annotator, BoundingBox, DepthMap, Detection, DetectionSimulator},
};
use std::io::Cursor;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

pub const BOUNDARY: &str = "----object-depth-api-test-boundary";

/// Stand-in for the model pipeline with fixed detections
pub struct StubModelPipeline {
    pub detections: Vec<Detection>,
    pub fail: bool,
}

impl StubModelPipeline {
    pub fn with_person() -> Self {
        Self {
            detections: vec![Detection {
                class_id: 0,
                class_name: "person".to_string(),
                confidence: 0.91,
                bbox: BoundingBox::new(4.0, 6.0, 30.5, 40.0),
            }],
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            detections: Vec::new(),
            fail: true,
        }
    }
}

impl ImagePipeline for StubModelPipeline {
    fn mode(&self) -> ServiceMode {
        ServiceMode::Full
    }

    fn process(&self, image: &DynamicImage) -> Result<PipelineOutput, PipelineError> {
        if self.fail {
            return Err(PipelineError::Detection("stub inference failure".to_string()));
        }

        let frame = image.to_rgb8();
        let (width, height) = frame.dimensions();
        let raw = (0..width * height).map(|v| v as f32).collect();
        let depth = DepthMap::from_raw(width, height, raw)
            .ok_or_else(|| PipelineError::Depth("bad stub depth".to_string()))?;

        let detections: Vec<Detection> = self
            .detections
            .iter()
            .map(|d| Detection {
                bbox: d.bbox.clamp_to(width, height),
                ..d.clone()
            })
            .collect();
        let rendered = Annotator::with_font(None).render_full(&frame, &detections, &depth);

        Ok(PipelineOutput {
            detections,
            image: rendered,
        })
    }

    fn health_message(&self) -> &str {
        object_depth_api::pipeline::model::FULL_HEALTH_MESSAGE
    }
}

pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.lightweight.simulated_latency_ms = 0;
    config
}

pub fn lightweight_app(seed: u64) -> Router {
    lightweight_app_with_config(seed, test_config())
}

pub fn lightweight_app_with_config(seed: u64, mut config: ServiceConfig) -> Router {
    config.mode = ServiceMode::Lightweight;
    let pipeline = SimulatedPipeline::with_simulator(
        DetectionSimulator::seeded(seed),
        &LightweightConfig {
            simulated_latency_ms: 0,
        },
        Annotator::with_font(None),
    );
    app_with(Arc::new(pipeline), config)
}

/// Lightweight app that sleeps `latency_ms` before answering
pub fn lightweight_app_with_latency(seed: u64, latency_ms: u64) -> Router {
    let mut config = test_config();
    config.mode = ServiceMode::Lightweight;
    config.lightweight.simulated_latency_ms = latency_ms;
    let pipeline = SimulatedPipeline::with_simulator(
        DetectionSimulator::seeded(seed),
        &config.lightweight,
        Annotator::with_font(None),
    );
    app_with(Arc::new(pipeline), config)
}

pub fn full_app(pipeline: StubModelPipeline) -> Router {
    app_with(Arc::new(pipeline), test_config())
}

pub fn app_with(pipeline: Arc<dyn ImagePipeline>, config: ServiceConfig) -> Router {
    let state = AppState::new(pipeline, config).expect("Failed to create app state");
    create_app(state)
}

/// Encode a gradient test image
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 128])
    });
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, format)
        .expect("Failed to encode test image");
    buffer.into_inner()
}

/// JPEG with an Exif APP1 segment holding only the Orientation tag
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let jpeg = image_bytes(width, height, ImageFormat::Jpeg);

    let mut app1 = vec![0xFF, 0xE1, 0x00, 0x22];
    app1.extend_from_slice(b"Exif\0\0");
    // Big-endian TIFF header, first IFD at offset 8
    app1.extend_from_slice(&[b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
    // One entry: tag 0x0112 (Orientation), SHORT, count 1
    app1.extend_from_slice(&[0x00, 0x01, 0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    app1.extend_from_slice(&orientation.to_be_bytes());
    app1.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageFormat::Png)
}

/// One multipart part: field name, optional filename, content
pub struct FormPart<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub data: &'a [u8],
}

pub fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(parts: &[FormPart<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/detect")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn upload_request(file_name: &str, data: &[u8]) -> Request<Body> {
    multipart_request(&[FormPart {
        name: "image",
        file_name: Some(file_name),
        data,
    }])
}

pub fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send a request, returning status and parsed JSON body
pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Response is not JSON ({}): {:?}", e, bytes));
    (status, json)
}

/// Decode `processed_image` and return its dimensions
pub fn processed_image_size(body: &serde_json::Value) -> (u32, u32) {
    let encoded = body["processed_image"]
        .as_str()
        .expect("processed_image missing");
    let jpeg = STANDARD.decode(encoded).expect("processed_image is not base64");
    let image = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
        .expect("processed_image is not a JPEG");
    (image.width(), image.height())
}

/// Check every detection against the confidence and bounds invariants
pub fn assert_detections_valid(body: &serde_json::Value, width: u64, height: u64) {
    let detections = body["detections"].as_array().expect("detections missing");
    for detection in detections {
        assert!(detection["class"].is_string());

        let confidence = detection["confidence"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&confidence), "confidence {}", confidence);

        let bbox: Vec<u64> = detection["bbox"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_u64().unwrap())
            .collect();
        assert_eq!(bbox.len(), 4);
        assert!(bbox[0] <= bbox[2] && bbox[2] <= width, "bbox {:?}", bbox);
        assert!(bbox[1] <= bbox[3] && bbox[3] <= height, "bbox {:?}", bbox);
    }
}
