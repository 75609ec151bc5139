// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect and health response types

use serde::{Deserialize, Serialize};

use crate::vision::Detection;

/// One detection as reported to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionRecord {
    /// Class label
    #[serde(rename = "class")]
    pub class_name: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// `[x1, y1, x2, y2]` in pixels of the submitted image
    pub bbox: [u32; 4],
}

impl From<&Detection> for DetectionRecord {
    fn from(detection: &Detection) -> Self {
        Self {
            class_name: detection.class_name.clone(),
            confidence: detection.confidence.clamp(0.0, 1.0),
            bbox: detection.bbox.to_pixels(),
        }
    }
}

/// Response from `/api/detect` and `/api/detect_url`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub success: bool,
    pub detections: Vec<DetectionRecord>,
    /// Annotated frame, base64-encoded JPEG
    pub processed_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DetectResponse {
    pub fn new(detections: &[Detection], processed_image: String, note: Option<&str>) -> Self {
        Self {
            success: true,
            detections: detections.iter().map(DetectionRecord::from).collect(),
            processed_image,
            note: note.map(str::to_string),
        }
    }
}

/// Response from `/api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl HealthResponse {
    pub fn healthy(message: &str, note: Option<&str>) -> Self {
        Self {
            status: "healthy".to_string(),
            message: message.to_string(),
            note: note.map(str::to_string),
        }
    }
}
