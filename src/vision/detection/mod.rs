// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection
//!
//! Components:
//! - `labels` - COCO class names and Ultralytics `names` metadata parsing
//! - `postprocess` - letterbox mapping, YOLO output decoding, NMS
//! - `yolo` - ONNX Runtime wrapper for YOLO exports

pub mod labels;
pub mod postprocess;
pub mod yolo;

pub use labels::{parse_names_metadata, COCO_CLASSES};
pub use postprocess::{decode_yolo_output, non_max_suppression, Letterbox};
pub use yolo::{detections_from_output, DetectorConfig, YoloDetector};

/// Axis-aligned box in pixel coordinates, corners `(x1, y1)`-`(x2, y2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box from centre coordinates and size
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }

    /// Clamp to `[0, width] x [0, height]`, keeping `x1 <= x2` and `y1 <= y2`.
    ///
    /// NaN coordinates collapse onto the lower bound.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let x1 = self.x1.max(0.0).min(w);
        let y1 = self.y1.max(0.0).min(h);
        let x2 = self.x2.max(x1).min(w);
        let y2 = self.y2.max(y1).min(h);
        Self { x1, y1, x2, y2 }
    }

    /// Integer pixel corners `[x1, y1, x2, y2]`, truncated like an `int()` cast
    pub fn to_pixels(&self) -> [u32; 4] {
        [
            self.x1.max(0.0) as u32,
            self.y1.max(0.0) as u32,
            self.x2.max(0.0) as u32,
            self.y2.max(0.0) as u32,
        ]
    }
}

/// One recognised object instance
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: usize,
    pub class_name: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    /// Label drawn on annotated frames, e.g. `person: 0.92`
    pub fn label(&self) -> String {
        format!("{}: {:.2}", self.class_name, self.confidence)
    }
}
