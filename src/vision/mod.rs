// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - Object detection via YOLO (ONNX)
//! - Monocular depth estimation via MiDaS (ONNX)
//! - Simulated detections for the lightweight service
//! - Annotation drawing and JPEG encoding of the results
//!
//! Everything runs on CPU.

pub mod annotate;
pub mod colormap;
pub mod depth;
pub mod detection;
pub mod image_utils;
pub mod model_manager;
pub mod simulate;

pub use annotate::Annotator;
pub use depth::{DepthMap, MidasDepthEstimator};
pub use detection::{BoundingBox, Detection, YoloDetector};
pub use image_utils::{
    decode_image_bytes, decode_image_bytes_with_limit, detect_format, encode_jpeg,
    encode_jpeg_base64, ImageError, ImageInfo,
};
pub use model_manager::{VisionModelInfo, VisionModelManager};
pub use simulate::DetectionSimulator;
