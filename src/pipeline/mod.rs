// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection pipelines behind the HTTP layer
//!
//! - `model` - YOLO detection + MiDaS depth (full service)
//! - `simulated` - random detections (lightweight service)

pub mod model;
pub mod simulated;

pub use model::ModelPipeline;
pub use simulated::SimulatedPipeline;

use image::{DynamicImage, RgbImage};
use std::time::Duration;
use thiserror::Error;

use crate::config::ServiceMode;
use crate::vision::Detection;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Object detection failed: {0}")]
    Detection(String),

    #[error("Depth estimation failed: {0}")]
    Depth(String),
}

/// Result of processing one image
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub detections: Vec<Detection>,
    /// Annotated frame returned to the caller
    pub image: RgbImage,
}

/// One request's worth of image processing
///
/// Implementations are CPU-bound and are called from blocking tasks.
pub trait ImagePipeline: Send + Sync {
    fn mode(&self) -> ServiceMode;

    /// Detect objects and render the annotated output frame
    fn process(&self, image: &DynamicImage) -> Result<PipelineOutput, PipelineError>;

    /// Message reported by the health endpoint
    fn health_message(&self) -> &str;

    /// Extra remark for the health endpoint, if any
    fn health_note(&self) -> Option<&str> {
        None
    }

    /// Disclaimer attached to responses, if any
    fn note(&self) -> Option<&str> {
        None
    }

    /// Delay applied before answering a detect request
    fn simulated_latency(&self) -> Duration {
        Duration::ZERO
    }
}
