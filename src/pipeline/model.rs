// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Full pipeline: YOLO detection, MiDaS depth, side-by-side rendering

use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::{ImagePipeline, PipelineError, PipelineOutput};
use crate::config::ServiceMode;
use crate::vision::{Annotator, MidasDepthEstimator, VisionModelManager, YoloDetector};

pub const FULL_HEALTH_MESSAGE: &str = "Object Detection and Depth Estimation API is running";

pub struct ModelPipeline {
    detector: Arc<YoloDetector>,
    depth: Arc<MidasDepthEstimator>,
    annotator: Annotator,
}

impl ModelPipeline {
    pub fn new(
        detector: Arc<YoloDetector>,
        depth: Arc<MidasDepthEstimator>,
        annotator: Annotator,
    ) -> Self {
        Self {
            detector,
            depth,
            annotator,
        }
    }

    pub fn from_manager(manager: &VisionModelManager, annotator: Annotator) -> Self {
        Self::new(manager.detector(), manager.depth(), annotator)
    }
}

impl ImagePipeline for ModelPipeline {
    fn mode(&self) -> ServiceMode {
        ServiceMode::Full
    }

    fn process(&self, image: &DynamicImage) -> Result<PipelineOutput, PipelineError> {
        let start = Instant::now();

        let detections = self
            .detector
            .detect(image)
            .map_err(|e| PipelineError::Detection(format!("{:#}", e)))?;

        let depth = self
            .depth
            .estimate(image)
            .map_err(|e| PipelineError::Depth(format!("{:#}", e)))?;

        let frame = image.to_rgb8();
        let rendered = self.annotator.render_full(&frame, &detections, &depth);

        debug!(
            "Full pipeline: {} detections, {}x{} output in {}ms",
            detections.len(),
            rendered.width(),
            rendered.height(),
            start.elapsed().as_millis()
        );

        Ok(PipelineOutput {
            detections,
            image: rendered,
        })
    }

    fn health_message(&self) -> &str {
        FULL_HEALTH_MESSAGE
    }
}
