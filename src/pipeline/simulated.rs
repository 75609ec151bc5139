// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Lightweight pipeline: simulated detections, no models

use image::DynamicImage;
use rand::rngs::StdRng;
use std::sync::Mutex;
use std::time::Duration;

use super::{ImagePipeline, PipelineError, PipelineOutput};
use crate::config::{LightweightConfig, ServiceMode};
use crate::vision::{Annotator, DetectionSimulator};

pub const LIGHTWEIGHT_HEALTH_MESSAGE: &str =
    "Object Detection API is running (Lightweight Version)";
pub const LIGHTWEIGHT_HEALTH_NOTE: &str =
    "This is a lightweight version that simulates detection results due to disk quota limitations";
pub const SIMULATED_RESULT_NOTE: &str = "This is a simulated result due to disk quota limitations";

pub struct SimulatedPipeline {
    simulator: Mutex<DetectionSimulator<StdRng>>,
    annotator: Annotator,
    latency: Duration,
}

impl SimulatedPipeline {
    pub fn new(config: &LightweightConfig, annotator: Annotator) -> Self {
        Self::with_simulator(DetectionSimulator::new(), config, annotator)
    }

    pub fn with_simulator(
        simulator: DetectionSimulator<StdRng>,
        config: &LightweightConfig,
        annotator: Annotator,
    ) -> Self {
        Self {
            simulator: Mutex::new(simulator),
            annotator,
            latency: Duration::from_millis(config.simulated_latency_ms),
        }
    }
}

impl ImagePipeline for SimulatedPipeline {
    fn mode(&self) -> ServiceMode {
        ServiceMode::Lightweight
    }

    fn process(&self, image: &DynamicImage) -> Result<PipelineOutput, PipelineError> {
        let frame = image.to_rgb8();

        let detections = {
            let mut simulator = self
                .simulator
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            simulator.simulate(frame.width(), frame.height())
        };

        let rendered = self.annotator.render_simulated(&frame, &detections);

        Ok(PipelineOutput {
            detections,
            image: rendered,
        })
    }

    fn health_message(&self) -> &str {
        LIGHTWEIGHT_HEALTH_MESSAGE
    }

    fn health_note(&self) -> Option<&str> {
        Some(LIGHTWEIGHT_HEALTH_NOTE)
    }

    fn note(&self) -> Option<&str> {
        Some(SIMULATED_RESULT_NOTE)
    }

    fn simulated_latency(&self) -> Duration {
        self.latency
    }
}
