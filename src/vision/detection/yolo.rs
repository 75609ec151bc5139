// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO object detection model
//!
//! Wraps an Ultralytics YOLO ONNX export (YOLOv8s by default) and turns raw
//! network output into [`Detection`]s in original image coordinates.

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use ndarray::ArrayViewD;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::labels::{coco_labels, parse_names_metadata};
use super::postprocess::{decode_yolo_output, image_to_tensor, non_max_suppression, Letterbox};
use super::Detection;
use crate::config::ModelsConfig;

/// Detector settings
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Square model input size (640 for stock exports)
    pub input_size: u32,
    /// Minimum class score kept
    pub confidence_threshold: f32,
    /// IoU above which same-class boxes are suppressed
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub intra_threads: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_size: 640,
            confidence_threshold: 0.45,
            iou_threshold: 0.7,
            max_detections: 300,
            intra_threads: 4,
        }
    }
}

impl From<&ModelsConfig> for DetectorConfig {
    fn from(models: &ModelsConfig) -> Self {
        Self {
            input_size: models.detector_input_size,
            confidence_threshold: models.confidence_threshold,
            iou_threshold: models.iou_threshold,
            max_detections: models.max_detections,
            intra_threads: models.intra_threads,
        }
    }
}

/// YOLO detection model
///
/// Runs on CPU. The session is shared behind a mutex; concurrent requests
/// take turns on it.
#[derive(Clone)]
pub struct YoloDetector {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Class labels indexed by class id
    labels: Arc<Vec<String>>,
    config: DetectorConfig,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("num_classes", &self.labels.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load a YOLO ONNX export
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub fn new<P: AsRef<Path>>(model_path: P, config: DetectorConfig) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading YOLO detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let labels = Self::read_labels(&session);

        debug!(
            "Detection model loaded - input: {}, classes: {}",
            input_name,
            labels.len()
        );
        info!("✅ YOLO detection model loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            labels: Arc::new(labels),
            config,
        })
    }

    /// Class names from the export's `names` metadata, COCO otherwise
    fn read_labels(session: &Session) -> Vec<String> {
        let from_metadata = session
            .metadata()
            .ok()
            .and_then(|metadata| metadata.custom("names").ok().flatten())
            .and_then(|raw| parse_names_metadata(&raw));

        match from_metadata {
            Some(labels) => labels,
            None => {
                warn!("Model has no usable 'names' metadata, falling back to COCO labels");
                coco_labels()
            }
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect objects in an image
    ///
    /// Returned boxes are in original pixel coordinates, clamped to the
    /// image, sorted by confidence (highest first).
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let start = Instant::now();
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let letterbox = Letterbox::new(width, height, self.config.input_size);
        let input = image_to_tensor(&letterbox.apply(&rgb));

        let input_value =
            Value::from_array(input).context("Failed to create detector input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Detection session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract detector output tensor")?;

        debug!("Detector output shape: {:?}", output_tensor.shape());

        let detections = detections_from_output(
            output_tensor.view(),
            &letterbox,
            (width, height),
            &self.labels,
            &self.config,
        )?;

        debug!(
            "Detected {} objects in {}ms",
            detections.len(),
            start.elapsed().as_millis()
        );

        Ok(detections)
    }
}

/// Decode raw network output, suppress overlaps and map the survivors back
/// into the `(width, height)` image the letterbox was built for
pub fn detections_from_output(
    output: ArrayViewD<f32>,
    letterbox: &Letterbox,
    (width, height): (u32, u32),
    labels: &[String],
    config: &DetectorConfig,
) -> Result<Vec<Detection>> {
    let candidates = decode_yolo_output(output, Some(labels.len()), config.confidence_threshold)?;
    let kept = non_max_suppression(candidates, config.iou_threshold, config.max_detections);

    Ok(kept
        .into_iter()
        .map(|candidate| Detection {
            class_id: candidate.class_id,
            class_name: labels
                .get(candidate.class_id)
                .cloned()
                .unwrap_or_else(|| format!("class_{}", candidate.class_id)),
            confidence: candidate.confidence,
            bbox: letterbox.unmap(&candidate.bbox).clamp_to(width, height),
        })
        .collect())
}
