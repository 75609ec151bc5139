// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision model manager for loading the detection and depth models

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ModelsConfig;
use crate::vision::depth::{DepthConfig, MidasDepthEstimator};
use crate::vision::detection::{DetectorConfig, YoloDetector};

/// Information about a loaded vision model
#[derive(Debug, Clone)]
pub struct VisionModelInfo {
    /// Model name
    pub name: String,
    /// Model type (detection, depth)
    pub model_type: String,
    /// ONNX file the model was loaded from
    pub path: PathBuf,
}

/// Manager for vision models (YOLO and MiDaS)
///
/// Both models are loaded once at start-up and shared by every request.
/// They run on CPU only.
#[derive(Debug, Clone)]
pub struct VisionModelManager {
    detector: Arc<YoloDetector>,
    depth: Arc<MidasDepthEstimator>,
    config: ModelsConfig,
}

impl VisionModelManager {
    /// Load both models
    ///
    /// The full service cannot run without either of them, so any load
    /// failure is returned.
    pub fn load(config: &ModelsConfig) -> anyhow::Result<Self> {
        let detector = YoloDetector::new(&config.detector_model, DetectorConfig::from(config))
            .with_context(|| {
                format!(
                    "Failed to load detection model {}",
                    config.detector_model.display()
                )
            })?;
        tracing::info!("✅ YOLO detector loaded from {}", config.detector_model.display());

        let depth = MidasDepthEstimator::new(&config.depth_model, DepthConfig::from(config))
            .with_context(|| {
                format!("Failed to load depth model {}", config.depth_model.display())
            })?;
        tracing::info!("✅ MiDaS depth model loaded from {}", config.depth_model.display());

        Ok(Self {
            detector: Arc::new(detector),
            depth: Arc::new(depth),
            config: config.clone(),
        })
    }

    pub fn detector(&self) -> Arc<YoloDetector> {
        self.detector.clone()
    }

    pub fn depth(&self) -> Arc<MidasDepthEstimator> {
        self.depth.clone()
    }

    /// List loaded models
    pub fn list_models(&self) -> Vec<VisionModelInfo> {
        vec![
            VisionModelInfo {
                name: model_name(&self.config.detector_model, "yolo"),
                model_type: "detection".to_string(),
                path: self.config.detector_model.clone(),
            },
            VisionModelInfo {
                name: model_name(&self.config.depth_model, "midas"),
                model_type: "depth".to_string(),
                path: self.config.depth_model.clone(),
            },
        ]
    }
}

fn model_name(path: &std::path::Path, fallback: &str) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| fallback.to_string())
}
