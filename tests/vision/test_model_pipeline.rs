// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model pipeline tests (YOLO + MiDaS)
//!
//! These tests need the ONNX exports on disk. They look in `./models/` (or
//! DETECTOR_MODEL_PATH / DEPTH_MODEL_PATH) and skip themselves when the files
//! are absent.

use image::{DynamicImage, Rgb, RgbImage};
use object_depth_api::{
    config::ModelsConfig,
    pipeline::{ImagePipeline, ModelPipeline},
    vision::{Annotator, VisionModelManager},
};
use std::path::PathBuf;

fn models_config() -> Option<ModelsConfig> {
    let mut config = ModelsConfig::default();
    if let Ok(path) = std::env::var("DETECTOR_MODEL_PATH") {
        config.detector_model = PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("DEPTH_MODEL_PATH") {
        config.depth_model = PathBuf::from(path);
    }

    if config.detector_model.exists() && config.depth_model.exists() {
        Some(config)
    } else {
        eprintln!(
            "⚠️ Skipping: models not found ({} / {})",
            config.detector_model.display(),
            config.depth_model.display()
        );
        None
    }
}

fn scene(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        if (x / 40 + y / 40) % 2 == 0 {
            Rgb([200, 180, 160])
        } else {
            Rgb([30, 60, 90])
        }
    }))
}

#[cfg(test)]
mod model_pipeline_tests {
    use super::*;

    #[test]
    fn test_model_manager_loads_both_models() {
        let Some(config) = models_config() else {
            return;
        };

        let manager = VisionModelManager::load(&config).expect("Failed to load models");
        let models = manager.list_models();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].model_type, "detection");
        assert_eq!(models[1].model_type, "depth");
        assert!(!manager.detector().labels().is_empty());
    }

    #[test]
    fn test_full_pipeline_output() {
        let Some(config) = models_config() else {
            return;
        };

        let manager = VisionModelManager::load(&config).expect("Failed to load models");
        let pipeline = ModelPipeline::from_manager(&manager, Annotator::with_font(None));

        let output = pipeline.process(&scene(320, 200)).expect("Pipeline failed");

        assert_eq!(output.image.dimensions(), (640, 200));
        for detection in &output.detections {
            assert!((0.0..=1.0).contains(&detection.confidence));
            let [x1, y1, x2, y2] = detection.bbox.to_pixels();
            assert!(x1 <= x2 && x2 <= 320);
            assert!(y1 <= y2 && y2 <= 200);
        }
    }

    #[test]
    fn test_depth_map_matches_image_size() {
        let Some(config) = models_config() else {
            return;
        };

        let manager = VisionModelManager::load(&config).expect("Failed to load models");
        let depth = manager.depth().estimate(&scene(123, 77)).expect("Depth failed");

        assert_eq!((depth.width(), depth.height()), (123, 77));
        assert!(depth.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_missing_models_are_an_error() {
        let config = ModelsConfig {
            detector_model: PathBuf::from("/nonexistent/yolo.onnx"),
            depth_model: PathBuf::from("/nonexistent/midas.onnx"),
            ..ModelsConfig::default()
        };
        assert!(VisionModelManager::load(&config).is_err());
    }
}
