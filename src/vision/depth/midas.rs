// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! MiDaS depth estimation model
//!
//! Runs a MiDaS small ONNX export (256x256 input) on CPU and produces a
//! [`DepthMap`] with the same extent as the input image.

use anyhow::{anyhow, Context, Result};
use image::{imageops, imageops::FilterType, DynamicImage, RgbImage};
use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use super::{DepthImage, DepthMap};
use crate::config::ModelsConfig;

/// ImageNet normalisation used by the MiDaS transforms
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

#[derive(Debug, Clone)]
pub struct DepthConfig {
    /// Square model input size (256 for MiDaS small)
    pub input_size: u32,
    pub intra_threads: usize,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            input_size: 256,
            intra_threads: 4,
        }
    }
}

impl From<&ModelsConfig> for DepthConfig {
    fn from(models: &ModelsConfig) -> Self {
        Self {
            input_size: models.depth_input_size,
            intra_threads: models.intra_threads,
        }
    }
}

/// MiDaS monocular depth estimator
#[derive(Clone)]
pub struct MidasDepthEstimator {
    session: Arc<Mutex<Session>>,
    input_name: String,
    config: DepthConfig,
}

impl std::fmt::Debug for MidasDepthEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidasDepthEstimator")
            .field("input_name", &self.input_name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MidasDepthEstimator {
    /// Load a MiDaS ONNX export
    pub fn new<P: AsRef<Path>>(model_path: P, config: DepthConfig) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Depth model not found: {}", model_path.display());
        }

        info!("Loading MiDaS depth model from {}", model_path.display());

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
                "Failed to load depth model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "input".to_string());

        info!("✅ MiDaS depth model loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            config,
        })
    }

    /// Estimate depth for an image
    ///
    /// The prediction is upsampled (bicubic) to the input image size and
    /// min-max normalised to `[0, 1]`.
    pub fn estimate(&self, image: &DynamicImage) -> Result<DepthMap> {
        let start = Instant::now();
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let input = preprocess(&rgb, self.config.input_size);
        let input_value =
            Value::from_array(input).context("Failed to create depth input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Depth session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Depth inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract depth output tensor")?;

        let shape = output_tensor.shape().to_vec();
        let (pred_height, pred_width) = match shape.as_slice() {
            [_, h, w] => (*h, *w),
            [_, _, h, w] => (*h, *w),
            [h, w] => (*h, *w),
            _ => anyhow::bail!(
                "Invalid depth output shape: expected [1, H, W] or [1, 1, H, W], got {:?}",
                shape
            ),
        };

        let raw: Vec<f32> = output_tensor.iter().copied().collect();
        let prediction = DepthImage::from_raw(pred_width as u32, pred_height as u32, raw)
            .ok_or_else(|| anyhow!("Depth output does not match its shape {:?}", shape))?;

        let depth = DepthMap::from_prediction(&prediction, width, height);

        debug!(
            "Depth map {}x{} (prediction {}x{}) in {}ms",
            width,
            height,
            pred_width,
            pred_height,
            start.elapsed().as_millis()
        );

        Ok(depth)
    }
}

/// Resize to the square input and apply ImageNet normalisation, NCHW
pub fn preprocess(image: &RgbImage, input_size: u32) -> Array4<f32> {
    let resized = if image.dimensions() == (input_size, input_size) {
        image.clone()
    } else {
        imageops::resize(image, input_size, input_size, FilterType::CatmullRom)
    };

    let size = input_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));

    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            tensor[[0, c, y, x]] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }

    tensor
}
