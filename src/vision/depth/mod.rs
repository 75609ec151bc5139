// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Monocular depth estimation (MiDaS)

pub mod midas;

pub use midas::{DepthConfig, MidasDepthEstimator};

use image::{imageops, imageops::FilterType, ImageBuffer, Luma};

/// Single-channel float image
pub type DepthImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Per-pixel relative depth, min-max normalised to `[0, 1]`
#[derive(Debug, Clone)]
pub struct DepthMap {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl DepthMap {
    /// Normalise raw model output (row-major, `width * height` values)
    ///
    /// A constant input maps to all zeros.
    pub fn from_raw(width: u32, height: u32, raw: Vec<f32>) -> Option<Self> {
        if raw.len() != (width as usize) * (height as usize) {
            return None;
        }

        let (min, max) = raw
            .iter()
            .filter(|v| v.is_finite())
            .fold((f32::MAX, f32::MIN), |(min, max), &v| (min.min(v), max.max(v)));
        let range = max - min;

        let values = if range > f32::EPSILON {
            raw.into_iter()
                .map(|v| {
                    if v.is_finite() {
                        ((v - min) / range).clamp(0.0, 1.0)
                    } else {
                        0.0
                    }
                })
                .collect()
        } else {
            vec![0.0; raw.len()]
        };

        Some(Self {
            width,
            height,
            values,
        })
    }

    /// Bicubic upsampling of a raw prediction to `(width, height)`, then normalisation
    pub fn from_prediction(prediction: &DepthImage, width: u32, height: u32) -> Self {
        let resized = if prediction.dimensions() == (width, height) {
            prediction.clone()
        } else {
            imageops::resize(prediction, width, height, FilterType::CatmullRom)
        };

        let (w, h) = resized.dimensions();
        let raw = resized.into_raw();
        Self::from_raw(w, h, raw).unwrap_or_else(|| Self {
            width: w,
            height: h,
            values: vec![0.0; (w as usize) * (h as usize)],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Normalised value at `(x, y)`
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[(y as usize) * (self.width as usize) + (x as usize)]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}
