// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Simulated detections for the lightweight service
//!
//! Produces 1-3 plausible-looking detections of a few common objects without
//! running any model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::detection::{BoundingBox, Detection};
use super::detection::COCO_CLASSES;

/// Objects the simulator picks from, with their base confidence
pub const DEMO_OBJECTS: [(&str, f32); 5] = [
    ("person", 0.92),
    ("car", 0.89),
    ("dog", 0.85),
    ("cat", 0.87),
    ("bicycle", 0.82),
];

pub const MIN_DETECTIONS: usize = 1;
pub const MAX_DETECTIONS: usize = 3;

const MIN_CONFIDENCE: f32 = 0.70;
const MAX_CONFIDENCE: f32 = 0.98;

/// Random detection generator
#[derive(Debug)]
pub struct DetectionSimulator<R: Rng = StdRng> {
    rng: R,
}

impl DetectionSimulator<StdRng> {
    /// Simulator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic simulator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for DetectionSimulator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> DetectionSimulator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate detections for a `width x height` image
    pub fn simulate(&mut self, width: u32, height: u32) -> Vec<Detection> {
        let count = self.rng.gen_range(MIN_DETECTIONS..=MAX_DETECTIONS);
        (0..count).map(|_| self.one(width, height)).collect()
    }

    fn one(&mut self, width: u32, height: u32) -> Detection {
        let (name, base_confidence) = DEMO_OBJECTS[self.rng.gen_range(0..DEMO_OBJECTS.len())];

        let x1 = self.below(width - width / 3);
        let y1 = self.below(height - height / 3);
        let box_w = self.between(width / 5, width / 2);
        let box_h = self.between(height / 5, height / 2);
        let x2 = (x1 + box_w).min(width);
        let y2 = (y1 + box_h).min(height);

        let jitter: f32 = self.rng.gen_range(0.9..1.1);
        let confidence = (base_confidence * jitter).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
        let confidence = (confidence * 100.0).round() / 100.0;

        Detection {
            class_id: COCO_CLASSES.iter().position(|c| *c == name).unwrap_or(0),
            class_name: name.to_string(),
            confidence,
            bbox: BoundingBox::new(x1 as f32, y1 as f32, x2 as f32, y2 as f32),
        }
    }

    /// Uniform in `[0, upper)`, or 0 when the range is empty
    fn below(&mut self, upper: u32) -> u32 {
        if upper == 0 {
            0
        } else {
            self.rng.gen_range(0..upper)
        }
    }

    /// Uniform in `[low, high)`, or `low` when the range is empty
    fn between(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            low
        } else {
            self.rng.gen_range(low..high)
        }
    }
}
