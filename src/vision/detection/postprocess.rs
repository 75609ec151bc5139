// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO pre/post-processing: letterbox, output decoding and NMS

use anyhow::Result;
use image::{imageops, imageops::FilterType, Rgb, RgbImage};
use ndarray::{Array4, ArrayView2, ArrayViewD, Axis, Ix2};

use super::BoundingBox;

/// Padding colour used by Ultralytics letterboxing
pub const LETTERBOX_FILL: u8 = 114;

/// Aspect-preserving resize of an image into a square model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub input_size: u32,
    pub resized_width: u32,
    pub resized_height: u32,
}

impl Letterbox {
    pub fn new(width: u32, height: u32, input_size: u32) -> Self {
        let scale = (input_size as f32 / width as f32).min(input_size as f32 / height as f32);
        let resized_width = ((width as f32 * scale).round() as u32).clamp(1, input_size);
        let resized_height = ((height as f32 * scale).round() as u32).clamp(1, input_size);

        Self {
            scale,
            pad_x: (input_size - resized_width) as f32 / 2.0,
            pad_y: (input_size - resized_height) as f32 / 2.0,
            input_size,
            resized_width,
            resized_height,
        }
    }

    /// Produce the padded square image
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        let resized = imageops::resize(
            image,
            self.resized_width,
            self.resized_height,
            FilterType::Triangle,
        );

        let mut canvas = RgbImage::from_pixel(
            self.input_size,
            self.input_size,
            Rgb([LETTERBOX_FILL; 3]),
        );
        imageops::replace(
            &mut canvas,
            &resized,
            self.pad_x.floor() as i64,
            self.pad_y.floor() as i64,
        );
        canvas
    }

    /// Map a box from model-input space back to the original image
    pub fn unmap(&self, bbox: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x1: (bbox.x1 - self.pad_x) / self.scale,
            y1: (bbox.y1 - self.pad_y) / self.scale,
            x2: (bbox.x2 - self.pad_x) / self.scale,
            y2: (bbox.y2 - self.pad_y) / self.scale,
        }
    }
}

/// Convert an RGB image to a `[1, 3, H, W]` tensor scaled to `[0, 1]`
pub fn image_to_tensor(image: &RgbImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        tensor[[0, 0, y, x]] = pixel[0] as f32 / 255.0;
        tensor[[0, 1, y, x]] = pixel[1] as f32 / 255.0;
        tensor[[0, 2, y, x]] = pixel[2] as f32 / 255.0;
    }

    tensor
}

/// A candidate box straight out of the network, in model-input space
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Decode a YOLOv8-style output tensor.
///
/// Accepts `[1, 4 + C, N]` (Ultralytics default), `[1, N, 4 + C]` or the
/// same without the batch axis. Each of the N candidates keeps its best
/// class; candidates below `confidence_threshold` are dropped.
///
/// With `num_classes` known the attribute axis is the one of length `4 + C`,
/// otherwise it is taken to be the shorter axis.
pub fn decode_yolo_output(
    output: ArrayViewD<f32>,
    num_classes: Option<usize>,
    confidence_threshold: f32,
) -> Result<Vec<Candidate>> {
    let view: ArrayView2<f32> = match output.ndim() {
        3 => output.index_axis_move(Axis(0), 0).into_dimensionality::<Ix2>()?,
        2 => output.into_dimensionality::<Ix2>()?,
        _ => anyhow::bail!("Unexpected detector output shape: {:?}", output.shape()),
    };

    let attributes_first = match num_classes {
        Some(nc) if view.nrows() == 4 + nc => true,
        Some(nc) if view.ncols() == 4 + nc => false,
        _ => view.nrows() <= view.ncols(),
    };
    let view = if attributes_first {
        view
    } else {
        view.reversed_axes()
    };

    let attributes = view.nrows();
    if attributes < 5 {
        anyhow::bail!(
            "Detector output has {} attributes per box, expected at least 5",
            attributes
        );
    }

    let mut candidates = Vec::new();
    for column in view.axis_iter(Axis(1)) {
        let (class_id, confidence) = column
            .iter()
            .skip(4)
            .enumerate()
            .fold((0usize, f32::MIN), |best, (i, &score)| {
                if score > best.1 {
                    (i, score)
                } else {
                    best
                }
            });

        if confidence.is_nan() || confidence < confidence_threshold {
            continue;
        }
        if column.iter().take(4).any(|v| !v.is_finite()) {
            continue;
        }

        candidates.push(Candidate {
            class_id,
            confidence: confidence.clamp(0.0, 1.0),
            bbox: BoundingBox::from_center(column[0], column[1], column[2], column[3]),
        });
    }

    Ok(candidates)
}

/// Class-aware non-maximum suppression.
///
/// Returns at most `max_detections` candidates sorted by confidence, highest first.
pub fn non_max_suppression(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if keep.len() >= max_detections {
            break;
        }

        let suppressed = keep.iter().any(|kept| {
            kept.class_id == candidate.class_id && kept.bbox.iou(&candidate.bbox) > iou_threshold
        });

        if !suppressed {
            keep.push(candidate);
        }
    }

    keep
}
