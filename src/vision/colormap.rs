// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Magma colormap for depth visualisation

use image::{Rgb, RgbImage};

use super::depth::DepthMap;

/// Evenly spaced anchors of matplotlib's `magma`, dark to bright
const MAGMA_ANCHORS: [[u8; 3]; 11] = [
    [0x00, 0x00, 0x04],
    [0x14, 0x0e, 0x36],
    [0x3b, 0x0f, 0x70],
    [0x64, 0x1a, 0x80],
    [0x8c, 0x29, 0x81],
    [0xb7, 0x37, 0x79],
    [0xde, 0x49, 0x68],
    [0xf7, 0x70, 0x5c],
    [0xfe, 0x9f, 0x6d],
    [0xfe, 0xcf, 0x92],
    [0xfc, 0xfd, 0xbf],
];

/// Map `t` in `[0, 1]` to a magma colour (out-of-range and NaN are clamped)
pub fn magma(t: f32) -> Rgb<u8> {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    let segments = (MAGMA_ANCHORS.len() - 1) as f32;
    let position = t * segments;
    let lower = (position.floor() as usize).min(MAGMA_ANCHORS.len() - 2);
    let frac = position - lower as f32;

    let a = MAGMA_ANCHORS[lower];
    let b = MAGMA_ANCHORS[lower + 1];

    let mix = |c: usize| -> u8 {
        let value = a[c] as f32 + (b[c] as f32 - a[c] as f32) * frac;
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgb([mix(0), mix(1), mix(2)])
}

/// Colourise a normalised depth map
pub fn colorize(depth: &DepthMap) -> RgbImage {
    RgbImage::from_fn(depth.width(), depth.height(), |x, y| magma(depth.get(x, y)))
}
