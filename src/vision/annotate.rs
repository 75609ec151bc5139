// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Drawing of detections and depth visualisations
//!
//! Two styles are supported:
//! - full: thin bright-green boxes with black label text, plus a magma depth
//!   panel appended on the right
//! - simulated: thick green boxes with white label text on the input frame

use ab_glyph::{FontArc, PxScale};
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::colormap::colorize;
use super::depth::DepthMap;
use super::detection::Detection;
use crate::config::AnnotationConfig;

/// Well-known TrueType locations searched when no font is configured
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const FULL_BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const FULL_TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const FULL_BOX_THICKNESS: u32 = 2;
const FULL_LABEL_FONT_SIZE: f32 = 16.0;

const SIMULATED_BOX_COLOR: Rgb<u8> = Rgb([0, 128, 0]);
const SIMULATED_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const SIMULATED_BOX_THICKNESS: u32 = 3;
const SIMULATED_LABEL_FONT_SIZE: f32 = 14.0;

const CAPTION: &str = "Depth Map";
const CAPTION_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const CAPTION_FONT_SIZE: f32 = 28.0;
const CAPTION_ORIGIN: (i32, i32) = (10, 8);

/// Rough glyph width relative to font size, used when no font is loaded
const FALLBACK_CHAR_WIDTH: f32 = 0.55;

/// Label padding around the text, in pixels
const LABEL_PADDING: u32 = 4;

struct BoxStyle {
    box_color: Rgb<u8>,
    text_color: Rgb<u8>,
    thickness: u32,
    font_size: f32,
}

const FULL_STYLE: BoxStyle = BoxStyle {
    box_color: FULL_BOX_COLOR,
    text_color: FULL_TEXT_COLOR,
    thickness: FULL_BOX_THICKNESS,
    font_size: FULL_LABEL_FONT_SIZE,
};

const SIMULATED_STYLE: BoxStyle = BoxStyle {
    box_color: SIMULATED_BOX_COLOR,
    text_color: SIMULATED_TEXT_COLOR,
    thickness: SIMULATED_BOX_THICKNESS,
    font_size: SIMULATED_LABEL_FONT_SIZE,
};

/// Renders annotated output frames
#[derive(Clone)]
pub struct Annotator {
    /// Label font; text is skipped when absent
    font: Option<FontArc>,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl Annotator {
    /// Build an annotator, loading the configured font or a system font
    pub fn new(config: &AnnotationConfig) -> Self {
        let font = load_font(config.font_path.as_deref());
        if font.is_none() {
            warn!("No usable TrueType font found, annotations will be drawn without text");
        }
        Self { font }
    }

    /// Annotator with an explicit font (or none)
    pub fn with_font(font: Option<FontArc>) -> Self {
        Self { font }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Detections on the left, colourised depth on the right (`2w x h`)
    pub fn render_full(
        &self,
        image: &RgbImage,
        detections: &[Detection],
        depth: &DepthMap,
    ) -> RgbImage {
        let (width, height) = image.dimensions();

        let mut frame = image.clone();
        for detection in detections {
            self.draw_detection(&mut frame, detection, &FULL_STYLE);
        }

        let mut depth_panel = colorize(depth);
        if depth_panel.dimensions() != (width, height) {
            depth_panel =
                imageops::resize(&depth_panel, width, height, imageops::FilterType::Triangle);
        }
        if let Some(font) = &self.font {
            draw_text_mut(
                &mut depth_panel,
                CAPTION_COLOR,
                CAPTION_ORIGIN.0,
                CAPTION_ORIGIN.1,
                PxScale::from(CAPTION_FONT_SIZE),
                font,
                CAPTION,
            );
        }

        let mut combined = RgbImage::new(width * 2, height);
        imageops::replace(&mut combined, &frame, 0, 0);
        imageops::replace(&mut combined, &depth_panel, width as i64, 0);
        combined
    }

    /// Detections drawn onto a copy of the input frame
    pub fn render_simulated(&self, image: &RgbImage, detections: &[Detection]) -> RgbImage {
        let mut frame = image.clone();
        for detection in detections {
            self.draw_detection(&mut frame, detection, &SIMULATED_STYLE);
        }
        frame
    }

    fn draw_detection(&self, image: &mut RgbImage, detection: &Detection, style: &BoxStyle) {
        let (img_w, img_h) = image.dimensions();
        if img_w == 0 || img_h == 0 {
            return;
        }

        let [x1, y1, x2, y2] = detection.bbox.clamp_to(img_w, img_h).to_pixels();
        let x1 = x1.min(img_w - 1);
        let y1 = y1.min(img_h - 1);
        let x2 = x2.min(img_w - 1).max(x1);
        let y2 = y2.min(img_h - 1).max(y1);

        // Concentric outlines, shrinking inwards
        for t in 0..style.thickness {
            if x1 + t > x2.saturating_sub(t) || y1 + t > y2.saturating_sub(t) {
                break;
            }
            let rect = Rect::at((x1 + t) as i32, (y1 + t) as i32)
                .of_size(x2 - x1 - 2 * t + 1, y2 - y1 - 2 * t + 1);
            draw_hollow_rect_mut(image, rect, style.box_color);
        }

        let label = detection.label();
        let scale = PxScale::from(style.font_size);
        let (text_w, text_h) = match &self.font {
            Some(font) => text_size(scale, font, &label),
            None => (
                (label.chars().count() as f32 * style.font_size * FALLBACK_CHAR_WIDTH) as u32,
                style.font_size as u32,
            ),
        };

        let label_w = (text_w + LABEL_PADDING).min(img_w - x1);
        let label_h = text_h + LABEL_PADDING * 2;
        // Above the box when there is room, otherwise just inside it
        let label_y = if y1 >= label_h { y1 - label_h } else { y1 };
        let label_h = label_h.min(img_h - label_y);

        if label_w == 0 || label_h == 0 {
            return;
        }

        draw_filled_rect_mut(
            image,
            Rect::at(x1 as i32, label_y as i32).of_size(label_w, label_h),
            style.box_color,
        );

        if let Some(font) = &self.font {
            draw_text_mut(
                image,
                style.text_color,
                (x1 + LABEL_PADDING / 2) as i32,
                (label_y + LABEL_PADDING) as i32,
                scale,
                font,
                &label,
            );
        }
    }
}

/// Load the configured font, or the first readable system font
pub fn load_font(configured: Option<&Path>) -> Option<FontArc> {
    if let Some(path) = configured {
        match read_font(path) {
            Some(font) => return Some(font),
            None => warn!("Configured font {} could not be loaded", path.display()),
        }
    }

    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .filter(|path| path.exists())
        .find_map(|path| read_font(&path))
}

fn read_font(path: &Path) -> Option<FontArc> {
    let data = std::fs::read(path).ok()?;
    match FontArc::try_from_vec(data) {
        Ok(font) => {
            info!("Using font {}", path.display());
            Some(font)
        }
        Err(e) => {
            debug!("{} is not a usable font: {}", path.display(), e);
            None
        }
    }
}
