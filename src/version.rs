// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Object Detection & Depth Estimation API

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-detection-depth-2025-10-20";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-10-20";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "yolo-detection",
    "midas-depth",
    "lightweight-simulation",
    "multipart-upload",
    "url-download",
    "base64-jpeg-output",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Object Detection API {} ({})", VERSION_NUMBER, BUILD_DATE)
}
