// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Configuration loading tests
//!
//! These tests verify that:
//! - A TOML file on disk is read and merged over defaults
//! - Overrides (environment in production) win over the file
//! - Invalid files and values are reported

use object_depth_api::config::{ServiceConfig, ServiceMode};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_config(
        r#"
mode = "lightweight"

[server]
listen_addr = "127.0.0.1:9000"

[models]
confidence_threshold = 0.3

[lightweight]
simulated_latency_ms = 250
"#,
    );

    let config = ServiceConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.mode, ServiceMode::Lightweight);
    assert_eq!(config.server.listen_addr, "127.0.0.1:9000");
    assert_eq!(config.models.confidence_threshold, 0.3);
    assert_eq!(config.models.iou_threshold, 0.7);
    assert_eq!(config.lightweight.simulated_latency_ms, 250);
    assert!(config.validate().is_ok());
}

#[test]
fn test_overrides_win_over_file() {
    let file = write_config("mode = \"lightweight\"\n[annotation]\njpeg_quality = 80\n");
    let mut config = ServiceConfig::load(Some(file.path())).unwrap();

    config
        .apply_overrides(|key| match key {
            "SERVICE_MODE" => Some("full".to_string()),
            "DETECTOR_MODEL_PATH" => Some("/opt/models/yolov8n.onnx".to_string()),
            _ => None,
        })
        .unwrap();

    assert_eq!(config.mode, ServiceMode::Full);
    assert_eq!(
        config.models.detector_model,
        PathBuf::from("/opt/models/yolov8n.onnx")
    );
    assert_eq!(config.annotation.jpeg_quality, 80);
}

#[test]
fn test_missing_file_is_an_error() {
    let result = ServiceConfig::load(Some(std::path::Path::new("/nonexistent/config.toml")));
    assert!(result.is_err());
}

#[test]
fn test_invalid_values_fail_validation() {
    let file = write_config("[models]\niou_threshold = 1.5\n");
    let config = ServiceConfig::load(Some(file.path())).unwrap();
    assert!(config.validate().is_err());
}
