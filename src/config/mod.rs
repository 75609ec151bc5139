// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Values are resolved in this order (later wins):
//! defaults, `config.toml`, environment variables, command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Maximum accepted upload / download size (10MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Which variant of the service to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    /// YOLO detection + MiDaS depth estimation
    #[default]
    Full,
    /// Simulated detections, no models required
    Lightweight,
}

impl ServiceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMode::Full => "full",
            ServiceMode::Lightweight => "lightweight",
        }
    }
}

impl std::str::FromStr for ServiceMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ServiceMode::Full),
            "lightweight" | "lite" | "light" => Ok(ServiceMode::Lightweight),
            other => Err(ConfigError::Invalid {
                field: "mode".to_string(),
                message: format!("unknown mode '{}', expected 'full' or 'lightweight'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub max_upload_bytes: usize,
    pub download_timeout_secs: u64,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            download_timeout_secs: 30,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// YOLO ONNX export (Ultralytics layout)
    pub detector_model: PathBuf,
    /// MiDaS small ONNX export
    pub depth_model: PathBuf,
    pub detector_input_size: u32,
    pub depth_input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub intra_threads: usize,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            detector_model: PathBuf::from("./models/yolov8s.onnx"),
            depth_model: PathBuf::from("./models/midas_v21_small_256.onnx"),
            detector_input_size: 640,
            depth_input_size: 256,
            confidence_threshold: 0.45,
            iou_threshold: 0.7,
            max_detections: 300,
            intra_threads: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// TrueType font used for labels; system fonts are searched when unset
    pub font_path: Option<PathBuf>,
    pub jpeg_quality: u8,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            jpeg_quality: 95,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightweightConfig {
    /// Artificial delay before answering, mimics inference time
    pub simulated_latency_ms: u64,
}

impl Default for LightweightConfig {
    fn default() -> Self {
        Self {
            simulated_latency_ms: 1000,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub mode: ServiceMode,
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub annotation: AnnotationConfig,
    pub lightweight: LightweightConfig,
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path` if given, otherwise from `./config.toml` when it exists
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default_path = Path::new("config.toml");
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply overrides from environment variables
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("SERVICE_MODE") {
            self.mode = val.parse()?;
        }

        if let Some(val) = lookup("API_LISTEN_ADDR") {
            self.server.listen_addr = val;
        } else if let Some(port) = lookup("API_PORT") {
            let port: u16 = parse_field("API_PORT", &port)?;
            let host = self
                .server
                .listen_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.server.listen_addr = format!("{}:{}", host, port);
        }

        if let Some(val) = lookup("DETECTOR_MODEL_PATH") {
            self.models.detector_model = PathBuf::from(val);
        }
        if let Some(val) = lookup("DEPTH_MODEL_PATH") {
            self.models.depth_model = PathBuf::from(val);
        }
        if let Some(val) = lookup("FONT_PATH") {
            self.annotation.font_path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("JPEG_QUALITY") {
            self.annotation.jpeg_quality = parse_field("JPEG_QUALITY", &val)?;
        }
        if let Some(val) = lookup("MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = parse_field("MAX_UPLOAD_BYTES", &val)?;
        }
        if let Some(val) = lookup("SIMULATED_LATENCY_MS") {
            self.lightweight.simulated_latency_ms = parse_field("SIMULATED_LATENCY_MS", &val)?;
        }

        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, message: String| ConfigError::Invalid {
            field: field.to_string(),
            message,
        };

        if !(0.0..=1.0).contains(&self.models.confidence_threshold) {
            return Err(invalid(
                "models.confidence_threshold",
                format!("must be within [0, 1], got {}", self.models.confidence_threshold),
            ));
        }
        if !(0.0..=1.0).contains(&self.models.iou_threshold) {
            return Err(invalid(
                "models.iou_threshold",
                format!("must be within [0, 1], got {}", self.models.iou_threshold),
            ));
        }
        if self.models.detector_input_size == 0 || self.models.depth_input_size == 0 {
            return Err(invalid(
                "models.input_size",
                "model input sizes must be non-zero".to_string(),
            ));
        }
        if self.models.max_detections == 0 {
            return Err(invalid(
                "models.max_detections",
                "must be at least 1".to_string(),
            ));
        }
        if !(1..=100).contains(&self.annotation.jpeg_quality) {
            return Err(invalid(
                "annotation.jpeg_quality",
                format!("must be within 1-100, got {}", self.annotation.jpeg_quality),
            ));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(invalid(
                "server.max_upload_bytes",
                "must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        field: field.to_string(),
        message: e.to_string(),
    })
}
