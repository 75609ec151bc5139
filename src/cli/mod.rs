// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Command-line interface of the API server

use clap::Parser;
use std::path::PathBuf;

use crate::config::{ServiceConfig, ServiceMode};

/// Object detection and depth estimation HTTP API
#[derive(Parser, Debug)]
#[command(name = "object-depth-api")]
#[command(version)]
#[command(about = "Serves YOLO object detection and MiDaS depth estimation over HTTP", long_about = None)]
pub struct Cli {
    /// TOML configuration file (defaults to ./config.toml when present)
    #[arg(long, short = 'c', env = "CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Service variant to run
    #[arg(long, value_enum)]
    pub mode: Option<ServiceMode>,

    /// Listen address, e.g. 0.0.0.0:5000
    #[arg(long)]
    pub listen: Option<String>,

    /// YOLO ONNX model
    #[arg(long)]
    pub detector_model: Option<PathBuf>,

    /// MiDaS ONNX model
    #[arg(long)]
    pub depth_model: Option<PathBuf>,

    /// TrueType font for annotation labels
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Artificial delay of the lightweight service, in milliseconds
    #[arg(long)]
    pub simulated_latency_ms: Option<u64>,
}

impl Cli {
    /// Flags given on the command line override every other source
    pub fn apply_to(&self, config: &mut ServiceConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(listen) = &self.listen {
            config.server.listen_addr = listen.clone();
        }
        if let Some(path) = &self.detector_model {
            config.models.detector_model = path.clone();
        }
        if let Some(path) = &self.depth_model {
            config.models.depth_model = path.clone();
        }
        if let Some(path) = &self.font {
            config.annotation.font_path = Some(path.clone());
        }
        if let Some(latency) = self.simulated_latency_ms {
            config.lightweight.simulated_latency_ms = latency;
        }
    }
}
