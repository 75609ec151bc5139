// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod version;
pub mod vision;

// Re-export main types
pub use api::{create_app, start_server, AppState};
pub use config::{ServiceConfig, ServiceMode};
pub use pipeline::{ImagePipeline, ModelPipeline, PipelineError, PipelineOutput, SimulatedPipeline};
pub use vision::{BoundingBox, DepthMap, Detection};
