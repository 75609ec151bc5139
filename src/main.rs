// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use object_depth_api::{
    api::{start_server, AppState},
    cli::Cli,
    config::{ServiceConfig, ServiceMode},
    pipeline::{ImagePipeline, ModelPipeline, SimulatedPipeline},
    version,
    vision::{Annotator, VisionModelManager},
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    println!("🚀 Starting {}...\n", version::get_version_string());
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let mut config = ServiceConfig::load(cli.config.as_deref())?;
    config.apply_env_overrides()?;
    cli.apply_to(&mut config);
    config.validate()?;

    tracing::info!("Service mode: {}", config.mode.as_str());

    let annotator = Annotator::new(&config.annotation);

    let pipeline: Arc<dyn ImagePipeline> = match config.mode {
        ServiceMode::Full => {
            println!("🧠 Loading detection and depth models...");
            let models = config.models.clone();
            let manager = tokio::task::spawn_blocking(move || VisionModelManager::load(&models))
                .await
                .context("Model loading task failed")??;
            for model in manager.list_models() {
                println!("   {} ({}): {}", model.name, model.model_type, model.path.display());
            }
            println!("✅ Models loaded");
            Arc::new(ModelPipeline::from_manager(&manager, annotator))
        }
        ServiceMode::Lightweight => {
            println!("🪶 Lightweight mode: detections are simulated, no models loaded");
            Arc::new(SimulatedPipeline::new(&config.lightweight, annotator))
        }
    };

    let state = AppState::new(pipeline, config).context("Failed to create HTTP client")?;

    println!("🌐 Listening on {}", state.config.server.listen_addr);

    start_server(state)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
