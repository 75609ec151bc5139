// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::detect::{detect_handler, detect_url_handler};
use super::fetch::ImageFetcher;
use super::health::health_handler;
use super::index::index_handler;
use crate::config::ServiceConfig;
use crate::pipeline::ImagePipeline;

/// Room for multipart boundaries and headers on top of the image itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<dyn ImagePipeline>,
    pub fetcher: ImageFetcher,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(
        pipeline: Arc<dyn ImagePipeline>,
        config: ServiceConfig,
    ) -> Result<Self, super::fetch::FetchError> {
        let fetcher = ImageFetcher::new(
            std::time::Duration::from_secs(config.server.download_timeout_secs),
            config.server.max_upload_bytes,
        )?;

        Ok(Self {
            pipeline,
            fetcher,
            config: Arc::new(config),
        })
    }
}

/// Build the router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let body_limit = state
        .config
        .server
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        // Landing page
        .route("/", get(index_handler))
        // Health check
        .route("/api/health", get(health_handler))
        // Detection endpoints
        .route("/api/detect", post(detect_handler))
        .route("/api/detect_url", post(detect_url_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

pub async fn start_server(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let addr = state.config.server.listen_addr.parse::<SocketAddr>()?;
    let mode = state.pipeline.mode();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server ({} mode) listening on {}", mode.as_str(), addr);

    axum::serve(listener, app).await?;

    Ok(())
}
