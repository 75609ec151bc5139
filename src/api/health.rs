// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Health endpoint handler

use axum::{extract::State, Json};

use super::detect::HealthResponse;
use super::http_server::AppState;

/// GET /api/health - Always 200 while the process is serving
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        state.pipeline.health_message(),
        state.pipeline.health_note(),
    ))
}
