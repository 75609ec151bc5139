// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect;
pub mod errors;
pub mod fetch;
pub mod health;
pub mod http_server;
pub mod index;

pub use detect::{
    detect_handler, detect_url_handler, DetectResponse, DetectUrlRequest, DetectionRecord,
    HealthResponse,
};
pub use errors::{ApiError, ErrorResponse};
pub use fetch::{FetchError, ImageFetcher};
pub use http_server::{create_app, start_server, AppState};
