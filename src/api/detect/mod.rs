// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect API endpoint module
//!
//! Provides POST /api/detect (multipart upload) and POST /api/detect_url
//! (remote image).

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{detect_handler, detect_url_handler};
pub use request::DetectUrlRequest;
pub use response::{DetectResponse, DetectionRecord, HealthResponse};
