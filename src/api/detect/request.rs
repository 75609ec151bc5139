// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Multipart form field carrying the uploaded image
pub const IMAGE_FIELD: &str = "image";

pub const NO_IMAGE_PROVIDED: &str = "No image provided";
pub const NO_IMAGE_SELECTED: &str = "No image selected";
pub const NO_IMAGE_URL_PROVIDED: &str = "No image URL provided";

/// Body of `POST /api/detect_url`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectUrlRequest {
    /// Remote image location (http or https)
    #[serde(default)]
    pub url: Option<String>,
}

impl DetectUrlRequest {
    /// Returns the URL when one was supplied
    pub fn validate(&self) -> Result<&str, ApiError> {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ApiError::InvalidRequest(NO_IMAGE_URL_PROVIDED.to_string())),
        }
    }
}
