// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Remote image download for `/api/detect_url`

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Image download error types
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed or uses an unsupported scheme
    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    /// Remote server answered with anything but 200
    #[error("Failed to download image, status code: {0}")]
    Status(u16),

    /// Connection, timeout or body read failure
    #[error("Failed to download image: {0}")]
    Request(String),

    #[error("Failed to download image: response exceeds {0} bytes")]
    TooLarge(usize),
}

/// Downloads images over HTTP(S)
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
    max_bytes: usize,
}

impl ImageFetcher {
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("object-depth-api/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self { client, max_bytes })
    }

    /// Check that `raw` is an absolute http(s) URL
    pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
        let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(FetchError::InvalidUrl(format!(
                "unsupported scheme '{}', expected http or https",
                other
            ))),
        }
    }

    /// Download the body at `raw_url`
    pub async fn fetch(&self, raw_url: &str) -> Result<Vec<u8>, FetchError> {
        let url = Self::parse_url(raw_url)?;

        debug!("Downloading image from: {}", url);

        let mut response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Request(format!("timed out fetching {}", url))
            } else {
                FetchError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(length) = response.content_length() {
            if length as usize > self.max_bytes {
                return Err(FetchError::TooLarge(self.max_bytes));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge(self.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        info!("Downloaded {} bytes from: {}", body.len(), url);

        Ok(body)
    }
}
