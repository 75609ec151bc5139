// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect endpoint handlers

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use axum_extra::extract::multipart::MultipartRejection;
use axum_extra::extract::Multipart;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::request::{
    DetectUrlRequest, IMAGE_FIELD, NO_IMAGE_PROVIDED, NO_IMAGE_SELECTED, NO_IMAGE_URL_PROVIDED,
};
use super::response::DetectResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::{decode_image_bytes_with_limit, encode_jpeg_base64};

/// POST /api/detect - Detect objects in an uploaded image
///
/// # Request
/// `multipart/form-data` with a file field named `image`.
///
/// # Response
/// - `success`: always `true`
/// - `detections`: `[{class, confidence, bbox: [x1, y1, x2, y2]}]`
/// - `processed_image`: annotated frame as base64 JPEG
/// - `note`: present on the lightweight service
///
/// # Errors
/// - 400 Bad Request: no `image` file, empty filename, undecodable image
/// - 500 Internal Server Error: processing failed
pub async fn detect_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Detect request is not multipart: {}", e);
        ApiError::InvalidRequest(NO_IMAGE_PROVIDED.to_string())
    })?;

    let bytes = read_image_field(&mut multipart).await?;
    debug!("Received upload of {} bytes", bytes.len());

    process_image(&state, bytes).await
}

/// POST /api/detect_url - Detect objects in an image fetched from a URL
///
/// # Request
/// JSON `{"url": "https://..."}`
///
/// # Errors
/// - 400 Bad Request: missing URL, invalid URL, download failed or returned
///   a non-200 status, undecodable image
/// - 500 Internal Server Error: processing failed
pub async fn detect_url_handler(
    State(state): State<AppState>,
    payload: Result<Json<DetectUrlRequest>, JsonRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected detect_url body: {}", e.body_text());
        ApiError::InvalidRequest(NO_IMAGE_URL_PROVIDED.to_string())
    })?;

    let url = request.validate()?;

    let bytes = state.fetcher.fetch(url).await.map_err(|e| {
        warn!("Image download failed: {}", e);
        ApiError::from(e)
    })?;

    process_image(&state, bytes).await
}

/// Pull the bytes of the first `image` file field
async fn read_image_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            warn!("Malformed multipart body: {}", e.body_text());
            ApiError::InvalidRequest(NO_IMAGE_PROVIDED.to_string())
        })?;

        let Some(field) = field else {
            return Err(ApiError::InvalidRequest(NO_IMAGE_PROVIDED.to_string()));
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        // Plain form values are not files
        let Some(file_name) = field.file_name() else {
            continue;
        };

        if file_name.is_empty() {
            return Err(ApiError::InvalidRequest(NO_IMAGE_SELECTED.to_string()));
        }

        let bytes = field.bytes().await.map_err(|e| {
            warn!("Failed to read uploaded image: {}", e.body_text());
            ApiError::InvalidRequest(format!("Failed to read uploaded image: {}", e.body_text()))
        })?;

        return Ok(bytes.to_vec());
    }
}

/// Decode, run the pipeline, encode the result
async fn process_image(state: &AppState, bytes: Vec<u8>) -> Result<Json<DetectResponse>, ApiError> {
    let start = Instant::now();

    let max_bytes = state.config.server.max_upload_bytes;
    let (image, info) =
        tokio::task::spawn_blocking(move || decode_image_bytes_with_limit(&bytes, max_bytes))
            .await
            .map_err(|e| ApiError::InternalError(format!("Image decoding task failed: {}", e)))?
            .map_err(|e| {
                warn!("Failed to decode image: {}", e);
                ApiError::invalid_image(&e)
            })?;

    debug!(
        "Decoded image: {}x{} {:?}, {} bytes",
        info.width, info.height, info.format, info.size_bytes
    );

    // Only requests carrying a usable image pay the simulated processing time
    let latency = state.pipeline.simulated_latency();
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }

    let pipeline = state.pipeline.clone();
    let quality = state.config.annotation.jpeg_quality;

    let (detections, encoded) = tokio::task::spawn_blocking(move || {
        let output = pipeline.process(&image).map_err(|e| {
            warn!("Pipeline failed: {}", e);
            ApiError::from(e)
        })?;

        let encoded = encode_jpeg_base64(&output.image, quality)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        Ok::<_, ApiError>((output.detections, encoded))
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Image processing task failed: {}", e)))??;

    info!(
        "Detection complete ({}): {} objects, {}ms",
        state.pipeline.mode().as_str(),
        detections.len(),
        start.elapsed().as_millis()
    );

    Ok(Json(DetectResponse::new(
        &detections,
        encoded,
        state.pipeline.note(),
    )))
}
