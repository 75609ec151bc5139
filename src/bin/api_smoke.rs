// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Smoke test client for a running API instance
//!
//! Exercises `/api/health`, `/api/detect` and `/api/detect_url`, prints the
//! detections and saves the returned processed images.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Parser;
use object_depth_api::api::{DetectResponse, HealthResponse};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::{Path, PathBuf};

/// Test the Object Detection API
#[derive(Parser, Debug)]
#[command(name = "api-smoke")]
#[command(about = "Smoke-test a running Object Detection API", long_about = None)]
struct Args {
    /// Base URL of the API
    #[arg(long, default_value = "http://localhost:5000")]
    url: String,

    /// Path to a test image
    #[arg(long, default_value = "test.jpg")]
    image: PathBuf,

    /// URL of a test image
    #[arg(long, default_value = "https://ultralytics.com/images/zidane.jpg")]
    image_url: String,

    /// Directory the processed images are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

const SEPARATOR: &str = "--------------------------------------------------";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = Client::new();
    let base = args.url.trim_end_matches('/');

    println!("Testing API at {}", base);
    println!("{}", SEPARATOR);

    let health_ok = report(check_health(&client, base).await);
    let detect_ok = report(
        check_detect(&client, base, &args.image, &args.output_dir.join("api_result.jpg")).await,
    );
    let detect_url_ok = report(
        check_detect_url(
            &client,
            base,
            &args.image_url,
            &args.output_dir.join("api_result_url.jpg"),
        )
        .await,
    );

    println!("Test Summary:");
    println!("Health Endpoint: {}", verdict(health_ok));
    println!("Detect Endpoint: {}", verdict(detect_ok));
    println!("Detect URL Endpoint: {}", verdict(detect_url_ok));

    if health_ok && detect_ok && detect_url_ok {
        println!("\n🎉 All tests passed! The API is working correctly.");
        Ok(())
    } else {
        eprintln!("\n⚠️ Some tests failed. Please check the API configuration.");
        std::process::exit(1);
    }
}

fn report(result: Result<bool>) -> bool {
    let ok = match result {
        Ok(ok) => ok,
        Err(e) => {
            println!("❌ Error: {:#}", e);
            false
        }
    };
    println!("{}", SEPARATOR);
    ok
}

fn verdict(ok: bool) -> &'static str {
    if ok {
        "✅ Passed"
    } else {
        "❌ Failed"
    }
}

async fn check_health(client: &Client, base: &str) -> Result<bool> {
    let response = client
        .get(format!("{}/api/health", base))
        .send()
        .await
        .context("Health request failed")?;

    let status = response.status();
    println!("Health Check Status: {}", status.as_u16());

    let body: HealthResponse = response.json().await.context("Invalid health response")?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(status.is_success())
}

async fn check_detect(client: &Client, base: &str, image: &Path, output: &Path) -> Result<bool> {
    let data = std::fs::read(image)
        .with_context(|| format!("Image file not found at {}", image.display()))?;
    let file_name = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.jpg".to_string());

    let form = Form::new().part(
        "image",
        Part::bytes(data)
            .file_name(file_name)
            .mime_str("image/jpeg")?,
    );

    let response = client
        .post(format!("{}/api/detect", base))
        .multipart(form)
        .send()
        .await
        .context("Detect request failed")?;

    println!("Detect Endpoint Status: {}", response.status().as_u16());
    handle_detect_response(response, output).await
}

async fn check_detect_url(
    client: &Client,
    base: &str,
    image_url: &str,
    output: &Path,
) -> Result<bool> {
    let response = client
        .post(format!("{}/api/detect_url", base))
        .json(&serde_json::json!({ "url": image_url }))
        .send()
        .await
        .context("Detect URL request failed")?;

    println!("Detect URL Endpoint Status: {}", response.status().as_u16());
    handle_detect_response(response, output).await
}

async fn handle_detect_response(response: reqwest::Response, output: &Path) -> Result<bool> {
    if !response.status().is_success() {
        println!("Error: {}", response.text().await.unwrap_or_default());
        return Ok(false);
    }

    let result: DetectResponse = response.json().await.context("Invalid detect response")?;

    println!("Detected {} objects:", result.detections.len());
    for detection in &result.detections {
        println!(
            "  - {} (confidence: {:.2}) bbox {:?}",
            detection.class_name, detection.confidence, detection.bbox
        );
    }
    if let Some(note) = &result.note {
        println!("Note: {}", note);
    }

    let jpeg = STANDARD
        .decode(&result.processed_image)
        .context("processed_image is not valid base64")?;
    let decoded = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg)
        .context("processed_image is not a JPEG")?;

    std::fs::write(output, &jpeg)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Saved processed image ({}x{}) to {}",
        decoded.width(),
        decoded.height(),
        output.display()
    );

    Ok(true)
}
