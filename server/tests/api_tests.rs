//! Integration tests for the potato blight HTTP API
//!
//! Tests cover:
//! - Health and config endpoints
//! - Multipart prediction: diagnosis, green rejection, low-confidence rejection
//! - Upload errors (missing field, undecodable bytes, oversized body)
//! - Classifier faults surfacing as 500

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method

use potato_blight::preprocess::CropBatch;
use potato_blight::{BlightError, Classifier, LeafPipeline, PipelineConfig, ProbabilityVector};
use potato_blight_server::{build_router, AppState, ServerConfig};

const BOUNDARY: &str = "leafboundary7MA4YWxkTrZu0gW";

/// Returns the same probabilities for every crop
struct FixedClassifier {
    probs: [f32; 3],
    calls: Arc<AtomicUsize>,
}

impl Classifier for FixedClassifier {
    fn predict(&self, batch: &CropBatch) -> potato_blight::Result<Vec<ProbabilityVector>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (0..batch.len())
            .map(|_| ProbabilityVector::new(self.probs))
            .collect()
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn predict(&self, _batch: &CropBatch) -> potato_blight::Result<Vec<ProbabilityVector>> {
        Err(BlightError::Classifier("device lost".to_string()))
    }
}

/// Test helper: Small crops keep the tests fast
fn test_pipeline_config() -> PipelineConfig {
    PipelineConfig {
        target_size: 32,
        ..Default::default()
    }
}

/// Test helper: App with a fixed-output classifier
fn setup_app(probs: [f32; 3]) -> (axum::Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let classifier = FixedClassifier {
        probs,
        calls: Arc::clone(&calls),
    };
    let pipeline = LeafPipeline::new(test_pipeline_config(), Box::new(classifier)).unwrap();
    let state = AppState::new(ServerConfig::default(), pipeline);
    (build_router(state), calls)
}

/// Test helper: App around an arbitrary classifier and server config
fn setup_app_with(classifier: Box<dyn Classifier>, config: ServerConfig) -> axum::Router {
    let pipeline = LeafPipeline::new(test_pipeline_config(), classifier).unwrap();
    build_router(AppState::new(config, pipeline))
}

/// Test helper: PNG bytes of a solid image
fn png_bytes(color: [u8; 3], width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn green_leaf_png() -> Vec<u8> {
    png_bytes([40, 170, 50], 64, 64)
}

fn brown_soil_png() -> Vec<u8> {
    png_bytes([120, 80, 40], 64, 64)
}

/// Test helper: multipart/form-data request with one file field
fn multipart_request(field: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"leaf.png\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health and config
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = setup_app([0.1, 0.3, 0.6]);

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["classifier"], "fixed");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_number());
}

#[tokio::test]
async fn test_config_endpoint() {
    let (app, _) = setup_app([0.1, 0.3, 0.6]);

    let response = app.oneshot(test_request("GET", "/config")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["target_size"], 32);
    assert_eq!(body["zoom_factors"].as_array().unwrap().len(), 4);
    assert!((body["not_leaf_threshold"].as_f64().unwrap() - 0.42).abs() < 1e-6);
    assert!((body["min_green_ratio"].as_f64().unwrap() - 0.12).abs() < 1e-9);
}

// =============================================================================
// Prediction
// =============================================================================

#[tokio::test]
async fn test_predict_diagnoses_green_leaf() {
    let (app, calls) = setup_app([0.1, 0.3, 0.6]);

    let response = app
        .oneshot(multipart_request("image", &green_leaf_png()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["final_prediction"], "potato_late_blight");
    assert_eq!(body["readable_prediction"], "Late Blight");
    assert!((body["confidence"].as_f64().unwrap() - 0.6).abs() < 1e-5);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_predict_weak_healthy_is_demoted() {
    let (app, _) = setup_app([0.2, 0.7, 0.1]);

    let response = app
        .oneshot(multipart_request("image", &green_leaf_png()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["final_prediction"], "potato_early_blight");
    // Confidence still reports the healthy probability
    assert!((body["confidence"].as_f64().unwrap() - 0.7).abs() < 1e-5);
}

#[tokio::test]
async fn test_predict_rejects_low_green_without_classifier() {
    let (app, calls) = setup_app([0.1, 0.3, 0.6]);

    let response = app
        .oneshot(multipart_request("image", &brown_soil_png()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["prediction"], "not_leaf");
    assert_eq!(
        body["message"],
        "Image has too little green content. Possibly NOT a potato leaf."
    );
    assert_eq!(body["green_ratio"].as_f64().unwrap(), 0.0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_predict_rejects_low_confidence() {
    let (app, _) = setup_app([0.35, 0.33, 0.32]);

    let response = app
        .oneshot(multipart_request("image", &green_leaf_png()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["prediction"], "not_leaf");
    assert_eq!(body["message"], "Model not confident this is a potato leaf.");
    assert!((body["confidence"].as_f64().unwrap() - 0.35).abs() < 1e-5);
}

// =============================================================================
// Upload errors
// =============================================================================

#[tokio::test]
async fn test_predict_missing_image_field() {
    let (app, calls) = setup_app([0.1, 0.3, 0.6]);

    let response = app
        .oneshot(multipart_request("photo", &green_leaf_png()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "No image uploaded.");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_predict_without_multipart_body() {
    let (app, _) = setup_app([0.1, 0.3, 0.6]);

    let response = app.oneshot(test_request("POST", "/predict")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "No image uploaded.");
}

#[tokio::test]
async fn test_predict_empty_file_field() {
    let (app, _) = setup_app([0.1, 0.3, 0.6]);

    let response = app.oneshot(multipart_request("image", b"")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "No image uploaded.");
}

#[tokio::test]
async fn test_predict_undecodable_bytes() {
    let (app, calls) = setup_app([0.1, 0.3, 0.6]);

    let response = app
        .oneshot(multipart_request("image", b"definitely not an image"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_predict_oversized_upload() {
    let (_, calls) = setup_app([0.1, 0.3, 0.6]);
    let classifier = FixedClassifier {
        probs: [0.1, 0.3, 0.6],
        calls: Arc::clone(&calls),
    };
    let config = ServerConfig {
        max_upload_bytes: 1024,
        ..ServerConfig::default()
    };
    let app = setup_app_with(Box::new(classifier), config);

    let response = app
        .oneshot(multipart_request("image", &vec![0u8; 8 * 1024]))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Classifier faults
// =============================================================================

#[tokio::test]
async fn test_predict_classifier_fault_is_server_error() {
    let app = setup_app_with(Box::new(FailingClassifier), ServerConfig::default());

    let response = app
        .oneshot(multipart_request("image", &green_leaf_png()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("device lost"));
}

#[tokio::test]
async fn test_concurrent_predictions() {
    let (app, calls) = setup_app([0.1, 0.3, 0.6]);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.oneshot(multipart_request("image", &green_leaf_png()))
                .await
                .unwrap()
                .status()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 8);
}
