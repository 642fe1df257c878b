//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode},
    routing::get,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tower::util::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use tryon_server::overlay::{GenerationResponse, OverlayError};
use tryon_server::{
    AppState, OverlayGenerator, OverlayOrchestrator, OverlayRequest, overlay_routes,
    session_routes,
};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create a test application router backed by the given generator
pub fn create_test_app_with_generator(generator: Arc<dyn OverlayGenerator>) -> (Router, AppState) {
    let app_state = AppState::new(OverlayOrchestrator::new(generator));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", overlay_routes().merge(session_routes()))
        .layer(cors)
        .with_state(app_state.clone());

    (app, app_state)
}

/// Well-formed overlay request
pub fn create_test_request() -> OverlayRequest {
    OverlayRequest::new(
        "data:image/jpeg;base64,/9j/4AAQSkZJRg==",
        vec!["https://cdn.example.com/products/wool-coat.png".to_string()],
        "Wool Coat",
        "outerwear",
    )
}

pub fn success_response() -> GenerationResponse {
    GenerationResponse {
        success: true,
        processed_image_url: Some("https://cdn.example.com/generated/coat-tryon.png".to_string()),
        ai_comment: Some("That coat was made for you!".to_string()),
        fallback: None,
    }
}

/// Mock overlay generator returning a fixed outcome and counting calls
pub struct MockGenerator {
    outcome: Result<GenerationResponse, OverlayError>,
    calls: AtomicUsize,
    /// When set, each call waits for a permit before answering
    gate: Option<Arc<Semaphore>>,
}

impl MockGenerator {
    pub fn new(outcome: Result<GenerationResponse, OverlayError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn gated(outcome: Result<GenerationResponse, OverlayError>, gate: Arc<Semaphore>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            gate: Some(gate),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OverlayGenerator for MockGenerator {
    async fn generate(&self, _request: &OverlayRequest) -> Result<GenerationResponse, OverlayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref gate) = self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.outcome.clone()
    }
}

/// Generator whose call panics, standing in for a bug in the service client
pub struct PanickingGenerator;

#[async_trait]
impl OverlayGenerator for PanickingGenerator {
    async fn generate(&self, _request: &OverlayRequest) -> Result<GenerationResponse, OverlayError> {
        panic!("overlay generator blew up");
    }
}

/// Send a request through the router and parse the JSON body
pub async fn send_json<T: DeserializeOwned>(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, Option<T>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).expect("Failed to serialize body")))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request");
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    (status, serde_json::from_slice(&bytes).ok())
}
