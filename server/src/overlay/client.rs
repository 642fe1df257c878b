//! HTTP client for the overlay generation service

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::OverlayServiceConfig;

use super::service::OverlayGenerator;
use super::types::{GenerationResponse, OverlayError, OverlayRequest};

/// Longest upstream error body kept in an `UpstreamStatus` error
const MAX_ERROR_BODY_LEN: usize = 512;

/// Calls the overlay generation service over HTTP with a JSON body
pub struct HttpOverlayGenerator {
    http_client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpOverlayGenerator {
    /// Create a new client from the service configuration
    pub fn new(config: &OverlayServiceConfig) -> Result<Self, OverlayError> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| OverlayError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: config.url.clone(),
            api_key: config.api_key.clone(),
            timeout: config.request_timeout,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> OverlayError {
        if e.is_timeout() {
            OverlayError::Timeout(self.timeout)
        } else {
            OverlayError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl OverlayGenerator for HttpOverlayGenerator {
    async fn generate(&self, request: &OverlayRequest) -> Result<GenerationResponse, OverlayError> {
        debug!(
            "Requesting overlay for '{}' ({} product images) from {}",
            request.product_name,
            request.product_images.len(),
            self.endpoint
        );

        let mut builder = self.http_client.post(&self.endpoint).json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY_LEN {
                let mut cut = MAX_ERROR_BODY_LEN;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(OverlayError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        serde_json::from_slice::<GenerationResponse>(&bytes)
            .map_err(|e| OverlayError::MalformedResponse(e.to_string()))
    }
}
