//! OverlayGenerator trait definition

use async_trait::async_trait;

use super::types::{GenerationResponse, OverlayError, OverlayRequest};

/// Trait for the external image-overlay generation service
#[async_trait]
pub trait OverlayGenerator: Send + Sync {
    /// Make one call to the service.
    ///
    /// Returns `Ok` whenever the service answered with a decodable body,
    /// including answers with `success: false`.
    async fn generate(&self, request: &OverlayRequest) -> Result<GenerationResponse, OverlayError>;
}
