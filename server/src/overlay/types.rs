//! Overlay-related types and error definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur on the overlay path
///
/// Only `InvalidArgument` ever crosses the orchestrator boundary; the other
/// variants are folded into a `HardFailure` result.
#[derive(Debug, Clone, Error)]
pub enum OverlayError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Overlay service timed out after {0:?}")]
    Timeout(Duration),

    #[error("Overlay service returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Malformed overlay service response: {0}")]
    MalformedResponse(String),
}

/// Request for a composited try-on image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRequest {
    /// Customer photo (base64 data URL or plain URL)
    pub person_image: String,
    /// Product images, in display order
    pub product_images: Vec<String>,
    pub product_name: String,
    pub product_category: String,
}

impl OverlayRequest {
    pub fn new(
        person_image: impl Into<String>,
        product_images: Vec<String>,
        product_name: impl Into<String>,
        product_category: impl Into<String>,
    ) -> Self {
        Self {
            person_image: person_image.into(),
            product_images,
            product_name: product_name.into(),
            product_category: product_category.into(),
        }
    }

    /// Check the preconditions that must hold before the service is called
    pub fn validate(&self) -> Result<(), OverlayError> {
        if self.person_image.trim().is_empty() {
            return Err(OverlayError::InvalidArgument(
                "personImage must not be empty".to_string(),
            ));
        }
        if self.product_images.is_empty() {
            return Err(OverlayError::InvalidArgument(
                "productImages must contain at least one image".to_string(),
            ));
        }
        if let Some(idx) = self
            .product_images
            .iter()
            .position(|img| img.trim().is_empty())
        {
            return Err(OverlayError::InvalidArgument(format!(
                "productImages[{}] must not be empty",
                idx
            )));
        }
        Ok(())
    }
}

/// Response body of the overlay generation service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

/// Settled outcome of one overlay invocation
///
/// Every variant carries a displayable image and a non-empty comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OverlayResult {
    /// The service produced a composited image
    Success {
        processed_image_url: String,
        ai_comment: String,
    },
    /// The service answered but produced no usable image
    SoftFailure {
        processed_image_url: String,
        ai_comment: String,
        fallback_reason: String,
        /// Whether the service itself flagged the response as a fallback
        service_fallback: bool,
    },
    /// The call to the service failed
    HardFailure {
        processed_image_url: String,
        ai_comment: String,
        error: String,
    },
}

/// Coarse outcome label, used for metrics and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayOutcome {
    Success,
    SoftFailure,
    HardFailure,
}

impl OverlayOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayOutcome::Success => "success",
            OverlayOutcome::SoftFailure => "soft_failure",
            OverlayOutcome::HardFailure => "hard_failure",
        }
    }
}

impl OverlayResult {
    pub fn processed_image_url(&self) -> &str {
        match self {
            OverlayResult::Success {
                processed_image_url,
                ..
            }
            | OverlayResult::SoftFailure {
                processed_image_url,
                ..
            }
            | OverlayResult::HardFailure {
                processed_image_url,
                ..
            } => processed_image_url,
        }
    }

    pub fn ai_comment(&self) -> &str {
        match self {
            OverlayResult::Success { ai_comment, .. }
            | OverlayResult::SoftFailure { ai_comment, .. }
            | OverlayResult::HardFailure { ai_comment, .. } => ai_comment,
        }
    }

    pub fn outcome(&self) -> OverlayOutcome {
        match self {
            OverlayResult::Success { .. } => OverlayOutcome::Success,
            OverlayResult::SoftFailure { .. } => OverlayOutcome::SoftFailure,
            OverlayResult::HardFailure { .. } => OverlayOutcome::HardFailure,
        }
    }

    /// True when the caller is shown the original photo instead of a composite
    pub fn is_fallback(&self) -> bool {
        !matches!(self, OverlayResult::Success { .. })
    }
}
