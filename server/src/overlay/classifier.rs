//! Maps a raw overlay service outcome to an `OverlayResult`

use super::fallback::{default_comment, identity_image};
use super::types::{GenerationResponse, OverlayError, OverlayResult};

const REASON_SERVICE_FALLBACK: &str = "overlay service requested fallback";
const REASON_NO_IMAGE: &str = "overlay service did not produce an image";

/// Classify the outcome of one call to the overlay service.
///
/// Pure: no I/O, no retries. Blank strings from the service count as absent.
pub fn classify(
    person_image: &str,
    outcome: Result<GenerationResponse, OverlayError>,
) -> OverlayResult {
    match outcome {
        Err(e) => OverlayResult::HardFailure {
            processed_image_url: identity_image(person_image),
            ai_comment: default_comment().to_string(),
            error: e.to_string(),
        },
        Ok(response) if response.success => OverlayResult::Success {
            processed_image_url: non_blank(response.processed_image_url)
                .unwrap_or_else(|| identity_image(person_image)),
            ai_comment: non_blank(response.ai_comment)
                .unwrap_or_else(|| default_comment().to_string()),
        },
        Ok(response) => {
            let service_fallback = response.fallback.unwrap_or(false);
            let fallback_reason = if service_fallback {
                REASON_SERVICE_FALLBACK
            } else {
                REASON_NO_IMAGE
            };
            OverlayResult::SoftFailure {
                processed_image_url: identity_image(person_image),
                ai_comment: default_comment().to_string(),
                fallback_reason: fallback_reason.to_string(),
                service_fallback,
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
