//! Overlay orchestration: validate, call the generator, classify

use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::classifier::classify;
use super::service::OverlayGenerator;
use super::types::{GenerationResponse, OverlayError, OverlayRequest, OverlayResult};

/// Bounded retry for transport-level failures
///
/// The default makes a single attempt. Soft failures are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (always at least 1)
    pub max_attempts: u32,
    /// Delay before the first retry; doubled on each further retry
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Delay to wait before the given retry (1-based)
    fn delay_before(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.backoff.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

/// Single entry point for producing try-on overlays
///
/// Holds no per-caller state; concurrent invocations are independent.
#[derive(Clone)]
pub struct OverlayOrchestrator {
    generator: Arc<dyn OverlayGenerator>,
    retry: RetryPolicy,
}

impl OverlayOrchestrator {
    pub fn new(generator: Arc<dyn OverlayGenerator>) -> Self {
        Self {
            generator,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = RetryPolicy::new(retry.max_attempts, retry.backoff);
        self
    }

    /// Produce an overlay for the request.
    ///
    /// Returns `Err(OverlayError::InvalidArgument)` without calling the
    /// service when the request is malformed. Every other failure is folded
    /// into the returned `OverlayResult`.
    pub async fn generate_overlay(
        &self,
        request: OverlayRequest,
    ) -> Result<OverlayResult, OverlayError> {
        if let Err(e) = request.validate() {
            counter!("tryon_overlay_rejected_total").increment(1);
            debug!("Rejected overlay request: {}", e);
            return Err(e);
        }

        let start = Instant::now();
        let outcome = self.call_generator(&request).await;
        let result = classify(&request.person_image, outcome);

        histogram!("tryon_overlay_duration_seconds").record(start.elapsed());
        counter!("tryon_overlay_results_total", "outcome" => result.outcome().as_str())
            .increment(1);

        match &result {
            OverlayResult::Success { .. } => {
                debug!(
                    "Overlay generated for '{}' in {:?}",
                    request.product_name,
                    start.elapsed()
                );
            }
            OverlayResult::SoftFailure {
                fallback_reason, ..
            } => {
                info!(
                    "Using original photo for '{}': {}",
                    request.product_name, fallback_reason
                );
            }
            OverlayResult::HardFailure { error, .. } => {
                warn!(
                    "Overlay generation failed for '{}': {}",
                    request.product_name, error
                );
            }
        }

        Ok(result)
    }

    async fn call_generator(
        &self,
        request: &OverlayRequest,
    ) -> Result<GenerationResponse, OverlayError> {
        let mut attempt = 1;
        loop {
            counter!("tryon_overlay_upstream_calls_total").increment(1);
            match self.generator.generate(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_before(attempt);
                    warn!(
                        "Overlay attempt {}/{} failed: {} (retrying in {:?})",
                        attempt, self.retry.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
