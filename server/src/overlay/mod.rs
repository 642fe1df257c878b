//! Overlay processing module
//!
//! Produces try-on overlays through the external generation service and
//! classifies every outcome into a displayable result.

pub mod classifier;
pub mod client;
pub mod fallback;
pub mod orchestrator;
pub mod routes;
pub mod service;
pub mod types;

pub use classifier::classify;
pub use client::HttpOverlayGenerator;
pub use fallback::{DEFAULT_AI_COMMENT, default_comment, identity_image};
pub use orchestrator::{OverlayOrchestrator, RetryPolicy};
pub use routes::{OverlayErrorResponse, overlay_routes};
pub use service::OverlayGenerator;
pub use types::{GenerationResponse, OverlayError, OverlayOutcome, OverlayRequest, OverlayResult};
