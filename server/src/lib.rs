//! Try-On Server Library
//!
//! This module exports the server components for use in integration tests
//! and external tooling.

pub mod config;
pub mod overlay;
pub mod server;
pub mod session;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use overlay::{
    HttpOverlayGenerator, OverlayGenerator, OverlayOrchestrator, OverlayRequest, OverlayResult,
    overlay_routes,
};
pub use server::AppState;
pub use session::{ProcessingState, SessionManager, session_routes};
