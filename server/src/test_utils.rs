//! Test Utilities Module
//!
//! Provides fixtures and a scripted overlay generator for unit tests.
//! This module is only compiled when running tests.

#![cfg(test)]

use crate::overlay::{GenerationResponse, OverlayError, OverlayGenerator, OverlayRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Fixtures
// ============================================================================

/// Well-formed overlay request
pub fn create_test_request() -> OverlayRequest {
    OverlayRequest::new(
        "data:image/jpeg;base64,/9j/4AAQSkZJRg==",
        vec![
            "https://cdn.example.com/products/linen-shirt-front.png".to_string(),
            "https://cdn.example.com/products/linen-shirt-back.png".to_string(),
        ],
        "Linen Shirt",
        "tops",
    )
}

// ============================================================================
// Scripted Generator
// ============================================================================

/// Overlay generator that replays scripted outcomes and counts calls
///
/// Outcomes are consumed in order; once the script runs out the last
/// outcome is repeated.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<GenerationResponse, OverlayError>>>,
    last: Mutex<Option<Result<GenerationResponse, OverlayError>>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Result<GenerationResponse, OverlayError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Generator that answers every call the same way
    pub fn always(outcome: Result<GenerationResponse, OverlayError>) -> Self {
        Self::new(vec![outcome])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OverlayGenerator for ScriptedGenerator {
    async fn generate(&self, _request: &OverlayRequest) -> Result<GenerationResponse, OverlayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(outcome) => {
                *last = Some(outcome.clone());
                outcome
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(OverlayError::Transport("script exhausted".to_string()))),
        }
    }
}
