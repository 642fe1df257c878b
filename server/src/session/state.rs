use crate::overlay::OverlayResult;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Session ID: 10-character base32 string (lowercase, a-z + 2-7)
pub type SessionId = String;

/// Charset for session IDs: lowercase base32 (a-z, 2-7) to avoid 0/1 confusion
const SESSION_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz234567";
const SESSION_ID_LENGTH: usize = 10;

/// Generate a random session ID
pub fn generate_session_id() -> SessionId {
    let bits = Uuid::new_v4().as_u128();
    (0..SESSION_ID_LENGTH)
        .map(|i| {
            let idx = ((bits >> (i * 5)) & 0x1F) as usize;
            SESSION_ID_CHARSET[idx] as char
        })
        .collect()
}

/// Validation rules
pub fn validate_session_id(id: &str) -> bool {
    if id.len() != SESSION_ID_LENGTH {
        return false;
    }
    id.bytes().all(|c| SESSION_ID_CHARSET.contains(&c))
}

/// Get current timestamp in milliseconds
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// In-flight flag and last settled result for one UI surface
///
/// ```text
/// Idle(None) --begin--> Processing --settle(r)--> Idle(Some(r)) --reset--> Idle(None)
/// ```
///
/// The holder never rejects a transition; `begin` while processing is a
/// caller error and is guarded by `SessionManager`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingState {
    is_processing: bool,
    last_result: Option<OverlayResult>,
}

impl ProcessingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn last_result(&self) -> Option<&OverlayResult> {
        self.last_result.as_ref()
    }

    /// Mark an invocation as started and drop the previous result
    pub fn begin(&mut self) {
        self.is_processing = true;
        self.last_result = None;
    }

    /// Record the settled result of the invocation
    pub fn settle(&mut self, result: OverlayResult) {
        self.is_processing = false;
        self.last_result = Some(result);
    }

    /// Discard the shown result; `is_processing` is left alone
    pub fn reset(&mut self) {
        self.last_result = None;
    }
}

/// Server-side record for one kiosk UI surface
#[derive(Debug, Clone)]
pub struct KioskSession {
    pub id: SessionId,
    pub created_at: u64,
    pub last_active_at: u64,
    pub processing: ProcessingState,
}

impl KioskSession {
    pub fn new(id: SessionId) -> Self {
        let now = now_millis();
        Self {
            id,
            created_at: now,
            last_active_at: now,
            processing: ProcessingState::new(),
        }
    }

    pub fn touch(&mut self) {
        self.last_active_at = now_millis();
    }

    /// Idle sessions past the TTL may be dropped, unless a call is in flight
    pub fn is_expired(&self, now: u64, idle_ttl: Duration) -> bool {
        !self.processing.is_processing()
            && now.saturating_sub(self.last_active_at) > idle_ttl.as_millis() as u64
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            created_at: self.created_at,
            last_active_at: self.last_active_at,
            state: self.processing.clone(),
        }
    }
}

/// Read-only view of a session returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub created_at: u64,
    pub last_active_at: u64,
    pub state: ProcessingState,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sessions idle for longer than this are removed by cleanup
    pub idle_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(30 * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success() -> OverlayResult {
        OverlayResult::Success {
            processed_image_url: "https://cdn.example.com/out.png".to_string(),
            ai_comment: "Great fit!".to_string(),
        }
    }

    #[test]
    fn test_session_id_validation() {
        assert!(validate_session_id("abcd234567"));
        assert!(!validate_session_id("abcd23456")); // too short
        assert!(!validate_session_id("abcd2345670")); // too long
        assert!(!validate_session_id("ABCD234567")); // uppercase
        assert!(!validate_session_id("abcd234561")); // contains 1
        assert!(!validate_session_id("abcd234568")); // contains 8
    }

    #[test]
    fn test_generated_session_ids_are_valid() {
        for _ in 0..100 {
            assert!(validate_session_id(&generate_session_id()));
        }
    }

    #[test]
    fn test_new_state_is_idle() {
        let state = ProcessingState::new();
        assert!(!state.is_processing());
        assert!(state.last_result().is_none());
    }

    #[test]
    fn test_begin_then_settle() {
        let mut state = ProcessingState::new();
        state.begin();
        assert!(state.is_processing());
        assert!(state.last_result().is_none());

        state.settle(success());
        assert!(!state.is_processing());
        assert_eq!(state.last_result(), Some(&success()));
    }

    #[test]
    fn test_begin_clears_previous_result() {
        let mut state = ProcessingState::new();
        state.begin();
        state.settle(success());

        state.begin();
        assert!(state.is_processing());
        assert!(state.last_result().is_none());
    }

    #[test]
    fn test_reset_keeps_processing_flag() {
        let mut state = ProcessingState::new();
        state.begin();
        state.settle(success());
        state.reset();
        assert!(!state.is_processing());
        assert!(state.last_result().is_none());

        let mut in_flight = ProcessingState::new();
        in_flight.begin();
        in_flight.reset();
        assert!(in_flight.is_processing());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut once = ProcessingState::new();
        once.begin();
        once.settle(success());
        once.reset();

        let mut twice = once.clone();
        twice.reset();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_processing_state_serializes_camel_case() {
        let mut state = ProcessingState::new();
        state.settle(success());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["isProcessing"], false);
        assert_eq!(json["lastResult"]["status"], "success");
    }

    #[test]
    fn test_expiry_skips_processing_sessions() {
        let mut session = KioskSession::new(generate_session_id());
        let ttl = Duration::from_secs(60);
        let later = session.last_active_at + 61_000;
        assert!(session.is_expired(later, ttl));

        session.processing.begin();
        assert!(!session.is_expired(later, ttl));
    }
}
