use crate::overlay::OverlayResult;
use crate::session::state::{
    KioskSession, SessionConfig, SessionId, SessionSnapshot, generate_session_id, now_millis,
};
use metrics::counter;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Session manager errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid session id: {0}")]
    InvalidId(String),

    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Session {0} already has an overlay in progress")]
    AlreadyProcessing(SessionId),
}

/// Session manager: owns the processing state of every kiosk surface
///
/// The lock is only held for the state transitions, never across the
/// outbound overlay call.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<SessionId, KioskSession>>>,
    config: Arc<SessionConfig>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    /// Create a new session for a UI surface
    pub async fn create_session(&self) -> SessionSnapshot {
        counter!("tryon_sessions_created_total").increment(1);

        let mut sessions = self.sessions.write().await;
        let mut id = generate_session_id();
        while sessions.contains_key(&id) {
            id = generate_session_id();
        }

        let session = KioskSession::new(id.clone());
        let snapshot = session.snapshot();
        sessions.insert(id.clone(), session);

        info!("Created kiosk session {}", id);
        snapshot
    }

    /// Get session snapshot
    pub async fn get_session(&self, session_id: &str) -> Result<SessionSnapshot, SessionError> {
        let sessions = self.sessions.read().await;

        let session = sessions
            .get(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        Ok(session.snapshot())
    }

    /// Start an overlay invocation for the session
    ///
    /// Rejects a second `begin` while the previous invocation is unsettled.
    pub async fn begin(&self, session_id: &str) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;

        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        if session.processing.is_processing() {
            warn!("Overlay already in progress for session {}", session_id);
            return Err(SessionError::AlreadyProcessing(session_id.to_string()));
        }

        session.processing.begin();
        session.touch();
        debug!("Session {} began overlay processing", session_id);
        Ok(())
    }

    /// Record the settled result for the session
    pub async fn settle(
        &self,
        session_id: &str,
        result: OverlayResult,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut sessions = self.sessions.write().await;

        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        debug!(
            "Session {} settled with {}",
            session_id,
            result.outcome().as_str()
        );
        session.processing.settle(result);
        session.touch();
        Ok(session.snapshot())
    }

    /// Discard the last result shown on the surface
    pub async fn reset(&self, session_id: &str) -> Result<SessionSnapshot, SessionError> {
        let mut sessions = self.sessions.write().await;

        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        session.processing.reset();
        session.touch();
        Ok(session.snapshot())
    }

    /// Remove a session when its surface goes away
    pub async fn remove_session(&self, session_id: &str) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;

        sessions
            .remove(session_id)
            .map(|_| info!("Removed kiosk session {}", session_id))
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    /// Clean up idle sessions
    pub async fn cleanup_expired(&self) {
        let now = now_millis();
        let mut sessions = self.sessions.write().await;

        let expired: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, session)| session.is_expired(now, self.config.idle_ttl))
            .map(|(id, _)| id.clone())
            .collect();

        for id in expired {
            info!("Removing idle session: {}", id);
            sessions.remove(&id);
            counter!("tryon_sessions_expired_total").increment(1);
        }
    }

    /// Get count of active sessions
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    /// Get count of sessions with an invocation in flight
    pub async fn processing_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .filter(|s| s.processing.is_processing())
            .count()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
