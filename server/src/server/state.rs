use crate::overlay::OverlayOrchestrator;
use crate::session::manager::SessionManager;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<OverlayOrchestrator>,
    pub session_manager: Arc<SessionManager>,
}

impl AppState {
    pub fn new(orchestrator: OverlayOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            session_manager: Arc::new(SessionManager::new()),
        }
    }

    pub fn with_session_manager(mut self, session_manager: Arc<SessionManager>) -> Self {
        self.session_manager = session_manager;
        self
    }

    /// (active sessions, sessions with an overlay in flight)
    pub async fn get_stats(&self) -> (usize, usize) {
        (
            self.session_manager.session_count().await,
            self.session_manager.processing_count().await,
        )
    }
}
