pub mod manager;
pub mod routes;
pub mod state;

pub use manager::{SessionError, SessionManager};
pub use routes::session_routes;
pub use state::{KioskSession, ProcessingState, SessionConfig, SessionId, SessionSnapshot};
