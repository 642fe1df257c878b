//! Shared application state for the HTTP surface

mod state;

pub use state::AppState;
