//! Shared application state threaded through all handlers.

use std::sync::Arc;
use std::time::Instant;

use huddle_core::config::AppConfig;
use huddle_signaling::coordinator::Coordinator;
use huddle_signaling::gate::ConnectionGate;

/// State available to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Merged application configuration.
    pub config: Arc<AppConfig>,
    /// The presence and call-signaling coordinator.
    pub coordinator: Arc<Coordinator>,
    /// Connection authentication gate.
    pub gate: ConnectionGate,
    /// Process start time, for the uptime report.
    pub started_at: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish()
    }
}
