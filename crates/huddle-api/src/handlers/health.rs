//! Health check handlers.

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Liveness response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process answers.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since process start.
    pub uptime_seconds: u64,
    /// Current server time.
    pub timestamp: DateTime<Utc>,
}

/// Detailed health response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Always `"ok"` when the process answers.
    pub status: String,
    /// Live connections, available or not.
    pub connections: usize,
    /// Users in the presence directory.
    pub present_users: usize,
    /// Accepted calls currently running.
    pub active_calls: usize,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}

/// GET /api/health/detailed
pub async fn health_detailed(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let stats = state.coordinator.stats().await;

    Json(DetailedHealthResponse {
        status: "ok".to_string(),
        connections: stats.connections,
        present_users: stats.present_users,
        active_calls: stats.active_calls,
    })
}
