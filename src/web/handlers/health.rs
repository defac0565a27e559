//! # Health Check Handler

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::web::state::AppState;

/// Basic health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub environment: String,
}

/// Basic health check endpoint: GET /health
///
/// Returns OK whenever the process is serving requests. No authentication.
pub async fn basic_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.environment.to_string(),
    })
}
