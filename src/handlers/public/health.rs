// handlers/public/health.rs - GET /health

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::AppState;
use crate::middleware::ApiResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub ok: bool,
    pub db: bool,
}

/// GET /health - Liveness plus a store ping; 503 while the store is unreachable
pub async fn get(State(state): State<AppState>) -> ApiResponse<Health> {
    match state.db.health_check().await {
        Ok(()) => ApiResponse::success(Health { ok: true, db: true }),
        Err(e) => {
            warn!("Health check failed: {}", e);
            ApiResponse::with_status(Health { ok: false, db: false }, StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
