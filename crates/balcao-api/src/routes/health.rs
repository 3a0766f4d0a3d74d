use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Reports whether a pooled database connection answers `SELECT 1`
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut services = HashMap::new();

    let status = match state.db.ping().await {
        Ok(()) => {
            services.insert("mssql".to_string(), "connected".to_string());
            "healthy"
        }
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            services.insert("mssql".to_string(), "disconnected".to_string());
            "degraded"
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}
