//! Health Check API Handlers

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, response::Json};
use common::{AppError, ComponentHealth, HealthStatus, ServiceStatus, SuccessResponse};

use crate::app_state::AppState;
use crate::config::SERVICE_NAME;

/// Health check endpoint
///
/// Reports `unhealthy` when the database does not answer a ping. The HTTP
/// status stays 200 so the body is always readable.
///
/// @route GET /health
/// @output Json<SuccessResponse<HealthStatus>>
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<HealthStatus>>, AppError> {
    let start = Instant::now();
    let sqlite = match state.sqlite.ping().await {
        Ok(()) => ComponentHealth {
            status: ServiceStatus::Healthy,
            message: None,
            duration_ms: Some(start.elapsed().as_millis() as u64),
        },
        Err(e) => {
            tracing::warn!("Health check: SQLite ping failed: {}", e);
            ComponentHealth {
                status: ServiceStatus::Unhealthy,
                message: Some(e.to_string()),
                duration_ms: Some(start.elapsed().as_millis() as u64),
            }
        },
    };

    let status = sqlite.status;
    let mut checks = HashMap::new();
    checks.insert("sqlite".to_string(), sqlite);

    Ok(Json(SuccessResponse::new(HealthStatus {
        status,
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now(),
        checks,
    })))
}
