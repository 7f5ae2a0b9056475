//! Admin API handlers: runtime log level

use axum::response::Json;
use common::{AppError, SuccessResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLevelResponse {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetLogLevelRequest {
    /// Bare level ("debug") or full filter ("info,moviesrv=trace")
    pub level: String,
}

/// @route GET /api/admin/log-level
pub async fn get_log_level() -> Json<SuccessResponse<LogLevelResponse>> {
    Json(SuccessResponse::new(LogLevelResponse {
        level: common::logging::get_log_level(),
    }))
}

/// @route PUT /api/admin/log-level
pub async fn set_log_level(
    Json(request): Json<SetLogLevelRequest>,
) -> Result<Json<SuccessResponse<LogLevelResponse>>, AppError> {
    let level = request.level.trim();
    if level.is_empty() {
        return Err(AppError::bad_request("Log level must not be empty"));
    }

    common::logging::set_log_level(level).map_err(AppError::bad_request)?;
    Ok(Json(SuccessResponse::new(LogLevelResponse {
        level: level.to_string(),
    })))
}
