//! Auth API Handlers
//!
//! Bodies follow the public auth contract (camelCase, no success envelope):
//! register answers `{token, expiresOn}`, token answers the full `AuthResult`,
//! failures answer 400 with the `AuthResult` or message.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use common::AppError;

use super::middleware::AuthUser;
use super::models::{AddRoleRequest, RegisterRequest, RegisterResponse, TokenRequest};
use crate::app_state::AppState;

/// Register a new user
///
/// @route POST /api/auth/register
/// @input Json<RegisterRequest>
/// @output 200 `{token, expiresOn}` | 400 `AuthResult`
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    let field_errors = request.validate();
    if !field_errors.is_empty() {
        return Err(AppError::validation_error(field_errors));
    }

    let result = state.auth.register(request).await?;
    match (result.is_authenticated, &result.token, result.expire_on) {
        (true, Some(token), Some(expires_on)) => Ok(Json(RegisterResponse {
            token: token.clone(),
            expires_on,
        })
        .into_response()),
        _ => Ok((StatusCode::BAD_REQUEST, Json(result)).into_response()),
    }
}

/// Exchange credentials for a session token
///
/// @route POST /api/auth/token
/// @input Json<TokenRequest>
/// @output 200 `AuthResult` | 400 `AuthResult`
pub async fn get_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenRequest>,
) -> Result<Response, AppError> {
    let field_errors = request.validate();
    if !field_errors.is_empty() {
        return Err(AppError::validation_error(field_errors));
    }

    let result = state.auth.login(request).await?;
    let status = if result.is_authenticated {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(result)).into_response())
}

/// Grant a role to a user (Admin only)
///
/// @route POST /api/auth/addrole
/// @input Json<AddRoleRequest>
/// @output 200 echoes the request | 400 message string
pub async fn add_role(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(request): Json<AddRoleRequest>,
) -> Result<Response, AppError> {
    let field_errors = request.validate();
    if !field_errors.is_empty() {
        return Err(AppError::validation_error(field_errors));
    }

    tracing::debug!("{} grants '{}' to {}", caller.sub, request.role, request.user_id);
    let message = state.auth.add_role(request.clone()).await?;
    if message.is_empty() {
        Ok(Json(request).into_response())
    } else {
        Ok((StatusCode::BAD_REQUEST, Json(message)).into_response())
    }
}
