//! Error handling for the Movie Catalog Service
//!
//! Business outcomes of the auth flows (duplicate user, bad credentials,
//! invalid role grant) are reported through `AuthResult` messages, not through
//! this type. `MovieSrvError` covers infrastructure failures and the HTTP
//! boundary errors of the catalog endpoints.

use errors::{ErrorCategory, MarqueeErrorTrait};
use thiserror::Error;

/// Movie Service Error Type
#[derive(Error, Debug, Clone)]
pub enum MovieSrvError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Required configuration key missing or empty
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    /// SQLite errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Password hashing failures
    #[error("Password hashing error: {0}")]
    PasswordError(String),

    /// Token signing failures
    #[error("Token error: {0}")]
    TokenError(String),

    /// Missing, malformed, expired or foreign bearer token
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but lacking the required role
    #[error("{0}")]
    Forbidden(String),

    /// Resource lookup failed
    #[error("{0}")]
    NotFound(String),

    /// Request rejected by a business rule (poster type, unknown genre, ...)
    #[error("{0}")]
    BadRequest(String),

    /// IO errors
    #[error("IO error: {0}")]
    IoError(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for the Movie Service
pub type Result<T> = std::result::Result<T, MovieSrvError>;

impl MovieSrvError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfig(key.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

impl From<sqlx::Error> for MovieSrvError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<std::io::Error> for MovieSrvError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<figment::Error> for MovieSrvError {
    fn from(err: figment::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<anyhow::Error> for MovieSrvError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for MovieSrvError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::InternalError(format!("Blocking task failed: {}", err))
    }
}

// ============================================================================
// MovieSrvError implements MarqueeErrorTrait
// ============================================================================

impl MarqueeErrorTrait for MovieSrvError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "MOVIESRV_CONFIG_ERROR",
            Self::MissingConfig(_) => "MOVIESRV_MISSING_CONFIG",
            Self::DatabaseError(_) => "MOVIESRV_DATABASE_ERROR",
            Self::PasswordError(_) => "MOVIESRV_PASSWORD_ERROR",
            Self::TokenError(_) => "MOVIESRV_TOKEN_ERROR",
            Self::Unauthorized(_) => "MOVIESRV_UNAUTHORIZED",
            Self::Forbidden(_) => "MOVIESRV_FORBIDDEN",
            Self::NotFound(_) => "MOVIESRV_NOT_FOUND",
            Self::BadRequest(_) => "MOVIESRV_BAD_REQUEST",
            Self::IoError(_) => "MOVIESRV_IO_ERROR",
            Self::InternalError(_) => "MOVIESRV_INTERNAL_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError(_) | Self::MissingConfig(_) => ErrorCategory::Configuration,
            Self::DatabaseError(_) => ErrorCategory::Database,
            Self::Unauthorized(_) => ErrorCategory::Authentication,
            Self::Forbidden(_) => ErrorCategory::Permission,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::BadRequest(_) => ErrorCategory::Validation,
            Self::PasswordError(_)
            | Self::TokenError(_)
            | Self::IoError(_)
            | Self::InternalError(_) => ErrorCategory::Internal,
        }
    }
}

// ============================================================================
// Conversion to AppError for HTTP responses
// ============================================================================

impl From<MovieSrvError> for common::AppError {
    fn from(err: MovieSrvError) -> Self {
        use common::{AppError, ErrorInfo};

        let status = err.http_status();
        match err.log_level() {
            tracing::Level::ERROR => tracing::error!("{} ({})", err, err.error_code()),
            tracing::Level::WARN => tracing::warn!("{} ({})", err, err.error_code()),
            _ => tracing::debug!("{} ({})", err, err.error_code()),
        }

        let error_info = ErrorInfo::new(err.to_string())
            .with_code(status.as_u16())
            .with_details(format!(
                "error_code: {}, category: {:?}",
                err.error_code(),
                err.category()
            ));

        AppError::new(status, error_info)
    }
}

impl axum::response::IntoResponse for MovieSrvError {
    fn into_response(self) -> axum::response::Response {
        common::AppError::from(self).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_catalog_messages_are_unprefixed() {
        let err = MovieSrvError::bad_request("Invalid file type");
        assert_eq!(err.to_string(), "Invalid file type");

        let app: common::AppError = err.into();
        assert_eq!(app.status, StatusCode::BAD_REQUEST);
        assert_eq!(app.error.message, "Invalid file type");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            MovieSrvError::unauthorized("x").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            MovieSrvError::forbidden("x").http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            MovieSrvError::not_found("x").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            MovieSrvError::from(sqlx::Error::PoolClosed).http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_log_levels() {
        let db = MovieSrvError::from(sqlx::Error::PoolClosed);
        assert_eq!(db.log_level(), tracing::Level::ERROR);
        assert_eq!(
            MovieSrvError::forbidden("x").log_level(),
            tracing::Level::WARN
        );
        assert_eq!(
            MovieSrvError::not_found("x").log_level(),
            tracing::Level::INFO
        );
    }

    #[test]
    fn test_server_errors_carry_code_in_details() {
        let app: common::AppError = MovieSrvError::internal("boom").into();
        assert_eq!(app.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.error.code, 500);
        assert!(app
            .error
            .details
            .unwrap()
            .contains("MOVIESRV_INTERNAL_ERROR"));
    }
}
