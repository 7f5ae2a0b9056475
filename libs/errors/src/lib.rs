//! Unified error handling for Marquee services
//!
//! Services keep their own error enums and implement `MarqueeErrorTrait` to
//! get the shared codes, categories and HTTP mapping. `ErrorInfo` is the error
//! body every API response carries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// ErrorInfo - API error response type
// ============================================================================

/// Standard error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error code (HTTP status or custom)
    pub code: u16,
    /// Error message
    pub message: String,
    /// Detailed error description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Field-specific errors for validation
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub field_errors: HashMap<String, Vec<String>>,
}

impl ErrorInfo {
    /// Create a new ErrorInfo with just a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: 500,
            message: message.into(),
            details: None,
            field_errors: HashMap::new(),
        }
    }

    /// Set the error code
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    /// Add details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Add a field error
    pub fn add_field_error(mut self, field: impl Into<String>, error: impl Into<String>) -> Self {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(error.into());
        self
    }
}

// ============================================================================
// Marquee Error Trait - Architectural layer
// ============================================================================

/// Error category enum - used for classification and status mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    // Infrastructure layer
    Configuration,
    Database,

    // Business logic layer
    Validation,
    NotFound,
    Authentication,
    Permission,

    // System level
    Internal,
}

/// Marquee error capability trait
///
/// Each service keeps its own domain error type and gains the common
/// outward-facing interface (codes, categories, HTTP mapping) by implementing
/// this trait.
pub trait MarqueeErrorTrait: std::error::Error + Send + Sync + 'static {
    /// Get error code (for API and logs)
    fn error_code(&self) -> &'static str;

    /// Get error category
    fn category(&self) -> ErrorCategory;

    /// Convert to HTTP status code
    #[cfg(feature = "axum-support")]
    fn http_status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Authentication => StatusCode::UNAUTHORIZED,
            ErrorCategory::Permission => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get log level
    fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self.category() {
            ErrorCategory::Internal | ErrorCategory::Database => Level::ERROR,
            ErrorCategory::Validation
            | ErrorCategory::NotFound
            | ErrorCategory::Authentication => Level::INFO,
            _ => Level::WARN,
        }
    }
}

// Tests
#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    enum SampleError {
        #[error("no such genre")]
        Missing,
        #[error("pool closed")]
        Pool,
        #[error("bad token")]
        Token,
    }

    impl MarqueeErrorTrait for SampleError {
        fn error_code(&self) -> &'static str {
            match self {
                Self::Missing => "SAMPLE_NOT_FOUND",
                Self::Pool => "SAMPLE_DATABASE",
                Self::Token => "SAMPLE_UNAUTHORIZED",
            }
        }

        fn category(&self) -> ErrorCategory {
            match self {
                Self::Missing => ErrorCategory::NotFound,
                Self::Pool => ErrorCategory::Database,
                Self::Token => ErrorCategory::Authentication,
            }
        }
    }

    #[test]
    fn test_log_level_by_category() {
        assert_eq!(SampleError::Pool.log_level(), tracing::Level::ERROR);
        assert_eq!(SampleError::Missing.log_level(), tracing::Level::INFO);
        assert_eq!(SampleError::Token.log_level(), tracing::Level::INFO);
    }

    #[cfg(feature = "axum-support")]
    #[test]
    fn test_http_status_by_category() {
        use axum::http::StatusCode;
        assert_eq!(SampleError::Missing.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(SampleError::Token.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            SampleError::Pool.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_info_builder() {
        let info = ErrorInfo::new("Validation failed")
            .with_code(400)
            .add_field_error("name", "too long")
            .add_field_error("name", "must not be empty");
        assert_eq!(info.code, 400);
        assert_eq!(info.field_errors["name"].len(), 2);

        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("details").is_none());
    }
}
