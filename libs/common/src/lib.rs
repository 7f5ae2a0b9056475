//! Marquee shared library
//!
//! Provides functions shared by all services:
//! - API response envelopes and `AppError`
//! - logging (console, rolling files, access log middleware)
//! - SQLite client
//! - startup banner, CLI arguments and shutdown signal

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod api_types;
pub mod bootstrap_args;
pub mod logging;
pub mod serde_helpers;
pub mod service_bootstrap;
pub mod shutdown;

pub use api_types::{
    ComponentHealth, ErrorInfo, ErrorResponse, HealthStatus, ServiceStatus, SuccessResponse,
};

#[cfg(feature = "axum")]
pub use api_types::AppError;

pub use bootstrap_args::ServiceArgs;

// Re-export common dependencies
pub use anyhow;
pub use serde;
pub use serde_json;
pub use tokio;

#[cfg(feature = "cli")]
pub use clap;
