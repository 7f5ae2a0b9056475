//! Application State Management
//!
//! Central application state that is shared across all API handlers

use std::sync::Arc;
use std::time::Instant;

use common::sqlite::SqliteClient;

use crate::auth::AuthService;
use crate::catalog::{GenreService, MovieService};
use crate::config::MoviesrvConfig;

/// Application state containing shared resources
pub struct AppState {
    /// Effective configuration
    pub config: Arc<MoviesrvConfig>,

    /// SQLite client, used directly by the health check
    pub sqlite: SqliteClient,

    /// Register / login / role grant orchestration
    pub auth: Arc<AuthService>,

    pub genres: Arc<GenreService>,
    pub movies: Arc<MovieService>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: Arc<MoviesrvConfig>,
        sqlite: SqliteClient,
        auth: Arc<AuthService>,
        genres: Arc<GenreService>,
        movies: Arc<MovieService>,
    ) -> Self {
        Self {
            config,
            sqlite,
            auth,
            genres,
            movies,
            started_at: Instant::now(),
        }
    }
}
