//! MovieSrv library exports for testing

pub mod api;
pub mod app_state;
pub mod auth;
pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod error;
pub mod routes;

// Re-export commonly used types
pub use app_state::AppState;
pub use auth::{AuthResult, AuthService, SessionClaims, TokenService};
pub use catalog::{Genre, GenreService, MovieDetails, MovieService};
pub use config::MoviesrvConfig;
pub use error::{MovieSrvError, Result};
pub use routes::create_routes;
