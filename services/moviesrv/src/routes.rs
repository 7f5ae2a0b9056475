//! API Route Configuration
//!
//! Central route definition for all Movie Service API endpoints

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::admin_handlers::{get_log_level, set_log_level};
use crate::api::genre_handlers::{create_genre, delete_genre, list_genres, update_genre};
use crate::api::health_handlers::health_check;
use crate::api::movie_handlers::{
    create_movie, delete_movie, get_movie, list_movies, list_movies_by_genre, update_movie,
};
use crate::app_state::AppState;
use crate::auth::handlers::{add_role, get_token, register};
use crate::auth::{require_admin, require_auth};

/// Room for the text parts next to a maximum-size poster
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create all API routes for the Movie Service
pub fn create_routes(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.upload.max_poster_bytes + MULTIPART_OVERHEAD;

    let public = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/token", post(get_token))
        .route("/api/genres", get(list_genres))
        .route("/api/movies", get(list_movies))
        .route("/api/movies/genre", get(list_movies_by_genre))
        .route("/api/movies/{id}", get(get_movie));

    // Bearer token required
    let protected = Router::new()
        .route("/api/genres", post(create_genre))
        .route("/api/genres/{id}", put(update_genre).delete(delete_genre))
        .route("/api/movies", post(create_movie))
        .route("/api/movies/{id}", put(update_movie).delete(delete_movie))
        .layer(DefaultBodyLimit::max(upload_limit))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Bearer token with the Admin role
    let admin = Router::new()
        .route("/api/auth/addrole", post(add_role))
        .route(
            "/api/admin/log-level",
            get(get_log_level).put(set_log_level),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public
        .merge(protected)
        .merge(admin)
        // Apply HTTP request logging middleware
        .layer(middleware::from_fn(common::logging::http_request_logger))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
