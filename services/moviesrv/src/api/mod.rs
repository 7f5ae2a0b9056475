//! HTTP handlers for the catalog, health and admin endpoints
//!
//! Auth handlers live in `crate::auth::handlers`.

pub mod admin_handlers;
pub mod genre_handlers;
pub mod health_handlers;
pub mod movie_handlers;
