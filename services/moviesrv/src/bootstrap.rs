//! Service Bootstrap and Initialization
//!
//! Schema creation and wiring of the shared application state.

use std::sync::Arc;

use common::service_bootstrap::ServiceInfo;
use common::sqlite::SqliteClient;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::app_state::AppState;
use crate::auth::{AuthService, RoleManager, SqliteIdentityStore, TokenService};
use crate::catalog::{GenreService, MovieService};
use crate::config::{MoviesrvConfig, DEFAULT_PORT, SERVICE_NAME};
use crate::error::Result;

// ============================================================================
// Table DDL
// ============================================================================

pub const ROLES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS roles (
        id TEXT NOT NULL PRIMARY KEY,
        name TEXT NOT NULL,
        normalized_name TEXT NOT NULL UNIQUE
    )
"#;

pub const USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT NOT NULL PRIMARY KEY,
        username TEXT NOT NULL,
        normalized_username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL,
        normalized_email TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

pub const USER_ROLES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS user_roles (
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        role_id TEXT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
        PRIMARY KEY (user_id, role_id)
    )
"#;

pub const USER_CLAIMS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS user_claims (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        claim_type TEXT NOT NULL,
        claim_value TEXT NOT NULL
    )
"#;

pub const GENRES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS genres (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
"#;

pub const MOVIES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS movies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        story_line TEXT NOT NULL,
        year INTEGER NOT NULL,
        rate REAL NOT NULL,
        poster BLOB NOT NULL,
        genre_id INTEGER NOT NULL REFERENCES genres(id) ON DELETE CASCADE
    )
"#;

const MOVIES_GENRE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_movies_genre_id ON movies(genre_id)";

/// Create all tables (idempotent)
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for ddl in [
        ROLES_TABLE,
        USERS_TABLE,
        USER_ROLES_TABLE,
        USER_CLAIMS_TABLE,
        GENRES_TABLE,
        MOVIES_TABLE,
        MOVIES_GENRE_INDEX,
    ] {
        sqlx::query(ddl).execute(pool).await?;
    }
    debug!("Schema ready");
    Ok(())
}

/// Service info for the startup banner
pub fn create_service_info() -> ServiceInfo {
    ServiceInfo::new(
        SERVICE_NAME,
        env!("CARGO_PKG_VERSION"),
        "Movie Catalog Service - Genres, Movies & Token Auth",
        DEFAULT_PORT,
    )
}

/// Create the schema, seed default roles and wire all services
pub async fn create_app_state(
    config: MoviesrvConfig,
    sqlite: SqliteClient,
) -> Result<Arc<AppState>> {
    init_schema(sqlite.pool()).await?;

    let identity = Arc::new(SqliteIdentityStore::new(
        sqlite.pool().clone(),
        config.password.clone(),
    ));
    identity.seed_default_roles().await?;

    let tokens = Arc::new(TokenService::new(&config.jwt)?);
    let auth = Arc::new(AuthService::new(identity.clone(), identity, tokens));
    let genres = Arc::new(GenreService::new(sqlite.pool().clone()));
    let movies = Arc::new(MovieService::new(sqlite.pool().clone()));

    info!("Application state ready (db: {})", sqlite.path());
    Ok(Arc::new(AppState::new(
        Arc::new(config),
        sqlite,
        auth,
        genres,
        movies,
    )))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_schema_idempotent() {
        let client = SqliteClient::in_memory().await.unwrap();
        init_schema(client.pool()).await.unwrap();
        init_schema(client.pool()).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(client.pool())
        .await
        .unwrap();
        assert_eq!(
            tables,
            vec!["genres", "movies", "roles", "user_claims", "user_roles", "users"]
        );
    }

    #[tokio::test]
    async fn test_create_app_state_seeds_roles() {
        let mut config = MoviesrvConfig::default();
        config.jwt.key = "bootstrap-test-key".into();
        let client = SqliteClient::in_memory().await.unwrap();

        let state = create_app_state(config.clone(), client.clone()).await.unwrap();
        // Second start against the same database must not duplicate roles
        create_app_state(config, client.clone()).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
            .fetch_one(client.pool())
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(state.config.jwt.issuer, "MarqueeApi");
    }

    #[tokio::test]
    async fn test_create_app_state_rejects_empty_key() {
        let client = SqliteClient::in_memory().await.unwrap();
        assert!(create_app_state(MoviesrvConfig::default(), client)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_create_app_state_rejects_unrepresentable_expiry() {
        let mut config = MoviesrvConfig::default();
        config.jwt.key = "bootstrap-test-key".into();
        config.jwt.expiration_in_days = 100_000_000;
        let client = SqliteClient::in_memory().await.unwrap();

        let err = create_app_state(config, client).await.err().unwrap();
        assert!(matches!(err, crate::error::MovieSrvError::ConfigError(_)));
    }
}
