//! Credential store and role manager
//!
//! Both traits are implemented by [`SqliteIdentityStore`]. Username, email and
//! role lookups go through upper-cased `normalized_*` columns, which carry the
//! UNIQUE constraints.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{CreateUserOutcome, NewUser, UserClaim, UserIdentity};
use super::password;
use crate::config::PasswordPolicy;
use crate::error::Result;

/// Roles created at startup
pub const DEFAULT_ROLES: &[&str] = &["Admin", "User"];
pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_USER: &str = "User";

/// Persistence of user identities
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<UserIdentity>>;

    /// Validate, hash the password and insert. Expected rejections are
    /// outcomes, not errors.
    async fn create_user(&self, user: NewUser, password: &str) -> Result<CreateUserOutcome>;

    async fn check_password(&self, user: &UserIdentity, password: &str) -> Result<bool>;
    async fn get_roles(&self, user: &UserIdentity) -> Result<Vec<String>>;
    async fn add_to_role(&self, user: &UserIdentity, role: &str) -> Result<bool>;
    async fn get_claims(&self, user: &UserIdentity) -> Result<Vec<UserClaim>>;
    async fn add_claim(&self, user: &UserIdentity, claim: UserClaim) -> Result<()>;
}

/// Role existence and assignment
#[async_trait]
pub trait RoleManager: Send + Sync {
    async fn role_exists(&self, name: &str) -> Result<bool>;

    /// `false` when the role or user is unknown, or the role is already held
    async fn assign_role(&self, user_id: &str, name: &str) -> Result<bool>;

    async fn user_has_role(&self, user_id: &str, name: &str) -> Result<bool>;

    /// Role names held by the user, sorted by name
    async fn list_roles(&self, user_id: &str) -> Result<Vec<String>>;

    /// Insert [`DEFAULT_ROLES`] when absent
    async fn seed_default_roles(&self) -> Result<()>;
}

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
}

impl From<UserRow> for UserIdentity {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
        }
    }
}

const SELECT_USER: &str =
    "SELECT id, username, email, first_name, last_name, password_hash FROM users";

/// SQLite-backed identity store
#[derive(Clone)]
pub struct SqliteIdentityStore {
    pool: SqlitePool,
    policy: PasswordPolicy,
}

impl SqliteIdentityStore {
    pub fn new(pool: SqlitePool, policy: PasswordPolicy) -> Self {
        Self { pool, policy }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<UserIdentity>> {
        let sql = format!("{} WHERE {} = ?", SELECT_USER, column);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(UserIdentity::from))
    }

    async fn role_id(&self, name: &str) -> Result<Option<String>> {
        let id = sqlx::query_scalar::<_, String>("SELECT id FROM roles WHERE normalized_name = ?")
            .bind(normalize(name))
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn duplicate_of(&self, user: &NewUser) -> Result<Option<CreateUserOutcome>> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Ok(Some(CreateUserOutcome::DuplicateEmail));
        }
        if self.find_by_username(&user.username).await?.is_some() {
            return Ok(Some(CreateUserOutcome::DuplicateUsername));
        }
        Ok(None)
    }

    /// Insert a validated identity; the UNIQUE columns settle any race that
    /// slipped past `duplicate_of`
    async fn insert_user(&self, identity: UserIdentity) -> Result<CreateUserOutcome> {
        let inserted = sqlx::query(
            "INSERT INTO users (id, username, normalized_username, email, normalized_email, \
             first_name, last_name, password_hash, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&identity.id)
        .bind(&identity.username)
        .bind(normalize(&identity.username))
        .bind(&identity.email)
        .bind(normalize(&identity.email))
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.password_hash)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {
                info!("User created: {} ({})", identity.username, identity.id);
                Ok(CreateUserOutcome::Created(identity))
            },
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                debug!(
                    "Insert of '{}' hit a unique constraint: {}",
                    identity.username,
                    db.message()
                );
                if db.message().contains("normalized_email") {
                    Ok(CreateUserOutcome::DuplicateEmail)
                } else {
                    Ok(CreateUserOutcome::DuplicateUsername)
                }
            },
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl CredentialStore for SqliteIdentityStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>> {
        self.find_one("normalized_email", &normalize(email)).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>> {
        self.find_one("normalized_username", &normalize(username))
            .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserIdentity>> {
        self.find_one("id", id).await
    }

    async fn create_user(&self, user: NewUser, password: &str) -> Result<CreateUserOutcome> {
        let errors =
            password::validate_identity(&user.username, &user.email, password, &self.policy);
        if !errors.is_empty() {
            debug!("User '{}' rejected: {} rule(s) failed", user.username, errors.len());
            return Ok(CreateUserOutcome::Rejected(errors));
        }

        if let Some(duplicate) = self.duplicate_of(&user).await? {
            return Ok(duplicate);
        }

        let password_hash = password::hash_password(password).await?;
        let identity = UserIdentity {
            id: Uuid::new_v4().to_string(),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash,
        };

        self.insert_user(identity).await
    }

    async fn check_password(&self, user: &UserIdentity, password: &str) -> Result<bool> {
        password::verify_password(password, &user.password_hash).await
    }

    async fn get_roles(&self, user: &UserIdentity) -> Result<Vec<String>> {
        self.list_roles(&user.id).await
    }

    async fn add_to_role(&self, user: &UserIdentity, role: &str) -> Result<bool> {
        self.assign_role(&user.id, role).await
    }

    async fn get_claims(&self, user: &UserIdentity) -> Result<Vec<UserClaim>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT claim_type, claim_value FROM user_claims WHERE user_id = ? ORDER BY id",
        )
        .bind(&user.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(claim_type, claim_value)| UserClaim {
                claim_type,
                claim_value,
            })
            .collect())
    }

    async fn add_claim(&self, user: &UserIdentity, claim: UserClaim) -> Result<()> {
        sqlx::query("INSERT INTO user_claims (user_id, claim_type, claim_value) VALUES (?, ?, ?)")
            .bind(&user.id)
            .bind(&claim.claim_type)
            .bind(&claim.claim_value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RoleManager for SqliteIdentityStore {
    async fn role_exists(&self, name: &str) -> Result<bool> {
        Ok(self.role_id(name).await?.is_some())
    }

    async fn assign_role(&self, user_id: &str, name: &str) -> Result<bool> {
        let Some(role_id) = self.role_id(name).await? else {
            return Ok(false);
        };

        let result = sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(&role_id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn user_has_role(&self, user_id: &str, name: &str) -> Result<bool> {
        let held = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM user_roles ur JOIN roles r ON r.id = ur.role_id \
             WHERE ur.user_id = ? AND r.normalized_name = ?)",
        )
        .bind(user_id)
        .bind(normalize(name))
        .fetch_one(&self.pool)
        .await?;
        Ok(held)
    }

    async fn list_roles(&self, user_id: &str) -> Result<Vec<String>> {
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT r.name FROM user_roles ur JOIN roles r ON r.id = ur.role_id \
             WHERE ur.user_id = ? ORDER BY r.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn seed_default_roles(&self) -> Result<()> {
        for name in DEFAULT_ROLES {
            let inserted = sqlx::query(
                "INSERT OR IGNORE INTO roles (id, name, normalized_name) VALUES (?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(*name)
            .bind(normalize(name))
            .execute(&self.pool)
            .await?;

            if inserted.rows_affected() == 1 {
                info!("Seeded role: {}", name);
            }
        }
        Ok(())
    }
}
