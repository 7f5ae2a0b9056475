//! Credential and token authentication
//!
//! - `token`: HS256 session tokens
//! - `password`: Argon2 hashing and identity rules
//! - `store`: SQLite credential store and role manager
//! - `service`: register / login / role grant orchestration
//! - `middleware`, `handlers`: HTTP surface

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use middleware::{require_admin, require_auth, AuthUser};
pub use models::{AuthResult, UserClaim, UserIdentity};
pub use service::AuthService;
pub use store::{CredentialStore, RoleManager, SqliteIdentityStore};
pub use token::{SessionClaims, TokenService};
