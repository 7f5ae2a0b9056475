//! Identity records and auth request/response bodies

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored user identity
///
/// The password is only ever held as an Argon2 PHC string. Roles live in
/// `user_roles` and are read through `CredentialStore::get_roles`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// Fields of an identity about to be created
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Result of `CredentialStore::create_user`
#[derive(Debug, Clone)]
pub enum CreateUserOutcome {
    Created(UserIdentity),
    /// Identity or password rules failed; descriptions in check order
    Rejected(Vec<String>),
    DuplicateEmail,
    DuplicateUsername,
}

/// Extra `(type, value)` assertion embedded into issued tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaim {
    pub claim_type: String,
    pub claim_value: String,
}

impl UserClaim {
    pub fn new(claim_type: impl Into<String>, claim_value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            claim_value: claim_value.into(),
        }
    }
}

// ============================================================================
// Request bodies
// ============================================================================

pub type FieldErrors = HashMap<String, Vec<String>>;

/// Required, at most `max` characters
pub(crate) fn check_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors
            .entry(field.to_string())
            .or_default()
            .push(format!("The {} field is required.", field));
    } else if value.chars().count() > max {
        errors
            .entry(field.to_string())
            .or_default()
            .push(format!("The field {} must be at most {} characters.", field, max));
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    /// Boundary checks (presence and length); identity rules run in the store
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_len(&mut errors, "firstName", &self.first_name, 100);
        check_len(&mut errors, "lastName", &self.last_name, 100);
        check_len(&mut errors, "username", &self.username, 50);
        check_len(&mut errors, "email", &self.email, 128);
        check_len(&mut errors, "password", &self.password, 256);
        errors
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl TokenRequest {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_len(&mut errors, "email", &self.email, 128);
        check_len(&mut errors, "password", &self.password, 256);
        errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRoleRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub role: String,
}

impl AddRoleRequest {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_len(&mut errors, "userId", &self.user_id, 450);
        check_len(&mut errors, "role", &self.role, 256);
        errors
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Uniform outcome of register and login
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub message: String,
    pub is_authenticated: bool,
    pub username: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub token: Option<String>,
    pub expire_on: Option<DateTime<Utc>>,
}

impl AuthResult {
    /// Unauthenticated result carrying only a message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Body returned by a successful registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_auth_result_camel_case() {
        let result = AuthResult {
            is_authenticated: true,
            roles: vec!["User".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isAuthenticated"], true);
        assert_eq!(json["roles"][0], "User");
        assert!(json.get("expireOn").is_some());
    }

    #[test]
    fn test_register_request_validation() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"firstName":"Alice","lastName":"","username":"alice","email":"alice@example.com","password":"P@ssw0rd!"}"#,
        )
        .unwrap();
        let errors = req.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("lastName"));
    }

    #[test]
    fn test_username_length_limit() {
        let req = RegisterRequest {
            first_name: "A".into(),
            last_name: "B".into(),
            username: "u".repeat(51),
            email: "a@b.c".into(),
            password: "x".into(),
        };
        assert!(req.validate().contains_key("username"));
    }
}
