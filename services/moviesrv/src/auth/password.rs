//! Password hashing and identity validation
//!
//! Argon2id with a random 16-byte salt, stored as a PHC string. Hashing and
//! verification are CPU-bound and run on the blocking pool.

use std::collections::HashSet;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::config::PasswordPolicy;
use crate::error::{MovieSrvError, Result};

const USERNAME_EXTRA_CHARS: &[char] = &['-', '.', '_', '@', '+'];

fn hash_blocking(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| MovieSrvError::PasswordError(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| MovieSrvError::PasswordError(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| MovieSrvError::PasswordError(e.to_string()))
}

fn verify_blocking(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Hash a password into an Argon2id PHC string
pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&password)).await?
}

/// Check a password against a stored PHC string; unparsable hashes never match
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    Ok(tokio::task::spawn_blocking(move || verify_blocking(&password, &hash)).await?)
}

fn username_is_valid(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || USERNAME_EXTRA_CHARS.contains(&c))
}

fn email_is_valid(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !email.chars().any(char::is_whitespace)
        },
        _ => false,
    }
}

/// Password rule violations, in policy order
pub fn validate_password(password: &str, policy: &PasswordPolicy) -> Vec<String> {
    let mut errors = Vec::new();

    if password.chars().count() < policy.required_length {
        errors.push(format!(
            "Passwords must be at least {} characters.",
            policy.required_length
        ));
    }
    if policy.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
        errors.push("Passwords must have at least one non alphanumeric character.".to_string());
    }
    if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Passwords must have at least one digit ('0'-'9').".to_string());
    }
    if policy.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Passwords must have at least one lowercase ('a'-'z').".to_string());
    }
    if policy.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Passwords must have at least one uppercase ('A'-'Z').".to_string());
    }
    if policy.required_unique_chars >= 1 {
        let unique = password.chars().collect::<HashSet<_>>().len();
        if unique < policy.required_unique_chars {
            errors.push(format!(
                "Passwords must use at least {} different characters.",
                policy.required_unique_chars
            ));
        }
    }

    errors
}

/// All reasons a new identity would be rejected, username first, then
/// email, then password rules
pub fn validate_identity(
    username: &str,
    email: &str,
    password: &str,
    policy: &PasswordPolicy,
) -> Vec<String> {
    let mut errors = Vec::new();
    if !username_is_valid(username) {
        errors.push(format!(
            "Username '{}' is invalid, can only contain letters or digits.",
            username
        ));
    }
    if !email_is_valid(email) {
        errors.push(format!("Email '{}' is invalid.", email));
    }
    errors.extend(validate_password(password, policy));
    errors
}
