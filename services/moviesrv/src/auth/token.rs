//! Session token issuance and validation (HS256)
//!
//! Tokens are stateless: nothing is persisted server-side, so validity is
//! decided by the signature, issuer, audience and `exp` alone.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::models::{UserClaim, UserIdentity};
use crate::config::JwtConfig;
use crate::error::{MovieSrvError, Result};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Claim names owned by the service; custom claims may not override them
const REGISTERED_CLAIMS: &[&str] = &[
    "sub", "jti", "email", "uid", "roles", "iss", "aud", "iat", "exp", "nbf",
];

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Username
    pub sub: String,
    pub jti: String,
    pub email: String,
    /// Internal user id
    pub uid: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    /// Custom claims from the credential store
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

/// A signed token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expire_on: DateTime<Utc>,
}

/// Fold custom claims into a JSON map: reserved names are dropped, a type
/// seen more than once becomes an array in insertion order
fn merge_custom_claims(claims: &[UserClaim]) -> Map<String, Value> {
    let mut extra = Map::new();
    for claim in claims {
        if REGISTERED_CLAIMS.contains(&claim.claim_type.as_str()) {
            continue;
        }
        let value = Value::String(claim.claim_value.clone());
        match extra.get_mut(&claim.claim_type) {
            None => {
                extra.insert(claim.claim_type.clone(), value);
            },
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            },
        }
    }
    extra
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    lifetime_secs: i64,
}

/// Token lifetime in seconds for `days`; rejects non-positive values and
/// lifetimes whose expiry, counted from now, cannot be represented
pub fn lifetime_seconds(days: i64) -> Result<i64> {
    if days <= 0 {
        return Err(MovieSrvError::config(
            "jwt.expiration_in_days must be positive",
        ));
    }
    days.checked_mul(SECONDS_PER_DAY)
        .filter(|secs| expiry_after(Utc::now().timestamp(), *secs).is_some())
        .ok_or_else(|| {
            MovieSrvError::config(format!(
                "jwt.expiration_in_days is out of range: {}",
                days
            ))
        })
}

fn expiry_after(iat: i64, lifetime_secs: i64) -> Option<DateTime<Utc>> {
    iat.checked_add(lifetime_secs)
        .and_then(|exp| DateTime::from_timestamp(exp, 0))
}

impl TokenService {
    /// Build from config; an empty or whitespace key is a fatal config error
    pub fn new(config: &JwtConfig) -> Result<Self> {
        if config.key.trim().is_empty() {
            return Err(MovieSrvError::missing_config("jwt.key"));
        }
        let lifetime_secs = lifetime_seconds(config.expiration_in_days)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = 0;
        // exp is checked against an explicit clock in validate_at
        validation.validate_exp = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.key.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime_secs,
        })
    }

    pub fn issue_token(
        &self,
        user: &UserIdentity,
        roles: &[String],
        claims: &[UserClaim],
    ) -> Result<IssuedToken> {
        self.issue_token_at(user, roles, claims, Utc::now())
    }

    /// Sign a token as of `issued_at` (second precision)
    pub fn issue_token_at(
        &self,
        user: &UserIdentity,
        roles: &[String],
        claims: &[UserClaim],
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken> {
        let iat = issued_at.timestamp();
        let expire_on = expiry_after(iat, self.lifetime_secs).ok_or_else(|| {
            MovieSrvError::TokenError(format!("Expiry out of range for iat {}", iat))
        })?;
        let exp = expire_on.timestamp();

        let session = SessionClaims {
            sub: user.username.clone(),
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            uid: user.id.clone(),
            roles: roles.to_vec(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            exp,
            extra: merge_custom_claims(claims),
        };

        let token = encode(&Header::new(Algorithm::HS256), &session, &self.encoding_key)
            .map_err(|e| MovieSrvError::TokenError(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken { token, expire_on })
    }

    pub fn validate(&self, token: &str) -> Result<SessionClaims> {
        self.validate_at(token, Utc::now())
    }

    /// Verify signature, issuer and audience, then reject when `now >= exp`
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| MovieSrvError::unauthorized(format!("Invalid token: {}", e)))?;

        if now.timestamp() >= data.claims.exp {
            return Err(MovieSrvError::unauthorized("Token expired"));
        }
        Ok(data.claims)
    }
}
