//! Bearer token middleware and role gating
//!
//! `require_auth` validates the `Authorization: Bearer` header and stores the
//! decoded [`SessionClaims`] in request extensions. `require_admin` must be
//! layered inside it.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use common::AppError;
use tracing::debug;

use super::store::ROLE_ADMIN;
use super::token::SessionClaims;
use crate::app_state::AppState;

fn bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

/// Reject requests without a valid session token (401)
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(&req) else {
        return Err(AppError::unauthorized("Missing bearer token"));
    };

    let claims = state.auth.tokens().validate(token).map_err(|e| {
        debug!("Rejected token on {}: {}", req.uri().path(), e);
        AppError::unauthorized("Invalid or expired token")
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Reject authenticated callers lacking the Admin role (403)
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let Some(claims) = req.extensions().get::<SessionClaims>() else {
        return Err(AppError::unauthorized("Missing bearer token"));
    };
    if !claims.has_role(ROLE_ADMIN) {
        debug!("{} lacks role {} for {}", claims.sub, ROLE_ADMIN, req.uri().path());
        return Err(AppError::forbidden(format!("Role '{}' required", ROLE_ADMIN)));
    }
    Ok(next.run(req).await)
}

/// Claims of the authenticated caller, for handlers behind `require_auth`
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionClaims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::unauthorized("Missing bearer token"))
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(auth: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/api/genres");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&request_with(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&request_with(Some("bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&request_with(Some("Basic dXNlcg=="))), None);
        assert_eq!(bearer_token(&request_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&request_with(None)), None);
    }
}
