//! Registration, login and role grants
//!
//! Expected business failures come back as an unauthenticated `AuthResult`
//! (or a non-empty message for role grants). `Err` means the store or the
//! signer failed.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::models::{
    AddRoleRequest, AuthResult, CreateUserOutcome, NewUser, RegisterRequest, TokenRequest,
    UserIdentity,
};
use super::store::{CredentialStore, RoleManager, ROLE_USER};
use super::token::TokenService;
use crate::error::Result;

pub const MSG_EMAIL_EXISTS: &str = "email already exists";
pub const MSG_USERNAME_EXISTS: &str = "username already exists";
pub const MSG_USER_CREATED: &str = "User created successfully";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const MSG_INVALID_USER_OR_ROLE: &str = "Invalid username or role";
pub const MSG_ROLE_ALREADY_HELD: &str = "User already has this role";
pub const MSG_ADD_ROLE_FAILED: &str = "Failed to add role";

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    roles: Arc<dyn RoleManager>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        roles: Arc<dyn RoleManager>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            store,
            roles,
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Sign a token for `user` with its current roles and claims
    async fn authenticated(&self, user: &UserIdentity, message: &str) -> Result<AuthResult> {
        let roles = self.store.get_roles(user).await?;
        let claims = self.store.get_claims(user).await?;
        let issued = self.tokens.issue_token(user, &roles, &claims)?;

        Ok(AuthResult {
            message: message.to_string(),
            is_authenticated: true,
            username: Some(user.username.clone()),
            email: Some(user.email.clone()),
            roles,
            token: Some(issued.token),
            expire_on: Some(issued.expire_on),
        })
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResult> {
        if self.store.find_by_email(&request.email).await?.is_some() {
            debug!("Registration refused: email in use");
            return Ok(AuthResult::failure(MSG_EMAIL_EXISTS));
        }
        if self.store.find_by_username(&request.username).await?.is_some() {
            debug!("Registration refused: username '{}' in use", request.username);
            return Ok(AuthResult::failure(MSG_USERNAME_EXISTS));
        }

        let new_user = NewUser {
            username: request.username,
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
        };

        let user = match self.store.create_user(new_user, &request.password).await? {
            CreateUserOutcome::Created(user) => user,
            CreateUserOutcome::Rejected(errors) => {
                debug!("Registration rejected by identity rules");
                return Ok(AuthResult::failure(errors.join(" ")));
            },
            CreateUserOutcome::DuplicateEmail => return Ok(AuthResult::failure(MSG_EMAIL_EXISTS)),
            CreateUserOutcome::DuplicateUsername => {
                return Ok(AuthResult::failure(MSG_USERNAME_EXISTS))
            },
        };

        if !self.store.add_to_role(&user, ROLE_USER).await? {
            warn!("Role '{}' missing, {} has no roles", ROLE_USER, user.username);
        }

        let result = self.authenticated(&user, MSG_USER_CREATED).await?;
        info!("Registered {}", user.username);
        Ok(result)
    }

    pub async fn login(&self, request: TokenRequest) -> Result<AuthResult> {
        let Some(user) = self.store.find_by_email(&request.email).await? else {
            debug!("Login failed: unknown email");
            return Ok(AuthResult::failure(MSG_INVALID_CREDENTIALS));
        };

        if !self.store.check_password(&user, &request.password).await? {
            debug!("Login failed: bad password for {}", user.username);
            return Ok(AuthResult::failure(MSG_INVALID_CREDENTIALS));
        }

        let result = self.authenticated(&user, "").await?;
        info!("Token issued for {}", user.username);
        Ok(result)
    }

    /// Grant a role; returns an empty string on success, otherwise the reason
    pub async fn add_role(&self, request: AddRoleRequest) -> Result<String> {
        let user = self.store.find_by_id(&request.user_id).await?;
        let Some(user) = user else {
            return Ok(MSG_INVALID_USER_OR_ROLE.to_string());
        };
        if !self.roles.role_exists(&request.role).await? {
            return Ok(MSG_INVALID_USER_OR_ROLE.to_string());
        }

        if self.roles.user_has_role(&user.id, &request.role).await? {
            return Ok(MSG_ROLE_ALREADY_HELD.to_string());
        }

        if self.store.add_to_role(&user, &request.role).await? {
            info!("Role '{}' granted to {}", request.role, user.username);
            Ok(String::new())
        } else {
            warn!("Role '{}' not granted to {}", request.role, user.username);
            Ok(MSG_ADD_ROLE_FAILED.to_string())
        }
    }

    /// `add_role` addressed by email, for the `grant-role` command
    pub async fn grant_role_by_email(&self, email: &str, role: &str) -> Result<String> {
        let Some(user) = self.store.find_by_email(email).await? else {
            return Ok(MSG_INVALID_USER_OR_ROLE.to_string());
        };
        self.add_role(AddRoleRequest {
            user_id: user.id,
            role: role.to_string(),
        })
        .await
    }
}
