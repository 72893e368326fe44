//! Account registration, login and token resolution.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::{JwtAuthenticator, PasswordHasher};
use crate::config::AuthConfig;
use crate::constants::{DEFAULT_ROLE, MIN_PASSWORD_LENGTH};
use crate::error::{Result, RoadmapError};
use crate::models::{NewUser, User};
use crate::storage::RoadmapStore;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub xp: i64,
    pub badges: Vec<String>,
}

impl From<&User> for UserOut {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            xp: user.xp,
            badges: user.badges.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthService {
    store: Arc<dyn RoadmapStore>,
    hasher: PasswordHasher,
    authenticator: JwtAuthenticator,
    /// Roles that can only be granted through seed data, never at registration
    admin_roles: Vec<String>,
}

impl AuthService {
    pub fn new(store: Arc<dyn RoadmapStore>, config: &AuthConfig) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(config.legacy_password_salt.clone()),
            authenticator: JwtAuthenticator::from_config(config),
            admin_roles: config.admin_roles.clone(),
        }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn authenticator(&self) -> &JwtAuthenticator {
        &self.authenticator
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        let email = normalize_email(&request.email)?;
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(RoadmapError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let role = match request.role.as_deref().map(str::trim) {
            Some(role) if !role.is_empty() => role.to_string(),
            _ => DEFAULT_ROLE.to_string(),
        };
        if self.admin_roles.contains(&role) {
            return Err(RoadmapError::forbidden(format!(
                "Role '{role}' cannot be self-assigned"
            )));
        }

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(RoadmapError::bad_request("Email already registered"));
        }

        let new_user = NewUser {
            email,
            password_hash: self.hasher.hash(&request.password)?,
            role,
            xp: 0,
            badges: Vec::new(),
        };

        let user = self.store.create_user(new_user).await.map_err(|e| match e {
            RoadmapError::Conflict(_) => RoadmapError::bad_request("Email already registered"),
            other => other,
        })?;

        info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Verify credentials and issue a token; legacy hashes are upgraded on success
    pub async fn login(&self, request: LoginRequest) -> Result<Token> {
        let email = request.email.trim().to_lowercase();
        let Some(user) = self.store.find_user_by_email(&email).await? else {
            debug!("Login attempt for unknown email");
            return Err(RoadmapError::unauthorized(INVALID_CREDENTIALS));
        };

        if !self.hasher.verify(&request.password, &user.password_hash) {
            debug!(user_id = user.id, "Login attempt with wrong password");
            return Err(RoadmapError::unauthorized(INVALID_CREDENTIALS));
        }

        if self.hasher.needs_rehash(&user.password_hash) {
            let password_hash = self.hasher.hash(&request.password)?;
            self.store.update_password_hash(user.id, &password_hash).await?;
            info!(user_id = user.id, "Upgraded legacy password hash");
        }

        let access_token = self.authenticator.generate_token(user.id, &user.role)?;
        Ok(Token {
            access_token,
            token_type: "bearer".to_string(),
        })
    }

    /// Resolve a bearer token to its user
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.authenticator.validate_token(token)?;
        let user_id = claims.user_id()?;
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| RoadmapError::unauthorized("User not found"))
    }
}

/// Trim and lowercase an email after a structural check
fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    let invalid = || RoadmapError::validation("Invalid email address");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let valid_domain = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..");
    if !valid_domain {
        return Err(invalid());
    }
    Ok(email)
}
