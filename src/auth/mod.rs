//! # Authentication Primitives
//!
//! Password hashing and bearer tokens. Request handling lives in
//! [`crate::web::extractors`]; account workflows live in
//! [`crate::services::AuthService`].

use thiserror::Error;

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtAuthenticator};
pub use password::PasswordHasher;

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthFormat,

    #[error("Invalid token")]
    InvalidToken,

    #[error("JWT processing error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    HashingError(String),
}
