//! Error types for the roadmap platform.

use thiserror::Error;

use crate::config::ConfigurationError;

#[derive(Debug, Error)]
pub enum RoadmapError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoadmapError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Client errors are caused by the request and never indicate store health.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_)
                | Self::Configuration(_)
                | Self::Serialization(_)
                | Self::Io(_)
                | Self::Internal(_)
        )
    }
}

impl From<sqlx::Error> for RoadmapError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RoadmapError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RoadmapError::Conflict(db_err.message().to_string())
            }
            _ => RoadmapError::Database(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for RoadmapError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        RoadmapError::Database(format!("Migration failed: {err}"))
    }
}

impl From<serde_json::Error> for RoadmapError {
    fn from(err: serde_json::Error) -> Self {
        RoadmapError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for RoadmapError {
    fn from(err: std::io::Error) -> Self {
        RoadmapError::Io(err.to_string())
    }
}

impl From<crate::auth::AuthError> for RoadmapError {
    fn from(err: crate::auth::AuthError) -> Self {
        use crate::auth::AuthError;
        match err {
            AuthError::HashingError(message) => RoadmapError::Internal(message),
            AuthError::JwtError(_) | AuthError::InvalidToken => {
                RoadmapError::Unauthorized("Invalid token".to_string())
            }
            other => RoadmapError::Unauthorized(other.to_string()),
        }
    }
}

impl From<ConfigurationError> for RoadmapError {
    fn from(err: ConfigurationError) -> Self {
        RoadmapError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RoadmapError>;
