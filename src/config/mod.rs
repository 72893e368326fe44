//! # Roadmap Platform Configuration
//!
//! Layered configuration: compiled defaults, then `config/roadmap.toml`, then
//! `config/roadmap.{environment}.toml`, then `ROADMAP__*` environment variables.
//! `DATABASE_URL` always wins for the database connection string.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roadmap_platform::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let bind = &manager.config().web.bind_address;
//! let pool = manager.config().database.max_connections;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// JWT secret shipped for local development; rejected in production
pub const DEVELOPMENT_JWT_SECRET: &str = "dev-secret-change-in-production";

/// Root configuration structure mirroring `config/roadmap.toml`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: String,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub web: WebConfig,
    pub progress: ProgressConfig,
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            web: WebConfig::default(),
            progress: ProgressConfig::default(),
            seed: SeedConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Database connection and pooling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    /// Apply embedded migrations when the server starts
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/roadmap_development".to_string(),
            max_connections: 10,
            acquire_timeout_seconds: 5,
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

/// Which store implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_exp_seconds: u64,
    /// Salt used by the legacy SHA-256 password scheme
    pub legacy_password_salt: String,
    /// Roles allowed to use the admin roadmap endpoints
    pub admin_roles: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            jwt_exp_seconds: 60 * 60 * 24,
            legacy_password_salt: "salt".to_string(),
            admin_roles: vec!["admin".to_string(), "lead".to_string()],
        }
    }
}

impl AuthConfig {
    pub fn is_admin_role(&self, role: &str) -> bool {
        self.admin_roles.iter().any(|r| r == role)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind_address: String,
    pub request_timeout_ms: u64,
    /// Empty means any origin
    pub cors_origins: Vec<String>,
    /// Depth bound for nested node output
    pub max_tree_depth: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_ms: 30_000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            max_tree_depth: crate::constants::DEFAULT_MAX_DEPTH,
        }
    }
}

impl WebConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Reject starting or completing a node whose blockers are not completed
    pub enforce_blocking: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enforce_blocking: true,
        }
    }
}

/// Demo data loading
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed an empty store when the server starts
    pub on_startup: bool,
    pub roadmap_file: Option<String>,
    pub users_file: Option<String>,
    pub progress_file: Option<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            on_startup: true,
            roadmap_file: None,
            users_file: None,
            progress_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Overrides the environment default when set; `RUST_LOG` overrides both
    pub level: Option<String>,
    pub json_file: bool,
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            json_file: false,
            log_dir: "log".to_string(),
        }
    }
}

impl AppConfig {
    /// Configuration suitable for in-process tests: memory store, no seeding
    pub fn for_testing() -> Self {
        Self {
            environment: "test".to_string(),
            storage: StorageConfig {
                backend: StorageBackend::Memory,
            },
            seed: SeedConfig {
                on_startup: false,
                ..SeedConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "jwt_secret",
                "auth",
            ));
        }
        if self.auth.jwt_exp_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "jwt_exp_seconds",
                "0",
                "token lifetime must be positive",
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "max_connections",
                "0",
                "pool must allow at least one connection",
            ));
        }
        if self.web.max_tree_depth == 0 {
            return Err(ConfigurationError::invalid_value(
                "max_tree_depth",
                "0",
                "depth bound must be positive",
            ));
        }
        if self.is_production() && self.auth.jwt_secret == DEVELOPMENT_JWT_SECRET {
            return Err(ConfigurationError::validation_error(
                "the development JWT secret cannot be used in production",
            ));
        }
        Ok(())
    }
}
