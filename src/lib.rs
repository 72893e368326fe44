#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Roadmap Platform
//!
//! Backend for a gamified developer-skills roadmap: learning nodes grouped by
//! direction, a parent/child hierarchy plus "must complete first" blocking
//! relations, per-user progress, XP and badges, and team dashboards.
//!
//! ## Module Organization
//!
//! - [`graph`] - In-memory roadmap graph: bounded, cycle-safe serialization,
//!   cycle checks, dependency and availability queries
//! - [`models`] - Rows of the roadmap, user and progress tables
//! - [`storage`] - [`storage::RoadmapStore`] with PostgreSQL and in-memory backends
//! - [`services`] - Business rules used by the HTTP handlers
//! - [`auth`] - Password hashing and JWT bearer tokens
//! - [`seed`] - Demo data loading, clearing and export
//! - [`web`] - Axum REST API
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use roadmap_platform::config::AppConfig;
//! use roadmap_platform::storage::create_store;
//! use roadmap_platform::web::{create_app, AppState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(AppConfig::for_testing());
//! let store = create_store(&config).await?;
//! let app = create_app(AppState::new(config, store));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod graph;
pub mod logging;
pub mod models;
pub mod seed;
pub mod services;
pub mod storage;
pub mod web;

pub use config::{AppConfig, ConfigManager};
pub use constants::{NodeType, ProgressStatus};
pub use error::{Result, RoadmapError};
pub use graph::{NodeRef, NodeTree, RoadmapGraph};
pub use storage::{MemoryStore, PgStore, RoadmapStore};
