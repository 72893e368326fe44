//! # Web API Integration Tests
//!
//! - Health and middleware behaviour
//! - Registration, login and token handling
//! - Public roadmap reads and nested serialization
//! - Progress updates, XP and badges
//! - Admin roadmap management and authorization
//! - Team, corporate and settings endpoints

pub mod admin_tests;
pub mod auth_tests;
pub mod health_tests;
pub mod progress_tests;
pub mod roadmap_tests;
pub mod team_tests;
