//! # Web API Request Handlers
//!
//! Handlers extract the request, call one service and shape the response.

pub mod admin;
pub mod auth;
pub mod health;
pub mod progress;
pub mod roadmap;
pub mod team;
pub mod user;
