//! # Service Layer
//!
//! Business logic separate from web handlers:
//!
//! - **Handlers**: request extraction, permission checks, response formatting
//! - **Services**: validation, graph rules, XP accounting, aggregation
//!
//! Every service works against [`crate::storage::RoadmapStore`], so the same
//! code runs on PostgreSQL and on the in-memory store.

mod auth_service;
mod corporate_service;
mod progress_service;
mod roadmap_service;
mod team_service;
mod user_settings_service;

pub use auth_service::{AuthService, LoginRequest, RegisterRequest, Token, UserOut};
pub use corporate_service::{CorporateDashboard, CorporateService, DirectionSummary};
pub use progress_service::{ProgressService, ProgressUpdate, ProgressUpdateOut};
pub use roadmap_service::{AvailabilityOut, BlockInput, NodeInput, RoadmapService};
pub use team_service::{ProfessionOut, TeamService, TeamStats};
pub use user_settings_service::{UserSettings, UserSettingsService, UserSettingsUpdate};
