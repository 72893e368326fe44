//! # Web Application State
//!
//! Shared state handed to every handler. Services are cheap to clone and all
//! share the same store handle.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    AuthService, CorporateService, ProgressService, RoadmapService, TeamService,
    UserSettingsService,
};
use crate::storage::RoadmapStore;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn RoadmapStore>,
    pub auth: AuthService,
    pub roadmap: RoadmapService,
    pub progress: ProgressService,
    pub team: TeamService,
    pub corporate: CorporateService,
    pub settings: UserSettingsService,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn RoadmapStore>) -> Self {
        let roadmap = RoadmapService::new(store.clone(), config.web.max_tree_depth);
        Self {
            auth: AuthService::new(store.clone(), &config.auth),
            progress: ProgressService::new(
                store.clone(),
                roadmap.clone(),
                config.progress.enforce_blocking,
            ),
            team: TeamService::new(store.clone()),
            corporate: CorporateService::new(store.clone()),
            settings: UserSettingsService::new(store.clone()),
            roadmap,
            store,
            config,
        }
    }
}
