//! Learner progress and XP accounting.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::RoadmapService;
use crate::constants::{xp, ProgressStatus};
use crate::error::{Result, RoadmapError};
use crate::logging::log_progress_operation;
use crate::models::{Progress, User};
use crate::storage::{ProgressWrite, RoadmapStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub node_id: i64,
    pub status: ProgressStatus,
    #[serde(default)]
    pub score: i32,
}

/// Saved progress row plus the reward it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdateOut {
    #[serde(flatten)]
    pub progress: Progress,
    pub xp_awarded: i64,
    pub total_xp: i64,
    pub new_badges: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ProgressService {
    store: Arc<dyn RoadmapStore>,
    roadmap: RoadmapService,
    enforce_blocking: bool,
}

impl ProgressService {
    pub fn new(
        store: Arc<dyn RoadmapStore>,
        roadmap: RoadmapService,
        enforce_blocking: bool,
    ) -> Self {
        Self {
            store,
            roadmap,
            enforce_blocking,
        }
    }

    pub async fn update(&self, user: &User, update: ProgressUpdate) -> Result<ProgressUpdateOut> {
        let node = self
            .store
            .find_node(update.node_id)
            .await?
            .ok_or_else(|| RoadmapError::not_found("Node not found"))?;

        if self.enforce_blocking && update.status.is_engaged() {
            let availability = self.roadmap.node_availability(node.id, user.id).await?;
            if !availability.blocking_nodes.is_empty() {
                let titles: Vec<&str> = availability
                    .blocking_nodes
                    .iter()
                    .map(|n| n.title.as_str())
                    .collect();
                return Err(RoadmapError::conflict(format!(
                    "Node is blocked by: {}",
                    titles.join(", ")
                )));
            }
        }

        // The store decides whether this is the first completion inside the
        // same unit of work that pays the reward
        let record = self
            .store
            .record_progress(ProgressWrite {
                user_id: user.id,
                node_id: node.id,
                status: update.status,
                score: update.score,
                completion_reward: xp::completion_reward(node.checkpoint, update.score),
            })
            .await?;
        log_progress_operation(
            record.user.id,
            node.id,
            record.progress.status,
            record.xp_awarded,
            &record.new_badges,
        );

        Ok(ProgressUpdateOut {
            total_xp: record.user.xp,
            progress: record.progress,
            xp_awarded: record.xp_awarded,
            new_badges: record.new_badges,
        })
    }

    /// All progress rows of the user ordered by node id
    pub async fn mine(&self, user: &User) -> Result<Vec<Progress>> {
        self.store.list_progress_for_user(user.id).await
    }
}
