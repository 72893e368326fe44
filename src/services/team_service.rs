//! Team-wide aggregates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::UserOut;
use crate::constants::{direction_title, ProgressStatus};
use crate::error::Result;
use crate::storage::RoadmapStore;

const TOP_LEARNERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub total_users: i64,
    pub total_xp: i64,
    pub average_xp: f64,
    pub users_by_role: BTreeMap<String, i64>,
    pub completed_nodes: i64,
    pub top_learners: Vec<UserOut>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionOut {
    pub direction: String,
    pub title: String,
    pub node_count: i64,
    pub checkpoint_count: i64,
}

#[derive(Clone, Debug)]
pub struct TeamService {
    store: Arc<dyn RoadmapStore>,
}

impl TeamService {
    pub fn new(store: Arc<dyn RoadmapStore>) -> Self {
        Self { store }
    }

    pub async fn stats(&self) -> Result<TeamStats> {
        let (mut users, progress) =
            tokio::try_join!(self.store.list_users(), self.store.list_progress())?;

        let total_users = users.len() as i64;
        let total_xp: i64 = users.iter().map(|u| u.xp).sum();
        let average_xp = if total_users == 0 {
            0.0
        } else {
            round_to(total_xp as f64 / total_users as f64, 2)
        };

        let mut users_by_role = BTreeMap::new();
        for user in &users {
            *users_by_role.entry(user.role.clone()).or_insert(0) += 1;
        }

        let completed_nodes = progress
            .iter()
            .filter(|p| p.status == ProgressStatus::Completed)
            .count() as i64;

        users.sort_by(|a, b| b.xp.cmp(&a.xp).then(a.id.cmp(&b.id)));
        let top_learners = users.iter().take(TOP_LEARNERS).map(UserOut::from).collect();

        Ok(TeamStats {
            total_users,
            total_xp,
            average_xp,
            users_by_role,
            completed_nodes,
            top_learners,
        })
    }

    /// One entry per direction, alphabetical
    pub async fn professions(&self) -> Result<Vec<ProfessionOut>> {
        let nodes = self.store.list_nodes(None).await?;
        let mut by_direction: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for node in &nodes {
            let entry = by_direction.entry(node.direction.clone()).or_default();
            entry.0 += 1;
            if node.checkpoint {
                entry.1 += 1;
            }
        }

        Ok(by_direction
            .into_iter()
            .map(|(direction, (node_count, checkpoint_count))| ProfessionOut {
                title: direction_title(&direction),
                direction,
                node_count,
                checkpoint_count,
            })
            .collect())
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
