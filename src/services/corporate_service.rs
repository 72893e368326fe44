//! Organisation-level learning dashboard.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use super::team_service::round_to;
use crate::constants::ProgressStatus;
use crate::error::Result;
use crate::storage::RoadmapStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionSummary {
    pub direction: String,
    pub node_count: i64,
    pub completions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorporateDashboard {
    pub total_users: i64,
    /// Users with at least one started or completed node
    pub active_learners: i64,
    pub total_nodes: i64,
    /// Completed rows over users times active nodes
    pub completion_rate: f64,
    pub directions: Vec<DirectionSummary>,
    pub badge_distribution: BTreeMap<String, i64>,
}

#[derive(Clone, Debug)]
pub struct CorporateService {
    store: Arc<dyn RoadmapStore>,
}

impl CorporateService {
    pub fn new(store: Arc<dyn RoadmapStore>) -> Self {
        Self { store }
    }

    pub async fn dashboard(&self) -> Result<CorporateDashboard> {
        let (users, nodes, progress) = tokio::try_join!(
            self.store.list_users(),
            self.store.list_nodes(None),
            self.store.list_progress()
        )?;

        let active_learners = progress
            .iter()
            .filter(|p| p.status.is_engaged())
            .map(|p| p.user_id)
            .collect::<HashSet<_>>()
            .len() as i64;

        let total_users = users.len() as i64;
        let active_nodes = nodes.iter().filter(|n| n.is_active).count() as i64;
        let completed_rows = progress
            .iter()
            .filter(|p| p.status == ProgressStatus::Completed)
            .count() as i64;
        let completion_rate = if total_users == 0 || active_nodes == 0 {
            0.0
        } else {
            round_to(completed_rows as f64 / (total_users * active_nodes) as f64, 4)
        };

        let node_direction: HashMap<i64, &str> =
            nodes.iter().map(|n| (n.id, n.direction.as_str())).collect();
        let mut summaries: BTreeMap<&str, DirectionSummary> = BTreeMap::new();
        for node in &nodes {
            summaries
                .entry(node.direction.as_str())
                .or_insert_with(|| DirectionSummary {
                    direction: node.direction.clone(),
                    node_count: 0,
                    completions: 0,
                })
                .node_count += 1;
        }
        for row in progress.iter().filter(|p| p.status == ProgressStatus::Completed) {
            if let Some(summary) = node_direction
                .get(&row.node_id)
                .and_then(|d| summaries.get_mut(d))
            {
                summary.completions += 1;
            }
        }

        let mut badge_distribution = BTreeMap::new();
        for badge in users.iter().flat_map(|u| u.badges.iter()) {
            *badge_distribution.entry(badge.clone()).or_insert(0) += 1;
        }

        Ok(CorporateDashboard {
            total_users,
            active_learners,
            total_nodes: nodes.len() as i64,
            completion_rate,
            directions: summaries.into_values().collect(),
            badge_distribution,
        })
    }
}
