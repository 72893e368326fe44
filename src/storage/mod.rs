//! # Storage Abstraction
//!
//! [`RoadmapStore`] is the seam between the services and persistence. Two
//! backends implement it:
//!
//! - [`PgStore`] - PostgreSQL through SQLx, composing the queries in [`crate::models`]
//! - [`MemoryStore`] - process-local maps behind a lock, for tests and demo mode
//!
//! Both backends enforce the same invariants: unique user emails, unique
//! edges and blocks, cascading deletes of nodes, acyclic relations and atomic
//! progress writes. Relation cycle checks and XP awards run inside the same
//! unit of work as the write they guard.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::config::{AppConfig, StorageBackend};
use crate::constants::ProgressStatus;
use crate::error::{Result, RoadmapError};
use crate::graph::RoadmapGraph;
use crate::models::{
    NewNodeBlock, NewRoadmapNode, NewUser, NodeBlock, NodeEdge, Progress, RoadmapNode, User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Row counts reported by `roadmap status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct StoreCounts {
    pub nodes: i64,
    pub users: i64,
    pub progress: i64,
}

/// A learner's status change together with the XP it is worth on completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressWrite {
    pub user_id: i64,
    pub node_id: i64,
    pub status: ProgressStatus,
    pub score: i32,
    pub completion_reward: i64,
}

/// Saved row, the user after any award, and what the write earned
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub progress: Progress,
    pub user: User,
    pub xp_awarded: i64,
    pub new_badges: Vec<String>,
}

/// Persistence operations needed by the platform services.
///
/// Relation IDs passed to `create_node`/`update_node` are expected to exist;
/// the store rejects relations that would close a loop.
#[async_trait]
pub trait RoadmapStore: Send + Sync + std::fmt::Debug {
    /// Cheap round-trip used by health checks
    async fn ping(&self) -> Result<()>;

    // ========== Users ==========

    /// Fails with `Conflict` when the email is taken
    async fn create_user(&self, new_user: NewUser) -> Result<User>;
    async fn find_user(&self, id: i64) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
    /// `false` when the user is missing
    async fn update_password_hash(&self, user_id: i64, password_hash: &str) -> Result<bool>;
    /// Sets the profession when given and shallow-merges `preferences` into
    /// the stored object; `None` when the user is missing
    async fn update_settings(
        &self,
        user_id: i64,
        profession: Option<&str>,
        preferences: Option<&serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Option<User>>;

    // ========== Nodes ==========

    /// Fails with `BadRequest` when a relation would close a loop
    async fn create_node(
        &self,
        fields: &NewRoadmapNode,
        parent_ids: &[i64],
        blocking_node_ids: &[i64],
    ) -> Result<RoadmapNode>;

    /// Replaces fields, parents and blockers; `None` when the node is missing.
    /// Fails with `BadRequest` when a relation would close a loop.
    async fn update_node(
        &self,
        id: i64,
        fields: &NewRoadmapNode,
        parent_ids: &[i64],
        blocking_node_ids: &[i64],
    ) -> Result<Option<RoadmapNode>>;

    /// Removes the node with its edges, blocks and progress rows
    async fn delete_node(&self, id: i64) -> Result<bool>;
    async fn find_node(&self, id: i64) -> Result<Option<RoadmapNode>>;
    async fn find_nodes(&self, ids: &[i64]) -> Result<Vec<RoadmapNode>>;
    /// Ordered by direction, `order_index`, then id
    async fn list_nodes(&self, direction: Option<&str>) -> Result<Vec<RoadmapNode>>;
    async fn directions(&self) -> Result<Vec<String>>;

    // ========== Relations ==========

    async fn add_edge(&self, edge: NodeEdge) -> Result<()>;
    async fn list_edges(&self) -> Result<Vec<NodeEdge>>;
    /// Fails with `Conflict` when the pair already exists and `BadRequest`
    /// when it would close a loop of blocks
    async fn create_block(&self, new_block: NewNodeBlock) -> Result<NodeBlock>;
    async fn delete_block(&self, id: i64) -> Result<bool>;
    async fn list_blocks(&self) -> Result<Vec<NodeBlock>>;

    // ========== Progress ==========

    async fn list_progress_for_user(&self, user_id: i64) -> Result<Vec<Progress>>;
    async fn list_progress(&self) -> Result<Vec<Progress>>;
    /// Upserts a row as given, without touching the user
    async fn save_progress(&self, progress: &Progress) -> Result<Progress>;
    /// Upserts the row and, on the first transition into `completed`, awards
    /// the reward to the user. The previous status is read and the award is
    /// written in one unit of work, so a completion pays out at most once.
    async fn record_progress(&self, write: ProgressWrite) -> Result<ProgressRecord>;

    // ========== Maintenance ==========

    async fn counts(&self) -> Result<StoreCounts>;
    /// Removes progress, users, blocks, edges and nodes
    async fn clear(&self) -> Result<()>;
}

/// Build the store selected by configuration
pub async fn create_store(config: &AppConfig) -> Result<Arc<dyn RoadmapStore>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let store = PgStore::connect(&config.database).await?;
            if config.database.run_migrations {
                store.migrate().await?;
            }
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

/// XP and badges earned by moving from `previous` to the written status
pub(crate) fn completion_award(
    previous: Option<ProgressStatus>,
    write: &ProgressWrite,
    user: &mut User,
) -> (i64, Vec<String>) {
    if write.status != ProgressStatus::Completed || previous == Some(ProgressStatus::Completed) {
        return (0, Vec::new());
    }
    let new_badges = user.award_xp(write.completion_reward);
    (write.completion_reward.max(0), new_badges)
}

/// Reject parents or blockers of `node_id` that would close a loop in the
/// current relations. Every new relation points into `node_id`, so only paths
/// leaving it matter and its existing incoming relations need no filtering.
pub(crate) fn check_acyclic(
    edges: &[NodeEdge],
    blocks: &[NodeBlock],
    node_id: i64,
    parent_ids: &[i64],
    blocking_node_ids: &[i64],
) -> Result<()> {
    let graph = RoadmapGraph::from_relations(edges, blocks);
    if let Some(parent_id) = parent_ids
        .iter()
        .find(|parent_id| graph.would_create_cycle(**parent_id, node_id))
    {
        return Err(RoadmapError::bad_request(format!(
            "Parent {parent_id} would create a cycle"
        )));
    }
    if let Some(blocking_id) = blocking_node_ids
        .iter()
        .find(|blocking_id| graph.would_create_block_cycle(**blocking_id, node_id))
    {
        return Err(RoadmapError::bad_request(format!(
            "Blocking node {blocking_id} would create a blocking cycle"
        )));
    }
    Ok(())
}
