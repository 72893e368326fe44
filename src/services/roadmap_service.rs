//! Roadmap reads and administration.
//!
//! Every operation loads a fresh [`RoadmapGraph`] from the store. Relation
//! changes are validated against that graph first for precise messages; the
//! store repeats the cycle check inside the write itself, so concurrent admin
//! edits cannot commit a loop either.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::constants::{NodeType, ProgressStatus};
use crate::error::{Result, RoadmapError};
use crate::graph::{NodeRef, NodeTree, RoadmapGraph};
use crate::logging::log_admin_operation;
use crate::models::{NewNodeBlock, NewRoadmapNode, NodeBlock, NodeEdge};
use crate::storage::RoadmapStore;

/// Admin payload for creating or fully replacing a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub direction: String,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub checkpoint: bool,
    #[serde(default)]
    pub node_type: NodeType,
    #[serde(default = "default_true")]
    pub is_required: bool,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub parent_ids: Vec<i64>,
    #[serde(default)]
    pub blocking_node_ids: Vec<i64>,
}

fn default_true() -> bool {
    true
}

impl NodeInput {
    pub fn new(direction: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            direction: direction.into(),
            resources: Vec::new(),
            checkpoint: false,
            node_type: NodeType::Task,
            is_required: true,
            order_index: 0,
            is_active: true,
            parent_ids: Vec::new(),
            blocking_node_ids: Vec::new(),
        }
    }

    fn fields(&self) -> Result<NewRoadmapNode> {
        let title = self.title.trim();
        let direction = self.direction.trim();
        if title.is_empty() {
            return Err(RoadmapError::bad_request("Title must not be empty"));
        }
        if direction.is_empty() {
            return Err(RoadmapError::bad_request("Direction must not be empty"));
        }
        Ok(NewRoadmapNode {
            direction: direction.to_string(),
            title: title.to_string(),
            description: self.description.clone(),
            resources: self.resources.clone(),
            checkpoint: self.checkpoint,
            node_type: self.node_type,
            is_required: self.is_required,
            order_index: self.order_index,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlockInput {
    pub blocking_node_id: i64,
    pub blocked_node_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityOut {
    pub node_id: i64,
    pub user_id: i64,
    pub available: bool,
    pub blocking_nodes: Vec<NodeRef>,
}

#[derive(Clone, Debug)]
pub struct RoadmapService {
    store: Arc<dyn RoadmapStore>,
    max_depth: usize,
}

impl RoadmapService {
    pub fn new(store: Arc<dyn RoadmapStore>, max_depth: usize) -> Self {
        Self { store, max_depth }
    }

    /// Load the current roadmap graph
    pub async fn graph(&self) -> Result<RoadmapGraph> {
        let (nodes, edges, blocks) = tokio::try_join!(
            self.store.list_nodes(None),
            self.store.list_edges(),
            self.store.list_blocks()
        )?;
        Ok(RoadmapGraph::build(nodes, &edges, &blocks))
    }

    pub async fn directions(&self) -> Result<Vec<String>> {
        self.store.directions().await
    }

    pub async fn all_nodes(&self) -> Result<Vec<NodeTree>> {
        self.nodes_of(None).await
    }

    pub async fn nodes_by_direction(&self, direction: &str) -> Result<Vec<NodeTree>> {
        self.nodes_of(Some(direction)).await
    }

    pub async fn node(&self, id: i64) -> Result<NodeTree> {
        self.graph()
            .await?
            .serialize(id, self.max_depth)
            .ok_or_else(node_not_found)
    }

    /// Nodes in request order; unknown ids are skipped
    pub async fn nodes_by_ids(&self, ids: &[i64]) -> Result<Vec<NodeTree>> {
        let graph = self.graph().await?;
        Ok(ids
            .iter()
            .filter_map(|id| graph.serialize(*id, self.max_depth))
            .collect())
    }

    /// Nested forest of one direction; the requested depth is capped by configuration
    pub async fn tree(&self, direction: &str, max_depth: Option<usize>) -> Result<Vec<NodeTree>> {
        let depth = max_depth.map_or(self.max_depth, |d| d.min(self.max_depth));
        let graph = self.graph().await?;
        debug!(direction = %direction, depth = depth, "Serializing roadmap tree");
        Ok(graph.forest(Some(direction), depth))
    }

    pub async fn create_node(&self, input: NodeInput) -> Result<NodeTree> {
        let fields = input.fields()?;
        let graph = self.graph().await?;
        let parent_ids = dedup(&input.parent_ids);
        let blocking_node_ids = dedup(&input.blocking_node_ids);
        require_existing(&graph, &parent_ids, "Parent")?;
        require_existing(&graph, &blocking_node_ids, "Blocking")?;

        let node = self
            .store
            .create_node(&fields, &parent_ids, &blocking_node_ids)
            .await?;
        log_admin_operation("create_node", Some(node.id), Some(&node.title));
        self.node(node.id).await
    }

    /// Replace fields, parents and blockers of a node
    pub async fn update_node(&self, id: i64, input: NodeInput) -> Result<NodeTree> {
        let fields = input.fields()?;
        if self.store.find_node(id).await?.is_none() {
            return Err(node_not_found());
        }

        // Validate against the graph without the relations being replaced
        let (nodes, edges, blocks) = tokio::try_join!(
            self.store.list_nodes(None),
            self.store.list_edges(),
            self.store.list_blocks()
        )?;
        let edges: Vec<NodeEdge> = edges.into_iter().filter(|e| e.child_id != id).collect();
        let blocks: Vec<NodeBlock> = blocks
            .into_iter()
            .filter(|b| b.blocked_node_id != id)
            .collect();
        let graph = RoadmapGraph::build(nodes, &edges, &blocks);

        let parent_ids = dedup(&input.parent_ids);
        let blocking_node_ids = dedup(&input.blocking_node_ids);
        require_existing(&graph, &parent_ids, "Parent")?;
        require_existing(&graph, &blocking_node_ids, "Blocking")?;

        for parent_id in &parent_ids {
            if *parent_id == id {
                return Err(RoadmapError::bad_request("Node cannot be its own parent"));
            }
            if graph.would_create_cycle(*parent_id, id) {
                return Err(RoadmapError::bad_request(format!(
                    "Parent {parent_id} would create a cycle"
                )));
            }
        }
        for blocking_id in &blocking_node_ids {
            if *blocking_id == id {
                return Err(RoadmapError::bad_request("Node cannot block itself"));
            }
            if graph.would_create_block_cycle(*blocking_id, id) {
                return Err(RoadmapError::bad_request(format!(
                    "Blocking node {blocking_id} would create a blocking cycle"
                )));
            }
        }

        self.store
            .update_node(id, &fields, &parent_ids, &blocking_node_ids)
            .await?
            .ok_or_else(node_not_found)?;
        log_admin_operation("update_node", Some(id), None);
        self.node(id).await
    }

    pub async fn delete_node(&self, id: i64) -> Result<()> {
        if !self.store.delete_node(id).await? {
            return Err(node_not_found());
        }
        log_admin_operation("delete_node", Some(id), None);
        Ok(())
    }

    /// Transitive blockers, nearest first
    pub async fn node_dependencies(&self, id: i64) -> Result<Vec<NodeTree>> {
        let graph = self.graph().await?;
        if !graph.contains(id) {
            return Err(node_not_found());
        }
        Ok(graph
            .dependencies(id)
            .into_iter()
            .filter_map(|dep| graph.serialize(dep, self.max_depth))
            .collect())
    }

    pub async fn node_availability(&self, node_id: i64, user_id: i64) -> Result<AvailabilityOut> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(RoadmapError::not_found("User not found"));
        }
        let graph = self.graph().await?;
        let completed = self.completed_nodes(user_id).await?;
        let availability = graph
            .availability(node_id, &completed)
            .ok_or_else(node_not_found)?;

        Ok(AvailabilityOut {
            node_id,
            user_id,
            available: availability.available,
            blocking_nodes: availability.blocking_nodes,
        })
    }

    pub async fn create_block(&self, input: BlockInput) -> Result<NodeBlock> {
        let BlockInput {
            blocking_node_id,
            blocked_node_id,
        } = input;
        if blocking_node_id == blocked_node_id {
            return Err(RoadmapError::bad_request("Node cannot block itself"));
        }
        let graph = self.graph().await?;
        require_existing(&graph, &[blocking_node_id, blocked_node_id], "Block")?;
        if graph.blockers(blocked_node_id).contains(&blocking_node_id) {
            return Err(RoadmapError::bad_request("Block already exists"));
        }
        if graph.would_create_block_cycle(blocking_node_id, blocked_node_id) {
            return Err(RoadmapError::bad_request("Block would create a blocking cycle"));
        }

        let block = self
            .store
            .create_block(NewNodeBlock {
                blocking_node_id,
                blocked_node_id,
            })
            .await
            .map_err(|e| match e {
                RoadmapError::Conflict(message) => RoadmapError::BadRequest(message),
                other => other,
            })?;
        log_admin_operation("create_block", Some(blocked_node_id), None);
        Ok(block)
    }

    pub async fn delete_block(&self, id: i64) -> Result<()> {
        if !self.store.delete_block(id).await? {
            return Err(RoadmapError::not_found("Block not found"));
        }
        log_admin_operation("delete_block", None, Some(&id.to_string()));
        Ok(())
    }

    /// IDs of nodes the user has completed
    pub async fn completed_nodes(&self, user_id: i64) -> Result<HashSet<i64>> {
        Ok(self
            .store
            .list_progress_for_user(user_id)
            .await?
            .into_iter()
            .filter(|p| p.status == ProgressStatus::Completed)
            .map(|p| p.node_id)
            .collect())
    }

    async fn nodes_of(&self, direction: Option<&str>) -> Result<Vec<NodeTree>> {
        let graph = self.graph().await?;
        let ids: Vec<i64> = self
            .store
            .list_nodes(direction)
            .await?
            .into_iter()
            .map(|n| n.id)
            .collect();
        Ok(ids
            .into_iter()
            .filter_map(|id| graph.serialize(id, self.max_depth))
            .collect())
    }
}

fn node_not_found() -> RoadmapError {
    RoadmapError::not_found("Node not found")
}

fn dedup(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn require_existing(graph: &RoadmapGraph, ids: &[i64], label: &str) -> Result<()> {
    match ids.iter().find(|id| !graph.contains(**id)) {
        Some(missing) => Err(RoadmapError::bad_request(format!(
            "{label} node {missing} does not exist"
        ))),
        None => Ok(()),
    }
}
