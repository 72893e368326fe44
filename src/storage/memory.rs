//! In-memory backend used by tests and the `memory` storage mode.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

use super::{
    check_acyclic, completion_award, ProgressRecord, ProgressWrite, RoadmapStore, StoreCounts,
};
use crate::error::{Result, RoadmapError};
use crate::models::{
    NewNodeBlock, NewRoadmapNode, NewUser, NodeBlock, NodeEdge, Progress, RoadmapNode, User,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    nodes: BTreeMap<i64, RoadmapNode>,
    edges: BTreeSet<(i64, i64)>,
    blocks: BTreeMap<i64, NodeBlock>,
    progress: BTreeMap<(i64, i64), Progress>,
    next_user_id: i64,
    next_node_id: i64,
    next_block_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn insert_block(&mut self, new_block: NewNodeBlock) -> Result<NodeBlock> {
        let duplicate = self.blocks.values().any(|b| {
            b.blocking_node_id == new_block.blocking_node_id
                && b.blocked_node_id == new_block.blocked_node_id
        });
        if duplicate {
            return Err(RoadmapError::conflict("Block already exists"));
        }
        let block = NodeBlock {
            id: Self::next_id(&mut self.next_block_id),
            blocking_node_id: new_block.blocking_node_id,
            blocked_node_id: new_block.blocked_node_id,
            created_at: Utc::now(),
        };
        self.blocks.insert(block.id, block.clone());
        Ok(block)
    }

    fn ensure_acyclic(
        &self,
        node_id: i64,
        parent_ids: &[i64],
        blocking_node_ids: &[i64],
    ) -> Result<()> {
        let edges: Vec<NodeEdge> = self
            .edges
            .iter()
            .map(|(parent, child)| NodeEdge::new(*parent, *child))
            .collect();
        let blocks: Vec<NodeBlock> = self.blocks.values().cloned().collect();
        check_acyclic(&edges, &blocks, node_id, parent_ids, blocking_node_ids)
    }

    fn write_relations(
        &mut self,
        node_id: i64,
        parent_ids: &[i64],
        blocking_node_ids: &[i64],
    ) -> Result<()> {
        for parent_id in parent_ids {
            self.edges.insert((*parent_id, node_id));
        }
        for blocking_node_id in blocking_node_ids {
            let inserted = self.insert_block(NewNodeBlock {
                blocking_node_id: *blocking_node_id,
                blocked_node_id: node_id,
            });
            match inserted {
                // Duplicates in the input collapse to one block
                Ok(_) | Err(RoadmapError::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

fn node_from_fields(
    id: i64,
    fields: &NewRoadmapNode,
    created_at: chrono::DateTime<Utc>,
) -> RoadmapNode {
    RoadmapNode {
        id,
        direction: fields.direction.clone(),
        title: fields.title.clone(),
        description: fields.description.clone(),
        resources: fields.resources.clone(),
        checkpoint: fields.checkpoint,
        node_type: fields.node_type,
        is_required: fields.is_required,
        order_index: fields.order_index,
        is_active: fields.is_active,
        created_at,
        updated_at: Utc::now(),
    }
}

/// Process-local store with the same invariants as the PostgreSQL schema
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoadmapStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut tables = self.tables.write();
        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(RoadmapError::conflict("Email already registered"));
        }
        let user = User {
            id: Tables::next_id(&mut tables.next_user_id),
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            xp: new_user.xp,
            badges: new_user.badges,
            profession: None,
            preferences: serde_json::json!({}),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.tables.read().users.values().cloned().collect())
    }

    async fn update_password_hash(&self, user_id: i64, password_hash: &str) -> Result<bool> {
        let mut tables = self.tables.write();
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_settings(
        &self,
        user_id: i64,
        profession: Option<&str>,
        preferences: Option<&serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Option<User>> {
        let mut tables = self.tables.write();
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(None);
        };
        if let Some(profession) = profession {
            user.profession = Some(profession.to_string());
        }
        if let Some(incoming) = preferences {
            let mut merged = match user.preferences.take() {
                serde_json::Value::Object(existing) => existing,
                _ => serde_json::Map::new(),
            };
            merged.extend(incoming.clone());
            user.preferences = serde_json::Value::Object(merged);
        }
        Ok(Some(user.clone()))
    }

    async fn create_node(
        &self,
        fields: &NewRoadmapNode,
        parent_ids: &[i64],
        blocking_node_ids: &[i64],
    ) -> Result<RoadmapNode> {
        let mut tables = self.tables.write();
        let id = tables.next_node_id + 1;
        tables.ensure_acyclic(id, parent_ids, blocking_node_ids)?;
        tables.next_node_id = id;
        let node = node_from_fields(id, fields, Utc::now());
        tables.nodes.insert(id, node.clone());
        tables.write_relations(id, parent_ids, blocking_node_ids)?;
        Ok(node)
    }

    async fn update_node(
        &self,
        id: i64,
        fields: &NewRoadmapNode,
        parent_ids: &[i64],
        blocking_node_ids: &[i64],
    ) -> Result<Option<RoadmapNode>> {
        let mut tables = self.tables.write();
        let Some(created_at) = tables.nodes.get(&id).map(|n| n.created_at) else {
            return Ok(None);
        };
        tables.ensure_acyclic(id, parent_ids, blocking_node_ids)?;
        let node = node_from_fields(id, fields, created_at);
        tables.nodes.insert(id, node.clone());
        tables.edges.retain(|(_, child)| *child != id);
        tables.blocks.retain(|_, b| b.blocked_node_id != id);
        tables.write_relations(id, parent_ids, blocking_node_ids)?;
        Ok(Some(node))
    }

    async fn delete_node(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.write();
        if tables.nodes.remove(&id).is_none() {
            return Ok(false);
        }
        tables
            .edges
            .retain(|(parent, child)| *parent != id && *child != id);
        tables
            .blocks
            .retain(|_, b| b.blocking_node_id != id && b.blocked_node_id != id);
        tables.progress.retain(|(_, node_id), _| *node_id != id);
        Ok(true)
    }

    async fn find_node(&self, id: i64) -> Result<Option<RoadmapNode>> {
        Ok(self.tables.read().nodes.get(&id).cloned())
    }

    async fn find_nodes(&self, ids: &[i64]) -> Result<Vec<RoadmapNode>> {
        let wanted: BTreeSet<i64> = ids.iter().copied().collect();
        let tables = self.tables.read();
        Ok(wanted
            .iter()
            .filter_map(|id| tables.nodes.get(id).cloned())
            .collect())
    }

    async fn list_nodes(&self, direction: Option<&str>) -> Result<Vec<RoadmapNode>> {
        let tables = self.tables.read();
        let mut nodes: Vec<RoadmapNode> = tables
            .nodes
            .values()
            .filter(|n| direction.map_or(true, |d| n.direction == d))
            .cloned()
            .collect();
        nodes.sort_by(|a, b| {
            (a.direction.as_str(), a.order_index, a.id).cmp(&(
                b.direction.as_str(),
                b.order_index,
                b.id,
            ))
        });
        Ok(nodes)
    }

    async fn directions(&self) -> Result<Vec<String>> {
        let tables = self.tables.read();
        let directions: BTreeSet<String> =
            tables.nodes.values().map(|n| n.direction.clone()).collect();
        Ok(directions.into_iter().collect())
    }

    async fn add_edge(&self, edge: NodeEdge) -> Result<()> {
        let mut tables = self.tables.write();
        if !tables.nodes.contains_key(&edge.parent_id)
            || !tables.nodes.contains_key(&edge.child_id)
        {
            return Err(RoadmapError::not_found("Node not found"));
        }
        tables.edges.insert((edge.parent_id, edge.child_id));
        Ok(())
    }

    async fn list_edges(&self) -> Result<Vec<NodeEdge>> {
        Ok(self
            .tables
            .read()
            .edges
            .iter()
            .map(|(parent, child)| NodeEdge::new(*parent, *child))
            .collect())
    }

    async fn create_block(&self, new_block: NewNodeBlock) -> Result<NodeBlock> {
        let mut tables = self.tables.write();
        let blocked_node_id = new_block.blocked_node_id;
        let blocking_node_id = new_block.blocking_node_id;
        let existing = tables.blocks.values().any(|b| {
            b.blocking_node_id == blocking_node_id && b.blocked_node_id == blocked_node_id
        });
        if !existing {
            tables.ensure_acyclic(blocked_node_id, &[], &[blocking_node_id])?;
        }
        tables.insert_block(new_block)
    }

    async fn delete_block(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().blocks.remove(&id).is_some())
    }

    async fn list_blocks(&self) -> Result<Vec<NodeBlock>> {
        Ok(self.tables.read().blocks.values().cloned().collect())
    }

    async fn list_progress_for_user(&self, user_id: i64) -> Result<Vec<Progress>> {
        Ok(self
            .tables
            .read()
            .progress
            .range((user_id, i64::MIN)..=(user_id, i64::MAX))
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn list_progress(&self) -> Result<Vec<Progress>> {
        Ok(self.tables.read().progress.values().cloned().collect())
    }

    async fn save_progress(&self, progress: &Progress) -> Result<Progress> {
        let mut tables = self.tables.write();
        if !tables.nodes.contains_key(&progress.node_id) {
            return Err(RoadmapError::not_found("Node not found"));
        }
        if !tables.users.contains_key(&progress.user_id) {
            return Err(RoadmapError::not_found("User not found"));
        }
        let saved = Progress {
            updated_at: Utc::now(),
            ..progress.clone()
        };
        tables
            .progress
            .insert((progress.user_id, progress.node_id), saved.clone());
        Ok(saved)
    }

    async fn record_progress(&self, write: ProgressWrite) -> Result<ProgressRecord> {
        let mut tables = self.tables.write();
        if !tables.nodes.contains_key(&write.node_id) {
            return Err(RoadmapError::not_found("Node not found"));
        }
        let key = (write.user_id, write.node_id);
        let previous = tables.progress.get(&key).map(|p| p.status);

        let Some(user) = tables.users.get_mut(&write.user_id) else {
            return Err(RoadmapError::not_found("User not found"));
        };
        let (xp_awarded, new_badges) = completion_award(previous, &write, user);
        let user = user.clone();

        let progress = Progress {
            status: write.status,
            score: write.score,
            updated_at: Utc::now(),
            ..Progress::new(write.user_id, write.node_id)
        };
        tables.progress.insert(key, progress.clone());

        Ok(ProgressRecord {
            progress,
            user,
            xp_awarded,
            new_badges,
        })
    }

    async fn counts(&self) -> Result<StoreCounts> {
        let tables = self.tables.read();
        Ok(StoreCounts {
            nodes: tables.nodes.len() as i64,
            users: tables.users.len() as i64,
            progress: tables.progress.len() as i64,
        })
    }

    async fn clear(&self) -> Result<()> {
        *self.tables.write() = Tables::default();
        Ok(())
    }
}
