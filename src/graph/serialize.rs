//! Nested serialization of the roadmap hierarchy.
//!
//! The hierarchy may contain cycles or self references when data was loaded
//! from an older schema, so flattening into a tree uses two guards:
//!
//! - a path-based visited set: a child already on the root-to-node path is
//!   omitted, while shared descendants (diamonds) still appear under each parent
//! - a depth bound: the root is depth 0 and children are only emitted while
//!   the current depth is below `max_depth`

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::RoadmapGraph;
use crate::models::RoadmapNode;

/// Compact reference to a related node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: i64,
    pub title: String,
    pub direction: String,
}

impl From<&RoadmapNode> for NodeRef {
    fn from(node: &RoadmapNode) -> Self {
        Self {
            id: node.id,
            title: node.title.clone(),
            direction: node.direction.clone(),
        }
    }
}

/// A node with its relations and nested children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
    #[serde(flatten)]
    pub node: RoadmapNode,
    pub parent_ids: Vec<i64>,
    pub blocking_node_ids: Vec<i64>,
    pub blocked_by: Vec<NodeRef>,
    pub blocks: Vec<NodeRef>,
    pub children: Vec<NodeTree>,
}

impl NodeTree {
    /// Deepest level below this node, 0 for a leaf
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

impl RoadmapGraph {
    /// Serialize `id` and its descendants; `None` when the node is unknown
    pub fn serialize(&self, id: i64, max_depth: usize) -> Option<NodeTree> {
        let mut path = HashSet::new();
        self.serialize_at(id, 0, max_depth, &mut path)
    }

    /// Serialize every root, optionally restricted to one direction
    pub fn forest(&self, direction: Option<&str>, max_depth: usize) -> Vec<NodeTree> {
        self.roots(direction)
            .into_iter()
            .filter_map(|root| self.serialize(root, max_depth))
            .collect()
    }

    fn serialize_at(
        &self,
        id: i64,
        depth: usize,
        max_depth: usize,
        path: &mut HashSet<i64>,
    ) -> Option<NodeTree> {
        let node = self.node(id)?.clone();
        path.insert(id);

        let children = if depth < max_depth {
            self.children(id)
                .into_iter()
                .filter_map(|child| {
                    if path.contains(&child) {
                        None
                    } else {
                        self.serialize_at(child, depth + 1, max_depth, path)
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        path.remove(&id);

        let blocking_node_ids = self.blockers(id);
        Some(NodeTree {
            node,
            parent_ids: self.parents(id),
            blocked_by: self.refs(&blocking_node_ids),
            blocks: self.refs(&self.blocked(id)),
            blocking_node_ids,
            children,
        })
    }

    fn refs(&self, ids: &[i64]) -> Vec<NodeRef> {
        ids.iter().filter_map(|id| self.node_ref(*id)).collect()
    }
}
