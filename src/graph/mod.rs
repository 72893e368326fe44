//! # Roadmap Graph
//!
//! In-memory view of the roadmap used for traversal, validation and nested
//! serialization. Two relations are kept as separate petgraph maps:
//!
//! - **hierarchy**: `parent -> child` edges forming the learning DAG
//! - **blocking**: `blocker -> blocked` edges; a blocked node is unavailable
//!   to a learner until every direct blocker is completed
//!
//! Edges are stored as loaded, so a graph built from inconsistent data (self
//! references, cycles) still answers every query. Cycle prevention happens at
//! write time through [`RoadmapGraph::would_create_cycle`] and
//! [`RoadmapGraph::would_create_block_cycle`].

use petgraph::algo;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::warn;

use crate::models::{NodeBlock, NodeEdge, RoadmapNode};

mod serialize;

pub use serialize::{NodeRef, NodeTree};

/// Result of checking whether a learner may work on a node
#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    pub available: bool,
    /// Direct blockers the learner has not completed yet
    pub blocking_nodes: Vec<NodeRef>,
}

#[derive(Debug, Clone, Default)]
pub struct RoadmapGraph {
    nodes: HashMap<i64, RoadmapNode>,
    hierarchy: DiGraphMap<i64, ()>,
    blocking: DiGraphMap<i64, ()>,
}

impl RoadmapGraph {
    /// Build the graph; relations that reference unknown nodes are skipped
    pub fn build(nodes: Vec<RoadmapNode>, edges: &[NodeEdge], blocks: &[NodeBlock]) -> Self {
        let mut graph = Self::default();
        for node in nodes {
            graph.hierarchy.add_node(node.id);
            graph.blocking.add_node(node.id);
            graph.nodes.insert(node.id, node);
        }

        for edge in edges {
            if graph.contains(edge.parent_id) && graph.contains(edge.child_id) {
                graph.hierarchy.add_edge(edge.parent_id, edge.child_id, ());
            } else {
                warn!(
                    parent_id = edge.parent_id,
                    child_id = edge.child_id,
                    "Skipping edge that references an unknown node"
                );
            }
        }

        for block in blocks {
            if graph.contains(block.blocking_node_id) && graph.contains(block.blocked_node_id) {
                graph
                    .blocking
                    .add_edge(block.blocking_node_id, block.blocked_node_id, ());
            } else {
                warn!(
                    block_id = block.id,
                    blocking_node_id = block.blocking_node_id,
                    blocked_node_id = block.blocked_node_id,
                    "Skipping block that references an unknown node"
                );
            }
        }

        graph
    }

    /// Relations without node rows, enough for the cycle checks
    pub fn from_relations(edges: &[NodeEdge], blocks: &[NodeBlock]) -> Self {
        let mut graph = Self::default();
        for edge in edges {
            graph.hierarchy.add_edge(edge.parent_id, edge.child_id, ());
        }
        for block in blocks {
            graph
                .blocking
                .add_edge(block.blocking_node_id, block.blocked_node_id, ());
        }
        graph
    }

    pub fn contains(&self, id: i64) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: i64) -> Option<&RoadmapNode> {
        self.nodes.get(&id)
    }

    pub fn node_ref(&self, id: i64) -> Option<NodeRef> {
        self.nodes.get(&id).map(NodeRef::from)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parent IDs in ascending order
    pub fn parents(&self, id: i64) -> Vec<i64> {
        self.sorted_ids(&self.hierarchy, id, Direction::Incoming)
    }

    /// Child IDs ordered by `order_index`, then id
    pub fn children(&self, id: i64) -> Vec<i64> {
        let mut children: Vec<i64> = self
            .hierarchy
            .neighbors_directed(id, Direction::Outgoing)
            .collect();
        self.sort_by_position(&mut children);
        children
    }

    /// IDs of nodes that block `id`
    pub fn blockers(&self, id: i64) -> Vec<i64> {
        self.sorted_ids(&self.blocking, id, Direction::Incoming)
    }

    /// IDs of nodes that `id` blocks
    pub fn blocked(&self, id: i64) -> Vec<i64> {
        self.sorted_ids(&self.blocking, id, Direction::Outgoing)
    }

    /// Nodes without parents, ordered by `order_index`, then id
    pub fn roots(&self, direction: Option<&str>) -> Vec<i64> {
        let mut roots: Vec<i64> = self
            .nodes
            .values()
            .filter(|n| direction.map_or(true, |d| n.direction == d))
            .filter(|n| {
                self.hierarchy
                    .neighbors_directed(n.id, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|n| n.id)
            .collect();
        self.sort_by_position(&mut roots);
        roots
    }

    /// True when linking `parent -> child` would close a loop in the hierarchy
    pub fn would_create_cycle(&self, parent_id: i64, child_id: i64) -> bool {
        Self::closes_loop(&self.hierarchy, parent_id, child_id)
    }

    /// True when `blocking` blocking `blocked` would close a loop of blocks
    pub fn would_create_block_cycle(&self, blocking_id: i64, blocked_id: i64) -> bool {
        Self::closes_loop(&self.blocking, blocking_id, blocked_id)
    }

    /// Transitive blockers of `id`, nearest first, each once, excluding `id`
    pub fn dependencies(&self, id: i64) -> Vec<i64> {
        let mut result = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut queue: VecDeque<i64> = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for blocker in self.blockers(current) {
                if visited.insert(blocker) {
                    result.push(blocker);
                    queue.push_back(blocker);
                }
            }
        }

        result
    }

    /// Whether a learner with `completed` nodes may work on `id`
    pub fn availability(&self, id: i64, completed: &HashSet<i64>) -> Option<Availability> {
        let node = self.nodes.get(&id)?;
        let blocking_nodes: Vec<NodeRef> = self
            .blockers(id)
            .into_iter()
            .filter(|blocker| !completed.contains(blocker))
            .filter_map(|blocker| self.node_ref(blocker))
            .collect();

        Some(Availability {
            available: node.is_active && blocking_nodes.is_empty(),
            blocking_nodes,
        })
    }

    fn closes_loop(relation: &DiGraphMap<i64, ()>, from: i64, to: i64) -> bool {
        if from == to {
            return true;
        }
        if !relation.contains_node(from) || !relation.contains_node(to) {
            return false;
        }
        // An existing path to -> from plus the new edge from -> to is a cycle
        algo::has_path_connecting(relation, to, from, None)
    }

    fn sorted_ids(&self, relation: &DiGraphMap<i64, ()>, id: i64, dir: Direction) -> Vec<i64> {
        if !relation.contains_node(id) {
            return Vec::new();
        }
        let mut ids: Vec<i64> = relation.neighbors_directed(id, dir).collect();
        ids.sort_unstable();
        ids
    }

    fn sort_by_position(&self, ids: &mut [i64]) {
        ids.sort_by_key(|id| {
            let order_index = self.nodes.get(id).map_or(i32::MAX, |n| n.order_index);
            (order_index, *id)
        });
    }
}
