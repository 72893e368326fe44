//! # Data Layer
//!
//! Persistent records of the platform and their PostgreSQL queries. Each model
//! owns the SQL for its table; [`crate::storage::PgStore`] composes them.

pub mod node_block;
pub mod node_edge;
pub mod progress;
pub mod roadmap_node;
pub mod user;

pub use node_block::{NewNodeBlock, NodeBlock};
pub use node_edge::NodeEdge;
pub use progress::Progress;
pub use roadmap_node::{NewRoadmapNode, RoadmapNode};
pub use user::{NewUser, User};
