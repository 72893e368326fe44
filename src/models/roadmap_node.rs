use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};

use crate::constants::NodeType;

/// RoadmapNode represents a single learning step within a direction
/// Maps to `roadmap_nodes` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RoadmapNode {
    pub id: i64,
    pub direction: String,
    pub title: String,
    pub description: String,
    #[sqlx(json)]
    pub resources: Vec<String>,
    pub checkpoint: bool,
    #[sqlx(try_from = "String")]
    pub node_type: NodeType,
    pub is_required: bool,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New RoadmapNode for creation and full updates (relations handled separately)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRoadmapNode {
    pub direction: String,
    pub title: String,
    pub description: String,
    pub resources: Vec<String>,
    pub checkpoint: bool,
    pub node_type: NodeType,
    pub is_required: bool,
    pub order_index: i32,
    pub is_active: bool,
}

impl NewRoadmapNode {
    /// Minimal task node, mostly for fixtures and tests
    pub fn task(direction: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            direction: direction.into(),
            title: title.into(),
            description: String::new(),
            resources: Vec::new(),
            checkpoint: false,
            node_type: NodeType::Task,
            is_required: true,
            order_index: 0,
            is_active: true,
        }
    }
}

const NODE_COLUMNS: &str = "id, direction, title, description, resources, checkpoint, \
     node_type, is_required, order_index, is_active, created_at, updated_at";

impl RoadmapNode {
    /// Create a new roadmap node
    pub async fn create<'e, E>(
        executor: E,
        new_node: &NewRoadmapNode,
    ) -> Result<RoadmapNode, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, RoadmapNode>(&format!(
            r#"
            INSERT INTO roadmap_nodes
                (direction, title, description, resources, checkpoint,
                 node_type, is_required, order_index, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {NODE_COLUMNS}
            "#
        ))
        .bind(&new_node.direction)
        .bind(&new_node.title)
        .bind(&new_node.description)
        .bind(sqlx::types::Json(&new_node.resources))
        .bind(new_node.checkpoint)
        .bind(new_node.node_type.as_str())
        .bind(new_node.is_required)
        .bind(new_node.order_index)
        .bind(new_node.is_active)
        .fetch_one(executor)
        .await
    }

    /// Replace all editable fields of a node
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        fields: &NewRoadmapNode,
    ) -> Result<Option<RoadmapNode>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, RoadmapNode>(&format!(
            r#"
            UPDATE roadmap_nodes
            SET direction = $2, title = $3, description = $4, resources = $5,
                checkpoint = $6, node_type = $7, is_required = $8,
                order_index = $9, is_active = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {NODE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&fields.direction)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(sqlx::types::Json(&fields.resources))
        .bind(fields.checkpoint)
        .bind(fields.node_type.as_str())
        .bind(fields.is_required)
        .bind(fields.order_index)
        .bind(fields.is_active)
        .fetch_optional(executor)
        .await
    }

    /// Find a node by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<RoadmapNode>, sqlx::Error> {
        sqlx::query_as::<_, RoadmapNode>(&format!(
            "SELECT {NODE_COLUMNS} FROM roadmap_nodes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Find every node whose ID is in the list
    pub async fn find_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<RoadmapNode>, sqlx::Error> {
        sqlx::query_as::<_, RoadmapNode>(&format!(
            "SELECT {NODE_COLUMNS} FROM roadmap_nodes WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// List nodes, optionally restricted to one direction
    pub async fn list(
        pool: &PgPool,
        direction: Option<&str>,
    ) -> Result<Vec<RoadmapNode>, sqlx::Error> {
        sqlx::query_as::<_, RoadmapNode>(&format!(
            r#"
            SELECT {NODE_COLUMNS}
            FROM roadmap_nodes
            WHERE $1::TEXT IS NULL OR direction = $1
            ORDER BY direction, order_index, id
            "#
        ))
        .bind(direction)
        .fetch_all(pool)
        .await
    }

    /// Distinct directions in alphabetical order
    pub async fn directions(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT direction FROM roadmap_nodes ORDER BY direction",
        )
        .fetch_all(pool)
        .await
    }

    /// Delete a node; edges, blocks and progress rows cascade in the schema
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM roadmap_nodes WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM roadmap_nodes")
            .fetch_one(pool)
            .await
    }

    pub async fn delete_all<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM roadmap_nodes")
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
