use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

/// NodeEdge is a parent/child link of the roadmap DAG
/// Maps to `roadmap_node_edges` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct NodeEdge {
    pub parent_id: i64,
    pub child_id: i64,
}

impl NodeEdge {
    pub fn new(parent_id: i64, child_id: i64) -> Self {
        Self {
            parent_id,
            child_id,
        }
    }

    /// Create an edge; an existing identical edge is left untouched
    pub async fn create<'e, E>(executor: E, edge: NodeEdge) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO roadmap_node_edges (parent_id, child_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(edge.parent_id)
        .bind(edge.child_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Remove every parent link of a child node
    pub async fn delete_parents_of<'e, E>(
        executor: E,
        child_id: i64,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM roadmap_node_edges WHERE child_id = $1")
            .bind(child_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// All edges of the roadmap
    pub async fn list_all<'e, E>(executor: E) -> Result<Vec<NodeEdge>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, NodeEdge>(
            "SELECT parent_id, child_id FROM roadmap_node_edges ORDER BY parent_id, child_id",
        )
        .fetch_all(executor)
        .await
    }
}
