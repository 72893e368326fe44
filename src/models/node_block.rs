use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};

/// NodeBlock makes one node unavailable until another is completed
/// Maps to `roadmap_node_blocks` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NodeBlock {
    pub id: i64,
    /// Node that must be completed first
    pub blocking_node_id: i64,
    /// Node that stays locked until then
    pub blocked_node_id: i64,
    pub created_at: DateTime<Utc>,
}

/// New NodeBlock for creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNodeBlock {
    pub blocking_node_id: i64,
    pub blocked_node_id: i64,
}

impl NodeBlock {
    pub async fn create<'e, E>(
        executor: E,
        new_block: NewNodeBlock,
    ) -> Result<NodeBlock, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, NodeBlock>(
            r#"
            INSERT INTO roadmap_node_blocks (blocking_node_id, blocked_node_id)
            VALUES ($1, $2)
            RETURNING id, blocking_node_id, blocked_node_id, created_at
            "#,
        )
        .bind(new_block.blocking_node_id)
        .bind(new_block.blocked_node_id)
        .fetch_one(executor)
        .await
    }

    pub async fn list_all<'e, E>(executor: E) -> Result<Vec<NodeBlock>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, NodeBlock>(
            r#"
            SELECT id, blocking_node_id, blocked_node_id, created_at
            FROM roadmap_node_blocks
            ORDER BY id
            "#,
        )
        .fetch_all(executor)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roadmap_node_blocks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every block that keeps the given node locked
    pub async fn delete_blockers_of<'e, E>(
        executor: E,
        blocked_node_id: i64,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM roadmap_node_blocks WHERE blocked_node_id = $1")
            .bind(blocked_node_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
