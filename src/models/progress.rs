use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};

use crate::constants::ProgressStatus;

/// Progress of one user on one node
/// Maps to `progress` table, keyed by `(user_id, node_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Progress {
    pub user_id: i64,
    pub node_id: i64,
    #[sqlx(try_from = "String")]
    pub status: ProgressStatus,
    pub score: i32,
    pub updated_at: DateTime<Utc>,
}

impl Progress {
    pub fn new(user_id: i64, node_id: i64) -> Self {
        Self {
            user_id,
            node_id,
            status: ProgressStatus::NotStarted,
            score: 0,
            updated_at: Utc::now(),
        }
    }

    /// Insert or replace the row for `(user_id, node_id)`
    pub async fn upsert<'e, E>(executor: E, progress: &Progress) -> Result<Progress, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Progress>(
            r#"
            INSERT INTO progress (user_id, node_id, status, score, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id, node_id)
            DO UPDATE SET status = EXCLUDED.status, score = EXCLUDED.score, updated_at = NOW()
            RETURNING user_id, node_id, status, score, updated_at
            "#,
        )
        .bind(progress.user_id)
        .bind(progress.node_id)
        .bind(progress.status.as_str())
        .bind(progress.score)
        .fetch_one(executor)
        .await
    }

    pub async fn find<'e, E>(
        executor: E,
        user_id: i64,
        node_id: i64,
    ) -> Result<Option<Progress>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Progress>(
            r#"
            SELECT user_id, node_id, status, score, updated_at
            FROM progress
            WHERE user_id = $1 AND node_id = $2
            "#,
        )
        .bind(user_id)
        .bind(node_id)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Progress>, sqlx::Error> {
        sqlx::query_as::<_, Progress>(
            r#"
            SELECT user_id, node_id, status, score, updated_at
            FROM progress
            WHERE user_id = $1
            ORDER BY node_id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Progress>, sqlx::Error> {
        sqlx::query_as::<_, Progress>(
            r#"
            SELECT user_id, node_id, status, score, updated_at
            FROM progress
            ORDER BY user_id, node_id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM progress")
            .fetch_one(pool)
            .await
    }

    pub async fn delete_all<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM progress").execute(executor).await?;
        Ok(result.rows_affected())
    }
}
