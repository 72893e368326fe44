use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};

use crate::constants::BADGE_THRESHOLDS;

/// User represents a learner or staff member
/// Maps to `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub xp: i64,
    #[sqlx(json)]
    pub badges: Vec<String>,
    pub profession: Option<String>,
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// New User for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub xp: i64,
    pub badges: Vec<String>,
}

const USER_COLUMNS: &str =
    "id, email, password_hash, role, xp, badges, profession, preferences, created_at";

impl User {
    /// Create a new user
    pub async fn create(pool: &PgPool, new_user: NewUser) -> Result<User, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, role, xp, badges)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.role)
        .bind(new_user.xp)
        .bind(sqlx::types::Json(&new_user.badges))
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive, emails are normalized on write)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// List all users ordered by ID
    pub async fn list_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(pool)
            .await
    }

    /// Add XP and append any badge whose threshold is now reached.
    ///
    /// Returns the newly earned badges in threshold order.
    pub fn award_xp(&mut self, delta: i64) -> Vec<String> {
        self.xp += delta.max(0);
        let mut earned = Vec::new();
        for (threshold, name) in BADGE_THRESHOLDS {
            if self.xp >= threshold && !self.badges.iter().any(|b| b == name) {
                self.badges.push(name.to_string());
                earned.push(name.to_string());
            }
        }
        earned
    }

    /// Load a user and hold its row lock until the transaction ends
    pub async fn find_for_update<'e, E>(executor: E, id: i64) -> Result<Option<User>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Write XP and badges only
    pub async fn update_rewards<'e, E>(
        executor: E,
        id: i64,
        xp: i64,
        badges: &[String],
    ) -> Result<Option<User>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET xp = $2, badges = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(xp)
        .bind(sqlx::types::Json(badges))
        .fetch_optional(executor)
        .await
    }

    pub async fn update_password_hash(
        pool: &PgPool,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the profession when given and shallow-merge `preferences` into the
    /// stored object in a single statement
    pub async fn update_settings(
        pool: &PgPool,
        id: i64,
        profession: Option<&str>,
        preferences: Option<&serde_json::Value>,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET profession = COALESCE($2, profession),
                preferences = CASE
                    WHEN $3::jsonb IS NULL THEN preferences
                    WHEN jsonb_typeof(preferences) = 'object' THEN preferences || $3::jsonb
                    ELSE $3::jsonb
                END
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(profession)
        .bind(preferences)
        .fetch_optional(pool)
        .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    pub async fn delete_all<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM users").execute(executor).await?;
        Ok(result.rows_affected())
    }
}
