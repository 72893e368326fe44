//! PostgreSQL backend built on the model queries.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use super::{
    check_acyclic, completion_award, ProgressRecord, ProgressWrite, RoadmapStore, StoreCounts,
};
use crate::config::DatabaseConfig;
use crate::error::{Result, RoadmapError};
use crate::models::{
    NewNodeBlock, NewRoadmapNode, NewUser, NodeBlock, NodeEdge, Progress, RoadmapNode, User,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Advisory lock key serializing relation writes with their cycle checks
const RELATIONS_LOCK_KEY: i64 = 0x524f_4144_4d41_50;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a pool sized from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!(
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply embedded migrations from `migrations/`
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Take the relations lock for the rest of the transaction and check the
    /// new relations against the committed ones
    async fn lock_and_check_relations(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        node_id: i64,
        parent_ids: &[i64],
        blocking_node_ids: &[i64],
    ) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(RELATIONS_LOCK_KEY)
            .execute(&mut **tx)
            .await?;
        let edges = NodeEdge::list_all(&mut **tx).await?;
        let blocks = NodeBlock::list_all(&mut **tx).await?;
        check_acyclic(&edges, &blocks, node_id, parent_ids, blocking_node_ids)
    }

    async fn write_relations(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        node_id: i64,
        parent_ids: &[i64],
        blocking_node_ids: &[i64],
    ) -> Result<()> {
        for parent_id in parent_ids {
            NodeEdge::create(&mut **tx, NodeEdge::new(*parent_id, node_id)).await?;
        }
        for blocking_node_id in blocking_node_ids {
            NodeBlock::create(
                &mut **tx,
                NewNodeBlock {
                    blocking_node_id: *blocking_node_id,
                    blocked_node_id: node_id,
                },
            )
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RoadmapStore for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        User::create(&self.pool, new_user)
            .await
            .map_err(|e| match RoadmapError::from(e) {
                RoadmapError::Conflict(_) => RoadmapError::conflict("Email already registered"),
                other => other,
            })
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(User::list_all(&self.pool).await?)
    }

    async fn update_password_hash(&self, user_id: i64, password_hash: &str) -> Result<bool> {
        Ok(User::update_password_hash(&self.pool, user_id, password_hash).await?)
    }

    async fn update_settings(
        &self,
        user_id: i64,
        profession: Option<&str>,
        preferences: Option<&serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Option<User>> {
        let preferences = preferences.map(|p| serde_json::Value::Object(p.clone()));
        Ok(User::update_settings(&self.pool, user_id, profession, preferences.as_ref()).await?)
    }

    async fn create_node(
        &self,
        fields: &NewRoadmapNode,
        parent_ids: &[i64],
        blocking_node_ids: &[i64],
    ) -> Result<RoadmapNode> {
        let mut tx = self.pool.begin().await?;
        let node = RoadmapNode::create(&mut *tx, fields).await?;
        Self::lock_and_check_relations(&mut tx, node.id, parent_ids, blocking_node_ids).await?;
        Self::write_relations(&mut tx, node.id, parent_ids, blocking_node_ids).await?;
        tx.commit().await?;
        debug!(node_id = node.id, "Created roadmap node");
        Ok(node)
    }

    async fn update_node(
        &self,
        id: i64,
        fields: &NewRoadmapNode,
        parent_ids: &[i64],
        blocking_node_ids: &[i64],
    ) -> Result<Option<RoadmapNode>> {
        let mut tx = self.pool.begin().await?;
        let Some(node) = RoadmapNode::update(&mut *tx, id, fields).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        Self::lock_and_check_relations(&mut tx, id, parent_ids, blocking_node_ids).await?;
        NodeEdge::delete_parents_of(&mut *tx, id).await?;
        NodeBlock::delete_blockers_of(&mut *tx, id).await?;
        Self::write_relations(&mut tx, id, parent_ids, blocking_node_ids).await?;
        tx.commit().await?;
        Ok(Some(node))
    }

    async fn delete_node(&self, id: i64) -> Result<bool> {
        Ok(RoadmapNode::delete(&self.pool, id).await?)
    }

    async fn find_node(&self, id: i64) -> Result<Option<RoadmapNode>> {
        Ok(RoadmapNode::find_by_id(&self.pool, id).await?)
    }

    async fn find_nodes(&self, ids: &[i64]) -> Result<Vec<RoadmapNode>> {
        Ok(RoadmapNode::find_by_ids(&self.pool, ids).await?)
    }

    async fn list_nodes(&self, direction: Option<&str>) -> Result<Vec<RoadmapNode>> {
        Ok(RoadmapNode::list(&self.pool, direction).await?)
    }

    async fn directions(&self) -> Result<Vec<String>> {
        Ok(RoadmapNode::directions(&self.pool).await?)
    }

    async fn add_edge(&self, edge: NodeEdge) -> Result<()> {
        Ok(NodeEdge::create(&self.pool, edge).await?)
    }

    async fn list_edges(&self) -> Result<Vec<NodeEdge>> {
        Ok(NodeEdge::list_all(&self.pool).await?)
    }

    async fn create_block(&self, new_block: NewNodeBlock) -> Result<NodeBlock> {
        let mut tx = self.pool.begin().await?;
        Self::lock_and_check_relations(
            &mut tx,
            new_block.blocked_node_id,
            &[],
            &[new_block.blocking_node_id],
        )
        .await?;
        let block = NodeBlock::create(&mut *tx, new_block)
            .await
            .map_err(|e| match RoadmapError::from(e) {
                RoadmapError::Conflict(_) => RoadmapError::conflict("Block already exists"),
                other => other,
            })?;
        tx.commit().await?;
        Ok(block)
    }

    async fn delete_block(&self, id: i64) -> Result<bool> {
        Ok(NodeBlock::delete(&self.pool, id).await?)
    }

    async fn list_blocks(&self) -> Result<Vec<NodeBlock>> {
        Ok(NodeBlock::list_all(&self.pool).await?)
    }

    async fn list_progress_for_user(&self, user_id: i64) -> Result<Vec<Progress>> {
        Ok(Progress::find_by_user(&self.pool, user_id).await?)
    }

    async fn list_progress(&self) -> Result<Vec<Progress>> {
        Ok(Progress::list_all(&self.pool).await?)
    }

    async fn save_progress(&self, progress: &Progress) -> Result<Progress> {
        Ok(Progress::upsert(&self.pool, progress).await?)
    }

    async fn record_progress(&self, write: ProgressWrite) -> Result<ProgressRecord> {
        let mut tx = self.pool.begin().await?;
        // The user row lock serializes progress writes of one learner, so the
        // previous status read below is the committed one
        let mut user = User::find_for_update(&mut *tx, write.user_id)
            .await?
            .ok_or_else(|| RoadmapError::not_found("User not found"))?;
        let previous = Progress::find(&mut *tx, write.user_id, write.node_id)
            .await?
            .map(|p| p.status);

        let row = Progress {
            status: write.status,
            score: write.score,
            ..Progress::new(write.user_id, write.node_id)
        };
        let progress = Progress::upsert(&mut *tx, &row).await?;

        let (xp_awarded, new_badges) = completion_award(previous, &write, &mut user);
        if xp_awarded > 0 || !new_badges.is_empty() {
            let saved = User::update_rewards(&mut *tx, user.id, user.xp, &user.badges)
                .await?
                .ok_or_else(|| RoadmapError::not_found("User not found"))?;
            user = saved;
        }
        tx.commit().await?;

        Ok(ProgressRecord {
            progress,
            user,
            xp_awarded,
            new_badges,
        })
    }

    async fn counts(&self) -> Result<StoreCounts> {
        Ok(StoreCounts {
            nodes: RoadmapNode::count(&self.pool).await?,
            users: User::count(&self.pool).await?,
            progress: Progress::count(&self.pool).await?,
        })
    }

    async fn clear(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Progress::delete_all(&mut *tx).await?;
        User::delete_all(&mut *tx).await?;
        // Edges and blocks cascade with their nodes
        RoadmapNode::delete_all(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}
