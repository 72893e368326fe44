//! # Data Manager
//!
//! Loads, clears and exports demo data. Built-in fixtures live in
//! `src/seed/fixtures/` and use the same JSON shapes accepted from files:
//!
//! - `roadmap.json`: `{ direction: [ {key, title, description, resources, parents, checkpoint} ] }`
//! - `users.json`: `[ {email, password, role, xp, badges} ]`
//! - `progress.json`: `{ email: [ {node_key, status, score} ] }`
//!
//! Node keys only exist in the files. Exported data uses `node_{id}` keys.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::PasswordHasher;
use crate::config::SeedConfig;
use crate::constants::{NodeType, ProgressStatus};
use crate::error::Result;
use crate::models::{NewRoadmapNode, NewUser, NodeEdge, Progress, User};
use crate::storage::{RoadmapStore, StoreCounts};

const BUILTIN_ROADMAP: &str = include_str!("fixtures/roadmap.json");
const BUILTIN_USERS: &str = include_str!("fixtures/users.json");
const BUILTIN_PROGRESS: &str = include_str!("fixtures/progress.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSeed {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub checkpoint: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSeed {
    pub email: String,
    /// Absent in exported files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: String,
    #[serde(default)]
    pub xp: i64,
    #[serde(default)]
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSeed {
    pub node_key: String,
    pub status: ProgressStatus,
    #[serde(default)]
    pub score: i32,
}

pub type RoadmapSeed = BTreeMap<String, Vec<NodeSeed>>;
pub type ProgressSeedMap = BTreeMap<String, Vec<ProgressSeed>>;

/// Optional fixture files; `None` selects the built-in data
#[derive(Debug, Clone, Default)]
pub struct SeedFiles {
    pub roadmap: Option<PathBuf>,
    pub users: Option<PathBuf>,
    pub progress: Option<PathBuf>,
}

impl SeedFiles {
    pub fn from_config(config: &SeedConfig) -> Self {
        Self {
            roadmap: config.roadmap_file.as_ref().map(PathBuf::from),
            users: config.users_file.as_ref().map(PathBuf::from),
            progress: config.progress_file.as_ref().map(PathBuf::from),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SeedOutcome {
    /// The store already had nodes and `force` was not set
    Skipped { existing_nodes: i64 },
    Seeded {
        nodes: usize,
        users: usize,
        progress: usize,
    },
}

#[derive(Clone, Debug)]
pub struct DataManager {
    store: Arc<dyn RoadmapStore>,
    hasher: PasswordHasher,
}

impl DataManager {
    pub fn new(store: Arc<dyn RoadmapStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub async fn initialize(&self, files: &SeedFiles, force: bool) -> Result<SeedOutcome> {
        let existing_nodes = self.store.counts().await?.nodes;
        if existing_nodes > 0 {
            if !force {
                info!(existing_nodes, "Store already contains data, skipping seed");
                return Ok(SeedOutcome::Skipped { existing_nodes });
            }
            self.clear().await?;
        }

        let roadmap: RoadmapSeed = load_fixture(files.roadmap.as_deref(), BUILTIN_ROADMAP)?;
        let users: Vec<UserSeed> = load_fixture(files.users.as_deref(), BUILTIN_USERS)?;
        let progress: ProgressSeedMap = load_fixture(files.progress.as_deref(), BUILTIN_PROGRESS)?;

        let node_ids = self.create_nodes(&roadmap).await?;
        let created_users = self.create_users(&users).await?;
        let progress_count = self
            .create_progress(&progress, &created_users, &node_ids)
            .await?;

        info!(
            nodes = node_ids.len(),
            users = created_users.len(),
            progress = progress_count,
            "Seed data initialized"
        );
        Ok(SeedOutcome::Seeded {
            nodes: node_ids.len(),
            users: created_users.len(),
            progress: progress_count,
        })
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await?;
        info!("All roadmap data cleared");
        Ok(())
    }

    /// Write `roadmap.json`, `users.json` and `progress.json` into `output_dir`
    pub async fn export(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let (nodes, edges, users, progress) = tokio::try_join!(
            self.store.list_nodes(None),
            self.store.list_edges(),
            self.store.list_users(),
            self.store.list_progress()
        )?;

        let mut parents: HashMap<i64, Vec<String>> = HashMap::new();
        for edge in &edges {
            parents
                .entry(edge.child_id)
                .or_default()
                .push(node_key(edge.parent_id));
        }

        let mut roadmap = RoadmapSeed::new();
        for node in &nodes {
            roadmap
                .entry(node.direction.clone())
                .or_default()
                .push(NodeSeed {
                    key: node_key(node.id),
                    title: node.title.clone(),
                    description: node.description.clone(),
                    resources: node.resources.clone(),
                    parents: parents.remove(&node.id).unwrap_or_default(),
                    checkpoint: node.checkpoint,
                });
        }

        let emails: HashMap<i64, &str> = users.iter().map(|u| (u.id, u.email.as_str())).collect();
        let user_seeds: Vec<UserSeed> = users
            .iter()
            .map(|u| UserSeed {
                email: u.email.clone(),
                password: None,
                role: u.role.clone(),
                xp: u.xp,
                badges: u.badges.clone(),
            })
            .collect();

        let mut progress_seeds = ProgressSeedMap::new();
        for row in &progress {
            if let Some(email) = emails.get(&row.user_id) {
                progress_seeds
                    .entry(email.to_string())
                    .or_default()
                    .push(ProgressSeed {
                        node_key: node_key(row.node_id),
                        status: row.status,
                        score: row.score,
                    });
            }
        }

        fs::create_dir_all(output_dir)?;
        let written = vec![
            write_json(output_dir, "roadmap.json", &roadmap)?,
            write_json(output_dir, "users.json", &user_seeds)?,
            write_json(output_dir, "progress.json", &progress_seeds)?,
        ];
        info!(output_dir = %output_dir.display(), "Data exported");
        Ok(written)
    }

    pub async fn status(&self) -> Result<StoreCounts> {
        self.store.counts().await
    }

    async fn create_nodes(&self, roadmap: &RoadmapSeed) -> Result<HashMap<String, i64>> {
        let mut ids = HashMap::new();
        for (direction, seeds) in roadmap {
            for (position, seed) in seeds.iter().enumerate() {
                let fields = NewRoadmapNode {
                    direction: direction.clone(),
                    title: seed.title.clone(),
                    description: seed.description.clone(),
                    resources: seed.resources.clone(),
                    checkpoint: seed.checkpoint,
                    node_type: if seed.parents.is_empty() {
                        NodeType::Parent
                    } else {
                        NodeType::Task
                    },
                    is_required: true,
                    order_index: position as i32,
                    is_active: true,
                };
                let node = self.store.create_node(&fields, &[], &[]).await?;
                ids.insert(seed.key.clone(), node.id);
            }
        }

        // Link after every node exists so parents may be listed in any order
        for seeds in roadmap.values() {
            for seed in seeds {
                let Some(&child_id) = ids.get(&seed.key) else {
                    continue;
                };
                for parent_key in &seed.parents {
                    match ids.get(parent_key) {
                        Some(&parent_id) if parent_id != child_id => {
                            self.store.add_edge(NodeEdge::new(parent_id, child_id)).await?;
                        }
                        _ => warn!(
                            node_key = %seed.key,
                            parent_key = %parent_key,
                            "Skipping unknown parent key"
                        ),
                    }
                }
            }
        }

        Ok(ids)
    }

    async fn create_users(&self, seeds: &[UserSeed]) -> Result<HashMap<String, User>> {
        let mut users = HashMap::new();
        for seed in seeds {
            let Some(password) = seed.password.as_deref() else {
                warn!(email = %seed.email, "Skipping user seed without a password");
                continue;
            };
            let user = self
                .store
                .create_user(NewUser {
                    email: seed.email.trim().to_lowercase(),
                    password_hash: self.hasher.hash(password)?,
                    role: seed.role.clone(),
                    xp: seed.xp,
                    badges: seed.badges.clone(),
                })
                .await?;
            users.insert(seed.email.clone(), user);
        }
        Ok(users)
    }

    async fn create_progress(
        &self,
        progress: &ProgressSeedMap,
        users: &HashMap<String, User>,
        node_ids: &HashMap<String, i64>,
    ) -> Result<usize> {
        let mut created = 0;
        for (email, rows) in progress {
            let Some(user) = users.get(email) else {
                warn!(email = %email, "Skipping progress for unknown user");
                continue;
            };
            for row in rows {
                let Some(&node_id) = node_ids.get(&row.node_key) else {
                    warn!(node_key = %row.node_key, "Skipping progress for unknown node key");
                    continue;
                };
                let record = Progress {
                    status: row.status,
                    score: row.score,
                    ..Progress::new(user.id, node_id)
                };
                self.store.save_progress(&record).await?;
                created += 1;
            }
        }
        Ok(created)
    }
}

fn node_key(id: i64) -> String {
    format!("node_{id}")
}

fn load_fixture<T: serde::de::DeserializeOwned>(path: Option<&Path>, builtin: &str) -> Result<T> {
    match path {
        Some(path) if path.exists() => {
            info!(path = %path.display(), "Loading seed file");
            Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
        }
        Some(path) => {
            warn!(path = %path.display(), "Seed file not found, using built-in data");
            Ok(serde_json::from_str(builtin)?)
        }
        None => Ok(serde_json::from_str(builtin)?),
    }
}

fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value)?)?;
    Ok(path)
}
