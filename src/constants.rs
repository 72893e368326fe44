//! # Platform Constants
//!
//! Status enums, XP rules and badge thresholds that define how learners move
//! through a roadmap and how their effort is rewarded.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RoadmapError;

/// Progress of a single user on a single roadmap node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Whether the status counts as the learner working on the node
    pub fn is_engaged(&self) -> bool {
        matches!(self, Self::InProgress | Self::Completed)
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = RoadmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(RoadmapError::validation(format!(
                "Unknown progress status '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for ProgressStatus {
    type Error = RoadmapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Kind of roadmap node, used by the admin views for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    #[default]
    Task,
    Parent,
    Milestone,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Parent => "parent",
            Self::Milestone => "milestone",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = RoadmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(Self::Task),
            "parent" => Ok(Self::Parent),
            "milestone" => Ok(Self::Milestone),
            other => Err(RoadmapError::validation(format!("Unknown node type '{other}'"))),
        }
    }
}

impl TryFrom<String> for NodeType {
    type Error = RoadmapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Experience point rules
pub mod xp {
    /// XP granted for completing any node
    pub const BASE_COMPLETION_XP: i64 = 20;
    /// Extra XP granted when the completed node is a checkpoint
    pub const CHECKPOINT_BONUS_XP: i64 = 30;
    /// Scores are clamped to this range before the bonus is computed
    pub const MAX_SCORE: i32 = 100;
    /// Bonus is `score / SCORE_BONUS_DIVISOR`, so at most +10
    pub const SCORE_BONUS_DIVISOR: i32 = 10;

    /// XP awarded for completing a node with the given score
    pub fn completion_reward(checkpoint: bool, score: i32) -> i64 {
        let checkpoint_bonus = if checkpoint { CHECKPOINT_BONUS_XP } else { 0 };
        let score_bonus = i64::from(score.clamp(0, MAX_SCORE) / SCORE_BONUS_DIVISOR);
        BASE_COMPLETION_XP + checkpoint_bonus + score_bonus
    }
}

/// Badge thresholds in ascending XP order
pub const BADGE_THRESHOLDS: [(i64, &str); 4] = [
    (100, "Apprentice"),
    (300, "Journeyman"),
    (600, "Adept"),
    (1000, "Master"),
];

/// Role assigned to users who register without one
pub const DEFAULT_ROLE: &str = "intern";

/// Default bound for nested node serialization
pub const DEFAULT_MAX_DEPTH: usize = 10;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub mod system {
    pub const SERVICE_NAME: &str = "gamified-roadmap-backend";
    pub const DISPLAY_NAME: &str = "Gamified Roadmap Platform";
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Human readable title for a career direction
pub fn direction_title(direction: &str) -> String {
    match direction {
        "frontend" => "Frontend Developer".to_string(),
        "backend" => "Backend Developer".to_string(),
        "devops" => "DevOps Engineer".to_string(),
        "career" => "Career Growth".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}
