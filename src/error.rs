//! Error taxonomy for the planner core and the catalog loader.

use thiserror::Error;

/// Errors surfaced by the planning core. All of these are data or
/// programmer errors; none are recovered internally. Catalog errors abort
/// a planning request before the search loop starts.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("level must be between 1 and 120, found {0}")]
    InvalidLevel(i32),

    #[error("experience cannot be negative, found {0}")]
    InvalidXp(i64),

    #[error("combat level goal cannot exceed 138, found {0}")]
    InvalidCombatGoal(i32),

    #[error("duplicate quest id {0} in catalog")]
    DuplicateQuestId(i64),

    #[error("unknown reward type '{0}'")]
    UnknownRewardType(String),

    #[error("invalid skill choice: {0}")]
    InvalidChoice(String),

    #[error("unknown skill '{0}'")]
    UnknownSkill(String),

    #[error("unknown quest difficulty '{0}'")]
    UnknownDifficulty(String),

    #[error("unknown prismatic lamp size '{0}'")]
    UnknownPrismaticSize(String),

    #[error("reward type '{reward_type}' requires field '{field}'")]
    MissingRewardField {
        reward_type: String,
        field: &'static str,
    },

    #[error("failed to read quest catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse quest catalog: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;
