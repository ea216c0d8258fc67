//! Quest definition structures.
//!
//! Raw structs mirror the JSON catalog schema; `Quest` is the resolved
//! form the planner works with.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};
use crate::player::Player;
use crate::reward::{RawReward, XpReward};
use crate::skills::Skill;
use crate::skillset::SkillSet;
use crate::training::optimal_route_to_combat_level;

/// Quest difficulty tiers, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Novice,
    Intermediate,
    Experienced,
    Master,
    Grandmaster,
    Special,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Novice => "Novice",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Experienced => "Experienced",
            Difficulty::Master => "Master",
            Difficulty::Grandmaster => "Grandmaster",
            Difficulty::Special => "Special",
        }
    }

    /// Parse a difficulty name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "novice" => Ok(Difficulty::Novice),
            "intermediate" => Ok(Difficulty::Intermediate),
            "experienced" => Ok(Difficulty::Experienced),
            "master" => Ok(Difficulty::Master),
            "grandmaster" => Ok(Difficulty::Grandmaster),
            "special" => Ok(Difficulty::Special),
            _ => Err(PlanError::UnknownDifficulty(name.to_string())),
        }
    }
}

/// Raw quest data as it appears in the catalog JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuest {
    pub id: i64,
    pub name: String,
    pub difficulty: String,
    #[serde(default)]
    pub combat_requirement: i32,
    #[serde(default)]
    pub qp_requirement: i32,
    #[serde(default)]
    pub quest_requirements: Vec<i64>,
    #[serde(default)]
    pub skill_requirements: Vec<RawSkillRequirement>,
    #[serde(default)]
    pub quest_points: i32,
    #[serde(default)]
    pub xp_rewards: Vec<RawReward>,
}

/// A single `{skill, level}` requirement entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSkillRequirement {
    pub skill: String,
    pub level: i32,
}

/// A fully resolved quest.
#[derive(Debug, Clone)]
pub struct Quest {
    pub id: i64,
    pub name: String,
    pub difficulty: Difficulty,
    /// Combat level needed to attempt the quest; 0 if none.
    pub combat_requirement: i32,
    /// Quest points needed to attempt the quest.
    pub qp_requirement: i32,
    /// Quests that must be completed first.
    pub quest_prereqs: HashSet<i64>,
    /// Skill XP thresholds that must be met.
    pub skill_prereqs: SkillSet,
    /// Quest points granted on completion.
    pub quest_points: i32,
    pub rewards: Vec<Arc<XpReward>>,
    /// Training route that reaches `combat_requirement` from a fresh
    /// baseline; used when weighing candidates.
    pub combat_training_requirement: SkillSet,
    requirement_weight: u64,
}

impl Quest {
    /// Resolve a raw catalog entry. Fails on unknown difficulty, skill, or
    /// reward data, and on a combat requirement beyond the maximum.
    pub fn from_raw(raw: &RawQuest) -> Result<Self> {
        let difficulty = Difficulty::from_name(&raw.difficulty)?;

        let mut requirements = Vec::with_capacity(raw.skill_requirements.len());
        for requirement in &raw.skill_requirements {
            requirements.push((Skill::from_name(&requirement.skill)?, requirement.level));
        }
        let skill_prereqs = SkillSet::from_requirements(&requirements)?;

        let rewards = raw
            .xp_rewards
            .iter()
            .map(|reward| XpReward::from_raw(reward, raw.id).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        let combat_training_requirement =
            optimal_route_to_combat_level(raw.combat_requirement, &SkillSet::new())?;
        let requirement_weight =
            (&skill_prereqs + &combat_training_requirement).total();

        Ok(Self {
            id: raw.id,
            name: raw.name.clone(),
            difficulty,
            combat_requirement: raw.combat_requirement,
            qp_requirement: raw.qp_requirement,
            quest_prereqs: raw.quest_requirements.iter().copied().collect(),
            skill_prereqs,
            quest_points: raw.quest_points,
            rewards,
            combat_training_requirement,
            requirement_weight,
        })
    }

    /// Whether the player can start and finish this quest right now.
    pub fn satisfies_requirements(&self, player: &Player) -> bool {
        !player.completed.contains(&self.id)
            && self.skill_prereqs.le(&player.skills)
            && self.combat_requirement <= player.combat_level()
            && self.qp_requirement <= player.quest_points
            && self.quest_prereqs.is_subset(&player.completed)
    }

    /// Deterministic priority within the ready shell: difficulty first,
    /// then the total XP of the requirement surface, then id.
    pub fn planning_order(&self, other: &Quest) -> Ordering {
        self.difficulty
            .cmp(&other.difficulty)
            .then(self.requirement_weight.cmp(&other.requirement_weight))
            .then(self.id.cmp(&other.id))
    }

    #[cfg(test)]
    pub fn build_for_tests(
        id: i64,
        name: &str,
        difficulty: Difficulty,
        rewards: Vec<Arc<XpReward>>,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            difficulty,
            combat_requirement: 0,
            qp_requirement: 0,
            quest_prereqs: HashSet::new(),
            skill_prereqs: SkillSet::empty(),
            quest_points: 1,
            rewards,
            combat_training_requirement: SkillSet::empty(),
            requirement_weight: 0,
        }
    }
}
