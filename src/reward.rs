//! Experience reward taxonomy.
//!
//! The catalog distinguishes six reward shapes. All of them share an
//! originating quest, a target skill mask, and a claim threshold; the tag
//! carries what varies. "Lamp" is the informal term for any reward held
//! unclaimed until the planner assigns it to a skill.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{PlanError, Result};
use crate::skills::{level_for_xp, min_xp_for_level, Skill, SkillMask};
use crate::skillset::SkillSet;

/// Prismatic lamp sizes, ordered smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrismaticSize {
    Small,
    Medium,
    Large,
    Huge,
}

impl PrismaticSize {
    pub fn name(self) -> &'static str {
        match self {
            PrismaticSize::Small => "Small",
            PrismaticSize::Medium => "Medium",
            PrismaticSize::Large => "Large",
            PrismaticSize::Huge => "Huge",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "small" => Ok(PrismaticSize::Small),
            "medium" => Ok(PrismaticSize::Medium),
            "large" => Ok(PrismaticSize::Large),
            "huge" => Ok(PrismaticSize::Huge),
            _ => Err(PlanError::UnknownPrismaticSize(name.to_string())),
        }
    }

    /// XP granted when used on a skill at `level`. The coefficients are
    /// used verbatim; the catalog depends on the truncation behavior.
    pub fn amount(self, level: i32) -> u64 {
        let l = f64::from(level);
        let xp = match self {
            PrismaticSize::Small => {
                -3e-6 * l.powi(5) + 6e-4 * l.powi(4) - 2.8e-2 * l.powi(3)
                    + 0.5823 * l.powi(2)
                    + 9.3594 * l
                    + 45.49
            }
            PrismaticSize::Medium => {
                -5e-6 * l.powi(5) + 1.1e-3 * l.powi(4) - 0.0559 * l.powi(3)
                    + 1.1645 * l.powi(2)
                    + 18.719 * l
                    + 90.981
            }
            PrismaticSize::Large => {
                -1e-5 * l.powi(5) + 2.3e-3 * l.powi(4) - 0.1118 * l.powi(3)
                    + 2.329 * l.powi(2)
                    + 37.437 * l
                    + 181.96
            }
            PrismaticSize::Huge => {
                -2e-5 * l.powi(5) + 4.6e-3 * l.powi(4) - 0.2237 * l.powi(3)
                    + 4.6581 * l.powi(2)
                    + 74.875 * l
                    + 363.92
            }
        };
        xp.floor() as u64
    }
}

impl std::fmt::Display for PrismaticSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Variant-specific reward fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardKind {
    /// Granted and applied the moment the quest completes.
    Immediate { skill: Skill, amount: u64 },
    /// A fixed amount the player assigns to one skill from the mask.
    Choice { amount: u64 },
    /// A fixed single-skill grant gated behind a level threshold.
    Claimable { skill: Skill, amount: u64, source: String },
    /// A choice lamp gated behind a level threshold on the chosen skill.
    ClaimableChoice { amount: u64, source: String },
    /// A choice lamp requiring the threshold in every masked skill.
    Tiered { amount: u64, source: String },
    /// A choice lamp whose value scales with the chosen skill's level.
    Prismatic { size: PrismaticSize },
}

/// An experience reward attached to a quest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpReward {
    /// Quest this reward came from.
    pub quest_id: i64,
    /// Skills the reward can target.
    pub skills: SkillMask,
    /// XP threshold (in the relevant skill or skills) before the reward
    /// can be claimed. Zero for Immediate rewards.
    pub minimum_xp: u64,
    pub kind: RewardKind,
}

/// Raw reward entry as it appears in the catalog JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReward {
    #[serde(rename = "type")]
    pub reward_type: String,
    pub skills: String,
    pub amount: Option<i64>,
    #[serde(default = "default_minimum_level")]
    pub minimum_level: i32,
    pub source: Option<String>,
    pub size: Option<String>,
}

fn default_minimum_level() -> i32 {
    1
}

impl XpReward {
    /// Resolve a raw catalog entry. `Tiered` entries are parsed as
    /// ClaimableChoice; the planner treats the two identically.
    pub fn from_raw(raw: &RawReward, quest_id: i64) -> Result<Self> {
        let skills = SkillMask::parse(&raw.skills)?;
        let amount = || -> Result<u64> {
            let amount = raw.amount.ok_or_else(|| PlanError::MissingRewardField {
                reward_type: raw.reward_type.clone(),
                field: "amount",
            })?;
            u64::try_from(amount).map_err(|_| PlanError::InvalidXp(amount))
        };
        let source = || -> Result<String> {
            raw.source.clone().ok_or_else(|| PlanError::MissingRewardField {
                reward_type: raw.reward_type.clone(),
                field: "source",
            })
        };
        let first_skill = skills
            .iter()
            .next()
            .ok_or_else(|| PlanError::UnknownSkill(raw.skills.clone()))?;

        let (minimum_xp, kind) = match raw.reward_type.as_str() {
            "Immediate" => (
                0,
                RewardKind::Immediate {
                    skill: first_skill,
                    amount: amount()?,
                },
            ),
            "Choice" => (
                min_xp_for_level(raw.minimum_level)?,
                RewardKind::Choice { amount: amount()? },
            ),
            "Claimable" => (
                min_xp_for_level(raw.minimum_level)?,
                RewardKind::Claimable {
                    skill: first_skill,
                    amount: amount()?,
                    source: source()?,
                },
            ),
            "ClaimableChoice" | "Tiered" => (
                min_xp_for_level(raw.minimum_level)?,
                RewardKind::ClaimableChoice {
                    amount: amount()?,
                    source: source()?,
                },
            ),
            "Prismatic" => {
                let size = raw.size.as_deref().ok_or_else(|| {
                    PlanError::MissingRewardField {
                        reward_type: raw.reward_type.clone(),
                        field: "size",
                    }
                })?;
                (
                    min_xp_for_level(raw.minimum_level)?,
                    RewardKind::Prismatic {
                        size: PrismaticSize::from_name(size)?,
                    },
                )
            }
            _ => return Err(PlanError::UnknownRewardType(raw.reward_type.clone())),
        };

        Ok(Self {
            quest_id,
            skills,
            minimum_xp,
            kind,
        })
    }

    /// XP this reward grants. Constant for everything except Prismatic,
    /// which depends on the chosen skill's current level.
    pub fn amount(&self, player_skills: &SkillSet, skill_choice: Option<Skill>) -> u64 {
        match &self.kind {
            RewardKind::Immediate { amount, .. }
            | RewardKind::Choice { amount }
            | RewardKind::Claimable { amount, .. }
            | RewardKind::ClaimableChoice { amount, .. }
            | RewardKind::Tiered { amount, .. } => *amount,
            RewardKind::Prismatic { size } => skill_choice.map_or(0, |skill| {
                size.amount(level_for_xp(player_skills.get(skill)))
            }),
        }
    }

    /// Whether the reward can be claimed at the given stats, optionally
    /// toward a specific skill.
    pub fn is_claimable(&self, player_skills: &SkillSet, skill_choice: Option<Skill>) -> bool {
        match &self.kind {
            RewardKind::Immediate { .. } => true,
            RewardKind::Claimable { skill, .. } => {
                player_skills.get(*skill) >= self.minimum_xp
            }
            RewardKind::Choice { .. }
            | RewardKind::ClaimableChoice { .. }
            | RewardKind::Prismatic { .. } => skill_choice.is_some_and(|skill| {
                self.skills.contains(skill) && player_skills.get(skill) >= self.minimum_xp
            }),
            RewardKind::Tiered { .. } => self
                .skills
                .iter()
                .all(|skill| player_skills.get(skill) >= self.minimum_xp),
        }
    }

    /// The XP delta claiming this reward grants. Choice-style rewards
    /// require a skill from the mask; Immediate and Claimable rewards
    /// ignore the choice.
    pub fn get_reward(
        &self,
        skill_choice: Option<Skill>,
        player_skills: &SkillSet,
    ) -> Result<SkillSet> {
        match &self.kind {
            RewardKind::Immediate { skill, amount }
            | RewardKind::Claimable { skill, amount, .. } => {
                Ok(SkillSet::single(*skill, *amount))
            }
            RewardKind::Choice { amount }
            | RewardKind::ClaimableChoice { amount, .. }
            | RewardKind::Tiered { amount, .. } => {
                let skill = self.validate_choice(skill_choice)?;
                Ok(SkillSet::single(skill, *amount))
            }
            RewardKind::Prismatic { size } => {
                let skill = self.validate_choice(skill_choice)?;
                let amount = size.amount(level_for_xp(player_skills.get(skill)));
                Ok(SkillSet::single(skill, amount))
            }
        }
    }

    fn validate_choice(&self, skill_choice: Option<Skill>) -> Result<Skill> {
        match skill_choice {
            Some(skill) if self.skills.contains(skill) => Ok(skill),
            Some(skill) => Err(PlanError::InvalidChoice(skill.name().to_string())),
            None => Err(PlanError::InvalidChoice("no skill given".to_string())),
        }
    }

    fn prismatic_size(&self) -> Option<PrismaticSize> {
        match self.kind {
            RewardKind::Prismatic { size } => Some(size),
            _ => None,
        }
    }

    fn fixed_amount(&self) -> u64 {
        match &self.kind {
            RewardKind::Immediate { amount, .. }
            | RewardKind::Choice { amount }
            | RewardKind::Claimable { amount, .. }
            | RewardKind::ClaimableChoice { amount, .. }
            | RewardKind::Tiered { amount, .. } => *amount,
            RewardKind::Prismatic { .. } => 0,
        }
    }

    /// Tie-break ordering for lamp selection: fixed rewards by amount,
    /// every fixed reward below every Prismatic, Prismatics by size.
    pub fn cmp_priority(&self, other: &XpReward) -> Ordering {
        match (self.prismatic_size(), other.prismatic_size()) {
            (None, None) => self.fixed_amount().cmp(&other.fixed_amount()),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(&b),
        }
    }
}

impl std::fmt::Display for XpReward {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            RewardKind::Immediate { skill, amount } => {
                write!(f, "{amount} {skill} xp")
            }
            RewardKind::Choice { amount } => write!(f, "{amount} xp reward"),
            RewardKind::Claimable { skill, amount, source } => write!(
                f,
                "Claim {amount} {skill} xp from {source} (quest {})",
                self.quest_id
            ),
            RewardKind::ClaimableChoice { amount, source }
            | RewardKind::Tiered { amount, source } => write!(
                f,
                "{amount} xp reward from {source} (quest {})",
                self.quest_id
            ),
            RewardKind::Prismatic { size } => write!(f, "{size} xp lamp"),
        }
    }
}

/// A choice-style reward together with the skill it was spent on.
#[derive(Debug, Clone)]
pub struct ClaimedChoice {
    pub reward: Arc<XpReward>,
    pub skill: Skill,
}

impl std::fmt::Display for ClaimedChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Use {} on {}", self.reward, self.skill)
    }
}
