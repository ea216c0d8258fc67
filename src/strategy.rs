//! The plan the search produces: an ordered sequence of quests, each
//! carrying the rewards claimed, lamps applied, and training done around
//! its completion.

use std::sync::Arc;

use tracing::warn;

use crate::quest::Quest;
use crate::reward::{ClaimedChoice, XpReward};
use crate::skills::Skill;

/// One step recorded against a quest entry.
#[derive(Debug, Clone)]
pub enum PlanStep {
    /// A reward claimed outright.
    Reward(Arc<XpReward>),
    /// A hoarded lamp spent on a chosen skill.
    Lamp(ClaimedChoice),
    /// Direct training to a level.
    Training { skill: Skill, level: i32, xp: u64 },
}

impl std::fmt::Display for PlanStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanStep::Reward(reward) => write!(f, "{reward}"),
            PlanStep::Lamp(claimed) => write!(f, "{claimed}"),
            PlanStep::Training { skill, level, xp } => {
                write!(f, "Train {skill} to level {level} (+{xp} xp)")
            }
        }
    }
}

/// A quest with the steps attributed to it.
#[derive(Debug, Clone)]
pub struct StrategyItem {
    pub quest: Arc<Quest>,
    pub steps: Vec<PlanStep>,
}

/// An ordered quest plan, addressable by quest id and by the most
/// recently added entry.
#[derive(Debug, Clone, Default)]
pub struct QuestStrategy {
    items: Vec<StrategyItem>,
}

impl QuestStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StrategyItem> {
        self.items.iter()
    }

    pub fn get(&self, quest_id: i64) -> Option<&StrategyItem> {
        self.items.iter().find(|item| item.quest.id == quest_id)
    }

    /// Append a new quest entry with its initial steps.
    pub fn add_quest(&mut self, quest: Arc<Quest>, steps: Vec<PlanStep>) {
        self.items.push(StrategyItem { quest, steps });
    }

    /// Append a step to the most recent quest entry.
    pub fn add_step(&mut self, step: PlanStep) {
        if let Some(item) = self.items.last_mut() {
            item.steps.push(step);
        } else {
            warn!("dropping plan step with no quest entry to attach to: {step}");
        }
    }

    /// Prepend a step into the entry of the quest it originated from.
    pub fn push_step(&mut self, quest_id: i64, step: PlanStep) {
        if let Some(item) = self.items.iter_mut().find(|item| item.quest.id == quest_id) {
            item.steps.insert(0, step);
        } else {
            warn!("dropping plan step for unknown quest entry {quest_id}: {step}");
        }
    }
}
