//! Player state the planner evolves while searching.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::quest::Quest;
use crate::reward::{RewardKind, XpReward};
use crate::skills::calculate_combat_level;
use crate::skillset::SkillSet;

/// A player's skills, quest points, and completion record.
#[derive(Debug, Clone)]
pub struct Player {
    pub skills: SkillSet,
    pub quest_points: i32,
    pub completed: HashSet<i64>,
    explicit_combat_level: i32,
}

impl Player {
    /// A fresh player: initial skills, one quest point, nothing completed.
    pub fn new() -> Self {
        Self::with_skills(SkillSet::new())
    }

    pub fn with_skills(skills: SkillSet) -> Self {
        Self {
            skills,
            quest_points: 1,
            completed: HashSet::new(),
            explicit_combat_level: 1,
        }
    }

    /// Combat level derived from the current skills, floored at the
    /// explicitly set level.
    pub fn combat_level(&self) -> i32 {
        self.explicit_combat_level
            .max(calculate_combat_level(&self.skills.combat_levels()))
    }

    /// Raise the combat level floor independently of trained skills.
    pub fn set_combat_level(&mut self, level: i32) {
        self.explicit_combat_level = level;
    }

    /// Mark a quest as already done without replaying its rewards.
    pub fn mark_completed(&mut self, quest_id: i64) {
        self.completed.insert(quest_id);
    }

    /// Complete a quest: record it, bank its quest points, apply every
    /// reward claimable right now, and hand back the rest for hoarding.
    ///
    /// Returns `(claimed, hoarded)` in the quest's reward order.
    pub fn complete_quest(
        &mut self,
        quest: &Quest,
    ) -> Result<(Vec<Arc<XpReward>>, Vec<Arc<XpReward>>)> {
        self.completed.insert(quest.id);
        self.quest_points += quest.quest_points;

        let mut claimed = Vec::new();
        let mut hoarded = Vec::new();
        for reward in &quest.rewards {
            match reward.kind {
                RewardKind::Immediate { .. } => {
                    let delta = reward.get_reward(None, &self.skills)?;
                    self.skills += &delta;
                    claimed.push(Arc::clone(reward));
                }
                RewardKind::Claimable { .. } if reward.is_claimable(&self.skills, None) => {
                    let delta = reward.get_reward(None, &self.skills)?;
                    self.skills += &delta;
                    claimed.push(Arc::clone(reward));
                }
                _ => hoarded.push(Arc::clone(reward)),
            }
        }
        Ok((claimed, hoarded))
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::{Difficulty, Quest};
    use crate::reward::RawReward;
    use crate::skills::Skill;

    fn quest_with_rewards(rewards: Vec<RawReward>) -> Quest {
        Quest::build_for_tests(
            1,
            "Cook's Errand",
            Difficulty::Novice,
            rewards
                .iter()
                .map(|raw| XpReward::from_raw(raw, 1).map(Arc::new))
                .collect::<Result<Vec<_>>>()
                .unwrap(),
        )
    }

    fn raw_reward(reward_type: &str, skills: &str, minimum_level: i32) -> RawReward {
        RawReward {
            reward_type: reward_type.to_string(),
            skills: skills.to_string(),
            amount: Some(500),
            minimum_level,
            source: Some("a chest".to_string()),
            size: None,
        }
    }

    #[test]
    fn test_fresh_player() {
        let player = Player::new();
        assert_eq!(player.quest_points, 1);
        assert_eq!(player.combat_level(), 3);
        assert!(player.completed.is_empty());
    }

    #[test]
    fn test_explicit_combat_floor() {
        let mut player = Player::new();
        player.set_combat_level(20);
        assert_eq!(player.combat_level(), 20);
    }

    #[test]
    fn test_complete_quest_applies_immediate() {
        let quest = quest_with_rewards(vec![raw_reward("Immediate", "Attack", 1)]);
        let mut player = Player::new();
        let (claimed, hoarded) = player.complete_quest(&quest).unwrap();

        assert_eq!(claimed.len(), 1);
        assert!(hoarded.is_empty());
        assert_eq!(player.skills.get(Skill::Attack), 500);
        assert!(player.completed.contains(&1));
    }

    #[test]
    fn test_complete_quest_hoards_gated_claimable() {
        let quest = quest_with_rewards(vec![raw_reward("Claimable", "Strength", 10)]);
        let mut player = Player::new();
        let (claimed, hoarded) = player.complete_quest(&quest).unwrap();

        assert!(claimed.is_empty());
        assert_eq!(hoarded.len(), 1);
        assert_eq!(player.skills.get(Skill::Strength), 0);
    }

    #[test]
    fn test_complete_quest_claims_met_claimable() {
        let quest = quest_with_rewards(vec![raw_reward("Claimable", "Strength", 10)]);
        let mut player = Player::new();
        player.skills.set(Skill::Strength, 1154);
        let (claimed, hoarded) = player.complete_quest(&quest).unwrap();

        assert_eq!(claimed.len(), 1);
        assert!(hoarded.is_empty());
        assert_eq!(player.skills.get(Skill::Strength), 1654);
    }

    #[test]
    fn test_complete_quest_hoards_choices() {
        let quest = quest_with_rewards(vec![raw_reward("Choice", "Attack,Strength", 1)]);
        let mut player = Player::new();
        let (claimed, hoarded) = player.complete_quest(&quest).unwrap();
        assert!(claimed.is_empty());
        assert_eq!(hoarded.len(), 1);
    }
}
