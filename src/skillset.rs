//! Per-skill experience mapping with the counter semantics the planner
//! relies on: additive union, saturating subtraction, and a containment
//! partial order used for requirement checks.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Sub};

use crate::error::Result;
use crate::skills::{
    level_for_xp, min_xp_for_level, CombatLevels, Skill, ALL_SKILLS,
};

/// A mapping from skill to a non-negative XP amount.
///
/// Two constructions carry different meaning: [`SkillSet::new`] mentions
/// every skill at its initial XP and is what players start from, while
/// [`SkillSet::empty`] mentions nothing and is the right base for routes,
/// deltas, and gaps. The containment comparisons only quantify over skills
/// the right-hand side mentions, so the distinction matters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkillSet {
    xp: BTreeMap<Skill, u64>,
}

impl SkillSet {
    /// A set mentioning all 27 skills at their initial XP.
    pub fn new() -> Self {
        Self {
            xp: ALL_SKILLS
                .iter()
                .map(|&skill| (skill, skill.initial_xp()))
                .collect(),
        }
    }

    /// A set mentioning no skills at all.
    pub fn empty() -> Self {
        Self {
            xp: BTreeMap::new(),
        }
    }

    /// A one-entry set.
    pub fn single(skill: Skill, xp: u64) -> Self {
        let mut set = Self::empty();
        set.set(skill, xp);
        set
    }

    /// Build a requirement set from `(skill, level)` pairs, mapping each
    /// level through the XP table.
    pub fn from_requirements(requirements: &[(Skill, i32)]) -> Result<Self> {
        let mut set = Self::empty();
        for &(skill, level) in requirements {
            set.set(skill, min_xp_for_level(level)?);
        }
        Ok(set)
    }

    pub fn get(&self, skill: Skill) -> u64 {
        self.xp.get(&skill).copied().unwrap_or(0)
    }

    pub fn set(&mut self, skill: Skill, xp: u64) {
        self.xp.insert(skill, xp);
    }

    pub fn is_empty(&self) -> bool {
        self.xp.is_empty()
    }

    /// Sum of all mentioned XP values.
    pub fn total(&self) -> u64 {
        self.xp.values().sum()
    }

    /// Mentioned entries in skill-id order.
    pub fn iter(&self) -> impl Iterator<Item = (Skill, u64)> + '_ {
        self.xp.iter().map(|(&skill, &xp)| (skill, xp))
    }

    /// `self ≤ other` under containment: every skill `other` mentions must
    /// dominate `self`'s value there. Skills `other` does not mention do
    /// not constrain.
    pub fn le(&self, other: &SkillSet) -> bool {
        other.iter().all(|(skill, xp)| self.get(skill) <= xp)
    }

    /// Strict counterpart of [`SkillSet::le`].
    pub fn lt(&self, other: &SkillSet) -> bool {
        other.iter().all(|(skill, xp)| self.get(skill) < xp)
    }

    /// The entries with strictly positive XP.
    pub fn positive(&self) -> SkillSet {
        SkillSet {
            xp: self
                .xp
                .iter()
                .filter(|&(_, &xp)| xp > 0)
                .map(|(&skill, &xp)| (skill, xp))
                .collect(),
        }
    }

    /// Positive entries ordered by XP descending, ties by skill id.
    pub fn positive_by_deficit(&self) -> Vec<(Skill, u64)> {
        let mut entries: Vec<(Skill, u64)> =
            self.iter().filter(|&(_, xp)| xp > 0).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }

    /// Subtract `other` in place, saturating at zero and dropping entries
    /// that reach it.
    pub fn saturating_sub_assign(&mut self, other: &SkillSet) {
        for (skill, xp) in other.iter() {
            let remaining = self.get(skill).saturating_sub(xp);
            if remaining == 0 {
                self.xp.remove(&skill);
            } else {
                self.xp.insert(skill, remaining);
            }
        }
    }

    /// Levels of the eight combat skills, with the usual defaults for
    /// skills this set does not mention.
    pub fn combat_levels(&self) -> CombatLevels {
        let level = |skill: Skill, default: i32| {
            self.xp
                .get(&skill)
                .map_or(default, |&xp| level_for_xp(xp))
        };
        CombatLevels {
            attack: level(Skill::Attack, 1),
            strength: level(Skill::Strength, 1),
            defence: level(Skill::Defence, 1),
            ranged: level(Skill::Ranged, 1),
            magic: level(Skill::Magic, 1),
            prayer: level(Skill::Prayer, 1),
            constitution: level(Skill::Constitution, 10),
            summoning: level(Skill::Summoning, 1),
        }
    }
}

impl AddAssign<&SkillSet> for SkillSet {
    fn add_assign(&mut self, rhs: &SkillSet) {
        for (skill, xp) in rhs.iter() {
            *self.xp.entry(skill).or_insert(0) += xp;
        }
    }
}

impl Add for &SkillSet {
    type Output = SkillSet;

    /// Per-skill sum, keeping only strictly positive entries.
    fn add(self, rhs: &SkillSet) -> SkillSet {
        let mut result = self.clone();
        result += rhs;
        result.positive()
    }
}

impl Sub for &SkillSet {
    type Output = SkillSet;

    /// Per-skill saturating difference; entries that do not stay strictly
    /// positive are dropped.
    fn sub(self, rhs: &SkillSet) -> SkillSet {
        let mut result = self.clone();
        result.saturating_sub_assign(rhs);
        result.positive()
    }
}
