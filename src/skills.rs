//! Skill definitions and experience arithmetic.
//!
//! Skills follow RuneScape-style mechanics: a fixed experience table maps
//! levels 1-120 to minimum XP totals, and the combat level is derived from
//! the eight combat skills. Everything here is integer-exact; the catalog's
//! behavior depends on it.

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// Highest level a skill can be trained to.
pub const MAX_TRAINING_LEVEL: i32 = 99;

/// Highest level the experience table covers.
pub const MAX_LEVEL: i32 = 120;

/// Minimum XP totals for levels 1..=120. `XP_TABLE[level - 1]` is the
/// smallest XP at which `level` is reached. Strictly increasing.
const XP_TABLE: [u64; 120] = [
    0, 83, 174, 276, 388, 512, 650, 801, 969, 1154, 1358, 1584, 1833, 2107,
    2411, 2746, 3115, 3523, 3973, 4470, 5018, 5624, 6291, 7028, 7842, 8740,
    9730, 10824, 12031, 13363, 14833, 16456, 18247, 20224, 22406, 24815,
    27473, 30408, 33648, 37224, 41171, 45529, 50339, 55649, 61512, 67983,
    75127, 83014, 91721, 101333, 111945, 123660, 136594, 150872, 166636,
    184040, 203254, 224466, 247866, 273742, 302288, 333804, 368599, 407015,
    449428, 496254, 547953, 605032, 668051, 737627, 814445, 899257, 992895,
    1096278, 1210421, 1336443, 1475581, 1629200, 1798808, 1986068, 2192818,
    2421087, 2673114, 2951373, 3258594, 3597792, 3972294, 4385776, 4842295,
    5346332, 5902831, 6517253, 7195629, 7944614, 8771558, 9684577, 10692629,
    11805606, 13034431, 14391160, 15889109, 17542976, 19368992, 21385073,
    23611006, 26068632, 26782069, 31777943, 35085654, 38737661, 42769801,
    47221641, 52136869, 57563718, 63555443, 70170840, 77474828, 85539082,
    94442737, 104273167,
];

/// The 27 trainable skills. The discriminant doubles as the skill's bit
/// position in a [`SkillMask`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Skill {
    Attack,
    Strength,
    Defence,
    Ranged,
    Prayer,
    Magic,
    Constitution,
    Crafting,
    Mining,
    Smithing,
    Fishing,
    Cooking,
    Firemaking,
    Woodcutting,
    Runecrafting,
    Dungeoneering,
    Fletching,
    Agility,
    Herblore,
    Thieving,
    Slayer,
    Farming,
    Construction,
    Hunter,
    Summoning,
    Divination,
    Archaeology,
}

/// All skills in id order.
pub const ALL_SKILLS: [Skill; 27] = [
    Skill::Attack,
    Skill::Strength,
    Skill::Defence,
    Skill::Ranged,
    Skill::Prayer,
    Skill::Magic,
    Skill::Constitution,
    Skill::Crafting,
    Skill::Mining,
    Skill::Smithing,
    Skill::Fishing,
    Skill::Cooking,
    Skill::Firemaking,
    Skill::Woodcutting,
    Skill::Runecrafting,
    Skill::Dungeoneering,
    Skill::Fletching,
    Skill::Agility,
    Skill::Herblore,
    Skill::Thieving,
    Skill::Slayer,
    Skill::Farming,
    Skill::Construction,
    Skill::Hunter,
    Skill::Summoning,
    Skill::Divination,
    Skill::Archaeology,
];

impl Skill {
    pub fn name(self) -> &'static str {
        match self {
            Skill::Attack => "Attack",
            Skill::Strength => "Strength",
            Skill::Defence => "Defence",
            Skill::Ranged => "Ranged",
            Skill::Prayer => "Prayer",
            Skill::Magic => "Magic",
            Skill::Constitution => "Constitution",
            Skill::Crafting => "Crafting",
            Skill::Mining => "Mining",
            Skill::Smithing => "Smithing",
            Skill::Fishing => "Fishing",
            Skill::Cooking => "Cooking",
            Skill::Firemaking => "Firemaking",
            Skill::Woodcutting => "Woodcutting",
            Skill::Runecrafting => "Runecrafting",
            Skill::Dungeoneering => "Dungeoneering",
            Skill::Fletching => "Fletching",
            Skill::Agility => "Agility",
            Skill::Herblore => "Herblore",
            Skill::Thieving => "Thieving",
            Skill::Slayer => "Slayer",
            Skill::Farming => "Farming",
            Skill::Construction => "Construction",
            Skill::Hunter => "Hunter",
            Skill::Summoning => "Summoning",
            Skill::Divination => "Divination",
            Skill::Archaeology => "Archaeology",
        }
    }

    /// Parse a skill from its name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self> {
        ALL_SKILLS
            .iter()
            .copied()
            .find(|skill| skill.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| PlanError::UnknownSkill(name.to_string()))
    }

    /// XP a fresh player starts with in this skill. Zero for everything
    /// except Constitution, which starts at level 10.
    pub fn initial_xp(self) -> u64 {
        match self {
            Skill::Constitution => XP_TABLE[9],
            _ => 0,
        }
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SkillMask
// ============================================================================

/// A set of skills packed into a 32-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SkillMask(u32);

impl SkillMask {
    pub const NONE: SkillMask = SkillMask(0);

    pub fn contains(self, skill: Skill) -> bool {
        self.0 & skill.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Skills in the mask, in id order.
    pub fn iter(self) -> impl Iterator<Item = Skill> {
        ALL_SKILLS
            .iter()
            .copied()
            .filter(move |skill| self.contains(*skill))
    }

    /// Parse a comma-separated, case-insensitive list of skill names.
    pub fn parse(names: &str) -> Result<Self> {
        let mut mask = SkillMask::NONE;
        for token in names.split(',') {
            mask |= Skill::from_name(token.trim())?.into();
        }
        Ok(mask)
    }
}

impl From<Skill> for SkillMask {
    fn from(skill: Skill) -> Self {
        SkillMask(skill.bit())
    }
}

impl std::ops::BitOr for SkillMask {
    type Output = SkillMask;

    fn bitor(self, rhs: SkillMask) -> SkillMask {
        SkillMask(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for SkillMask {
    fn bitor_assign(&mut self, rhs: SkillMask) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for SkillMask {
    type Output = SkillMask;

    fn bitand(self, rhs: SkillMask) -> SkillMask {
        SkillMask(self.0 & rhs.0)
    }
}

impl std::fmt::Display for SkillMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for skill in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(skill.name())?;
            first = false;
        }
        Ok(())
    }
}

// ============================================================================
// Experience arithmetic
// ============================================================================

/// Minimum XP at which `level` is reached.
pub fn min_xp_for_level(level: i32) -> Result<u64> {
    if !(1..=MAX_LEVEL).contains(&level) {
        return Err(PlanError::InvalidLevel(level));
    }
    Ok(XP_TABLE[(level - 1) as usize])
}

/// Level reached at `xp`: the largest level whose threshold is at or below
/// `xp`, saturating at 120.
pub fn level_for_xp(xp: u64) -> i32 {
    XP_TABLE.partition_point(|&threshold| threshold <= xp) as i32
}

/// XP still needed to reach `target_level` from `current_xp`.
pub fn xp_to_level(target_level: i32, current_xp: u64) -> Result<u64> {
    Ok(min_xp_for_level(target_level)?.saturating_sub(current_xp))
}

/// Levels of the eight combat skills. Absent skills default to 1, except
/// Constitution which defaults to 10.
#[derive(Debug, Clone, Copy)]
pub struct CombatLevels {
    pub attack: i32,
    pub strength: i32,
    pub defence: i32,
    pub ranged: i32,
    pub magic: i32,
    pub prayer: i32,
    pub constitution: i32,
    pub summoning: i32,
}

impl Default for CombatLevels {
    fn default() -> Self {
        Self {
            attack: 1,
            strength: 1,
            defence: 1,
            ranged: 1,
            magic: 1,
            prayer: 1,
            constitution: 10,
            summoning: 1,
        }
    }
}

fn combat_level_unfloored(levels: &CombatLevels) -> f64 {
    let dominant_style = 1.3
        * f64::from(
            (levels.attack + levels.strength)
                .max(2 * levels.magic)
                .max(2 * levels.ranged),
        );

    0.25 * (dominant_style
        + f64::from(
            levels.defence + levels.constitution + levels.prayer / 2 + levels.summoning / 2,
        ))
}

/// Combat level for a set of combat skill levels.
pub fn calculate_combat_level(levels: &CombatLevels) -> i32 {
    combat_level_unfloored(levels).floor() as i32
}

/// For each combat skill, the additional levels in that skill alone that
/// would raise the floored combat level by exactly one.
///
/// Adapted from the combat level module on the game's wiki: the fractional
/// part of the raw combat level determines how far each term has to move.
pub fn levels_for_combat_increase(levels: &CombatLevels) -> [(Skill, i32); 8] {
    let attack_strength = levels.attack + levels.strength;
    let fractional = combat_level_unfloored(levels) % 1.0;

    let defence = ((1.0 - fractional) * 4.0).ceil() as i32;
    let prayer = defence * 2 - levels.prayer % 2;
    let summoning = defence * 2 - levels.summoning % 2;

    let (attack, magic, ranged);
    if attack_strength >= 2 * levels.magic && attack_strength >= 2 * levels.ranged {
        // Melee pair dominates.
        attack = ((1.0 - fractional) / 0.325).ceil() as i32;
        magic = (f64::from(attack_strength - 2 * levels.magic) / 2.0
            + (1.0 - fractional) / 0.65)
            .ceil() as i32;
        ranged = (f64::from(attack_strength - 2 * levels.ranged) / 2.0
            + (1.0 - fractional) / 0.65)
            .ceil() as i32;
    } else {
        // Magic or ranged dominates; the weaker style has to cover the gap
        // to the stronger one on top of its own increment.
        attack = 2 * levels.magic.max(levels.ranged) - attack_strength
            + ((1.0 - fractional) / 0.325).ceil() as i32;
        let dominant_increase = ((1.0 - fractional) / 0.65).ceil() as i32;
        if levels.ranged > levels.magic {
            ranged = dominant_increase;
            magic = levels.ranged - levels.magic + ranged;
        } else {
            magic = dominant_increase;
            ranged = levels.magic - levels.ranged + magic;
        }
    }

    [
        (Skill::Attack, attack),
        (Skill::Strength, attack),
        (Skill::Magic, magic),
        (Skill::Ranged, ranged),
        (Skill::Defence, defence),
        (Skill::Constitution, defence),
        (Skill::Prayer, prayer),
        (Skill::Summoning, summoning),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xp_table_boundaries() {
        assert_eq!(min_xp_for_level(1).unwrap(), 0);
        assert_eq!(min_xp_for_level(2).unwrap(), 83);
        assert_eq!(min_xp_for_level(10).unwrap(), 1154);
        assert_eq!(min_xp_for_level(40).unwrap(), 37224);
        assert_eq!(min_xp_for_level(99).unwrap(), 13034431);
        assert_eq!(min_xp_for_level(120).unwrap(), 104273167);

        assert!(matches!(min_xp_for_level(0), Err(PlanError::InvalidLevel(0))));
        assert!(matches!(min_xp_for_level(121), Err(PlanError::InvalidLevel(121))));
    }

    #[test]
    fn test_xp_table_strictly_increasing() {
        for window in XP_TABLE.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn test_level_for_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(82), 1);
        assert_eq!(level_for_xp(83), 2);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(104273167), 120);
        assert_eq!(level_for_xp(104273168), 120);
        assert_eq!(level_for_xp(u64::MAX), 120);
    }

    #[test]
    fn test_level_xp_round_trip() {
        for level in 1..=120 {
            let xp = min_xp_for_level(level).unwrap();
            assert_eq!(level_for_xp(xp), level);
            // One XP short of the threshold is still the previous level.
            if level > 1 {
                assert_eq!(level_for_xp(xp - 1), level - 1);
            }
        }
    }

    #[test]
    fn test_level_floor_invariant() {
        for xp in [0u64, 1, 83, 5000, 37223, 37224, 1_000_000, 200_000_000] {
            let level = level_for_xp(xp);
            assert!(min_xp_for_level(level).unwrap() <= xp);
            if level < 120 {
                assert!(min_xp_for_level(level + 1).unwrap() > xp);
            }
        }
    }

    #[test]
    fn test_xp_to_level() {
        assert_eq!(xp_to_level(40, 30000).unwrap(), 7224);
        assert_eq!(xp_to_level(40, 37224).unwrap(), 0);
        assert_eq!(xp_to_level(40, 50000).unwrap(), 0);
        assert_eq!(xp_to_level(10, 0).unwrap(), 1154);
    }

    #[test]
    fn test_skill_parsing() {
        assert_eq!(Skill::from_name("attack").unwrap(), Skill::Attack);
        assert_eq!(Skill::from_name("CONSTITUTION").unwrap(), Skill::Constitution);
        assert!(Skill::from_name("sailing").is_err());
    }

    #[test]
    fn test_initial_xp() {
        assert_eq!(Skill::Attack.initial_xp(), 0);
        assert_eq!(Skill::Constitution.initial_xp(), 1154);
    }

    #[test]
    fn test_mask_operations() {
        let melee = SkillMask::from(Skill::Attack) | Skill::Strength.into();
        assert!(melee.contains(Skill::Attack));
        assert!(!melee.contains(Skill::Magic));
        assert_eq!(melee.len(), 2);

        let magic: SkillMask = Skill::Magic.into();
        assert!((melee & magic).is_empty());
        assert_eq!((melee | magic).len(), 3);
    }

    #[test]
    fn test_mask_round_trip() {
        let masks = [
            SkillMask::from(Skill::Attack),
            SkillMask::from(Skill::Attack) | Skill::Strength.into() | Skill::Defence.into(),
            SkillMask::from(Skill::Archaeology) | Skill::Constitution.into(),
        ];
        for mask in masks {
            assert_eq!(SkillMask::parse(&mask.to_string()).unwrap(), mask);
        }
    }

    #[test]
    fn test_mask_parse_case_insensitive() {
        let mask = SkillMask::parse("attack, STRENGTH").unwrap();
        assert!(mask.contains(Skill::Attack));
        assert!(mask.contains(Skill::Strength));
        assert!(SkillMask::parse("attack,bogus").is_err());
    }

    #[test]
    fn test_combat_level_fresh() {
        // Fresh stats: everything 1 except Constitution 10.
        assert_eq!(calculate_combat_level(&CombatLevels::default()), 3);
    }

    #[test]
    fn test_combat_level_melee() {
        let levels = CombatLevels {
            attack: 40,
            strength: 40,
            defence: 40,
            constitution: 40,
            ..CombatLevels::default()
        };
        // 0.25 * (1.3 * 80 + 40 + 40) = 46
        assert_eq!(calculate_combat_level(&levels), 46);
    }

    #[test]
    fn test_combat_level_magic_dominant() {
        let levels = CombatLevels {
            magic: 60,
            ..CombatLevels::default()
        };
        // 0.25 * (1.3 * 120 + 1 + 10) = 41.75
        assert_eq!(calculate_combat_level(&levels), 41);
    }

    #[test]
    fn test_combat_increase_fresh() {
        let increments = levels_for_combat_increase(&CombatLevels::default());
        let get = |skill: Skill| {
            increments
                .iter()
                .find(|(s, _)| *s == skill)
                .map(|(_, delta)| *delta)
                .unwrap()
        };
        // Raw combat is 3.4 for a fresh player, so the fraction is 0.4.
        assert_eq!(get(Skill::Attack), 2);
        assert_eq!(get(Skill::Strength), 2);
        assert_eq!(get(Skill::Magic), 1);
        assert_eq!(get(Skill::Ranged), 1);
        assert_eq!(get(Skill::Defence), 3);
        assert_eq!(get(Skill::Constitution), 3);
        assert_eq!(get(Skill::Prayer), 5);
        assert_eq!(get(Skill::Summoning), 5);
    }

    #[test]
    fn test_combat_increase_raises_level() {
        // Applying any single skill's increment must raise the floored
        // combat level by at least one.
        let base = CombatLevels {
            attack: 30,
            strength: 28,
            defence: 25,
            ranged: 10,
            magic: 15,
            prayer: 20,
            constitution: 27,
            summoning: 5,
        };
        let before = calculate_combat_level(&base);
        for (skill, delta) in levels_for_combat_increase(&base) {
            let mut bumped = base;
            match skill {
                Skill::Attack => bumped.attack += delta,
                Skill::Strength => bumped.strength += delta,
                Skill::Defence => bumped.defence += delta,
                Skill::Ranged => bumped.ranged += delta,
                Skill::Magic => bumped.magic += delta,
                Skill::Prayer => bumped.prayer += delta,
                Skill::Constitution => bumped.constitution += delta,
                Skill::Summoning => bumped.summoning += delta,
                _ => unreachable!(),
            }
            assert!(
                calculate_combat_level(&bumped) > before,
                "{skill} +{delta} did not raise combat level"
            );
        }
    }
}
