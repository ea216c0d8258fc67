//! Combat-training router: the cheapest XP allocation that raises a
//! player's combat level to a goal.
//!
//! Each round looks at how many levels in each combat skill would buy the
//! next combat level, prices those levels in XP from the current stats,
//! and trains the cheapest option. Attack/Strength and
//! Constitution/Defence are treated as pairs: the level gap between the
//! two is closed first, then the remainder is split between them.

use tracing::warn;

use crate::error::{PlanError, Result};
use crate::skills::{
    calculate_combat_level, level_for_xp, levels_for_combat_increase, xp_to_level, Skill,
    MAX_TRAINING_LEVEL,
};
use crate::skillset::SkillSet;

/// Highest reachable combat level (all eight skills at 99).
pub const MAX_COMBAT_LEVEL: i32 = 138;

/// Compute a training route that raises `current`'s combat level to at
/// least `goal`. The route may overshoot slightly due to rounding; it
/// never trains a skill past level 99.
pub fn optimal_route_to_combat_level(goal: i32, current: &SkillSet) -> Result<SkillSet> {
    let mut route = SkillSet::empty();
    if goal < 3 {
        return Ok(route);
    }
    if goal > MAX_COMBAT_LEVEL {
        return Err(PlanError::InvalidCombatGoal(goal));
    }
    if goal == 3 {
        return Ok(SkillSet::new());
    }

    let mut current = current.clone();
    while calculate_combat_level(&current.combat_levels()) < goal {
        let increments = levels_for_combat_increase(&current.combat_levels());

        let mut costs: Vec<(Skill, u64)> = Vec::with_capacity(8);
        for (skill, levels_needed) in increments {
            match skill {
                Skill::Constitution | Skill::Defence => {
                    let (higher, lower) =
                        higher_and_lower(&current, Skill::Constitution, Skill::Defence);
                    let (for_higher, for_lower) =
                        advance_pair_in_step(&current, higher, levels_needed, lower)?;
                    upsert_cost(&mut costs, higher, for_higher);
                    upsert_cost(&mut costs, lower, for_lower);
                }
                Skill::Attack | Skill::Strength => {
                    let (higher, lower) =
                        higher_and_lower(&current, Skill::Attack, Skill::Strength);
                    let (for_higher, for_lower) =
                        advance_pair_in_step(&current, higher, levels_needed, lower)?;
                    upsert_cost(&mut costs, higher, for_higher);
                    upsert_cost(&mut costs, lower, for_lower);
                }
                _ => {
                    let level = level_for_xp(current.get(skill));
                    let target = (level + levels_needed).min(MAX_TRAINING_LEVEL);
                    upsert_cost(&mut costs, skill, xp_to_level(target, current.get(skill))?);
                }
            }
        }

        let step = choose_training_strategy(&costs);
        if step.is_empty() {
            // Every option is level-capped; the goal is as close as it gets.
            warn!(goal, "combat route stalled against level caps");
            break;
        }
        current += &step;
        route += &step;
    }
    Ok(route)
}

fn upsert_cost(costs: &mut Vec<(Skill, u64)>, skill: Skill, xp: u64) {
    if let Some(entry) = costs.iter_mut().find(|(s, _)| *s == skill) {
        entry.1 = xp;
    } else {
        costs.push((skill, xp));
    }
}

fn higher_and_lower(current: &SkillSet, first: Skill, second: Skill) -> (Skill, Skill) {
    if current.get(first) >= current.get(second) {
        (first, second)
    } else {
        (second, first)
    }
}

/// XP for each half of a paired advance of `levels_needed` levels: close
/// the level gap into the lower skill first, then split what remains,
/// ceiling to the lower and floor to the higher.
fn advance_pair_in_step(
    current: &SkillSet,
    higher: Skill,
    levels_needed: i32,
    lower: Skill,
) -> Result<(u64, u64)> {
    let higher_level = level_for_xp(current.get(higher));
    let lower_level = level_for_xp(current.get(lower));
    let level_gap = higher_level - lower_level;
    let levels_to_close_gap = level_gap.min(levels_needed);
    let remainder = (levels_needed - level_gap).max(0);

    let lower_target = (lower_level
        + (f64::from(levels_to_close_gap) + f64::from(remainder) / 2.0).ceil() as i32)
        .min(MAX_TRAINING_LEVEL);
    let higher_target = (higher_level + remainder / 2).min(MAX_TRAINING_LEVEL);

    Ok((
        xp_to_level(higher_target, current.get(higher))?,
        xp_to_level(lower_target, current.get(lower))?,
    ))
}

/// Pick the cheapest training option. Paired skills are priced together
/// and trained together; level-capped (zero-cost) options are skipped
/// since they cannot move the combat level. The first option in the
/// increment order wins ties.
fn choose_training_strategy(costs: &[(Skill, u64)]) -> SkillSet {
    let cost_of = |skill: Skill| {
        costs
            .iter()
            .find(|(s, _)| *s == skill)
            .map_or(0, |(_, xp)| *xp)
    };
    let pair_cost = |a: Skill, b: Skill| cost_of(a) + cost_of(b);

    let mut chosen: Option<(Skill, u64)> = None;
    for &(skill, xp) in costs {
        let effective = match skill {
            Skill::Attack | Skill::Strength => pair_cost(Skill::Attack, Skill::Strength),
            Skill::Constitution | Skill::Defence => {
                pair_cost(Skill::Constitution, Skill::Defence)
            }
            _ => xp,
        };
        if effective == 0 {
            continue;
        }
        if chosen.is_none_or(|(_, best)| effective < best) {
            chosen = Some((skill, effective));
        }
    }

    let mut step = SkillSet::empty();
    match chosen {
        Some((Skill::Attack | Skill::Strength, _)) => {
            for skill in [Skill::Attack, Skill::Strength] {
                if cost_of(skill) > 0 {
                    step.set(skill, cost_of(skill));
                }
            }
        }
        Some((Skill::Constitution | Skill::Defence, _)) => {
            for skill in [Skill::Constitution, Skill::Defence] {
                if cost_of(skill) > 0 {
                    step.set(skill, cost_of(skill));
                }
            }
        }
        Some((skill, xp)) => step.set(skill, xp),
        None => {}
    }
    step
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::min_xp_for_level;

    #[test]
    fn test_trivial_goals() {
        let fresh = SkillSet::new();
        assert!(optimal_route_to_combat_level(0, &fresh).unwrap().is_empty());
        assert!(optimal_route_to_combat_level(2, &fresh).unwrap().is_empty());

        // Goal 3 is already met by fresh stats; the route is the default set.
        let route = optimal_route_to_combat_level(3, &fresh).unwrap();
        assert_eq!(route, SkillSet::new());

        assert!(matches!(
            optimal_route_to_combat_level(139, &fresh),
            Err(PlanError::InvalidCombatGoal(139))
        ));
    }

    #[test]
    fn test_route_reaches_goal() {
        for goal in [5, 10, 25, 50] {
            let fresh = SkillSet::new();
            let route = optimal_route_to_combat_level(goal, &fresh).unwrap();
            let trained = &fresh + &route;
            assert!(
                calculate_combat_level(&trained.combat_levels()) >= goal,
                "route to {goal} fell short"
            );
        }
    }

    #[test]
    fn test_route_respects_level_cap() {
        let fresh = SkillSet::new();
        let route = optimal_route_to_combat_level(50, &fresh).unwrap();
        let trained = &fresh + &route;
        for (skill, _) in trained.iter() {
            assert!(level_for_xp(trained.get(skill)) <= MAX_TRAINING_LEVEL);
        }
    }

    #[test]
    fn test_route_from_existing_stats() {
        let mut stats = SkillSet::new();
        stats.set(Skill::Attack, min_xp_for_level(60).unwrap());
        stats.set(Skill::Strength, min_xp_for_level(60).unwrap());
        stats.set(Skill::Defence, min_xp_for_level(60).unwrap());
        let before = calculate_combat_level(&stats.combat_levels());

        let route = optimal_route_to_combat_level(before + 5, &stats).unwrap();
        let trained = &stats + &route;
        assert!(calculate_combat_level(&trained.combat_levels()) >= before + 5);
        // The input stats are untouched.
        assert_eq!(stats.get(Skill::Attack), min_xp_for_level(60).unwrap());
    }

    #[test]
    fn test_paired_training_closes_gap_first() {
        // Strength is 10 levels ahead of Attack; a paired advance must pour
        // the first levels into Attack.
        let mut stats = SkillSet::new();
        stats.set(Skill::Strength, min_xp_for_level(20).unwrap());

        let (for_higher, for_lower) =
            advance_pair_in_step(&stats, Skill::Strength, 4, Skill::Attack).unwrap();
        assert_eq!(for_higher, 0);
        // Gap (19) exceeds the requirement (4), so the lower side trains
        // exactly 4 levels: 1 -> 5.
        assert_eq!(for_lower, min_xp_for_level(5).unwrap());
    }

    #[test]
    fn test_paired_training_splits_remainder() {
        // Equal levels: the requirement is split, ceiling toward the lower
        // skill (second of the pair at equal XP).
        let stats = SkillSet::new();
        let (for_higher, for_lower) =
            advance_pair_in_step(&stats, Skill::Attack, 5, Skill::Strength).unwrap();
        // Lower trains ceil(5/2) = 3 levels (1 -> 4), higher floor(5/2) = 2
        // levels (1 -> 3).
        assert_eq!(for_lower, min_xp_for_level(4).unwrap());
        assert_eq!(for_higher, min_xp_for_level(3).unwrap());
    }

    #[test]
    fn test_route_is_deterministic() {
        let fresh = SkillSet::new();
        let a = optimal_route_to_combat_level(30, &fresh).unwrap();
        let b = optimal_route_to_combat_level(30, &fresh).unwrap();
        assert_eq!(a, b);
    }
}
