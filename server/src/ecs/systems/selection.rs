//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! # Target Selection
//!
//! ## Threat lottery
//! Among candidates with ledger entries, take `max_threat`. At or below the floor the
//! distance-weighted sampler decides. Otherwise:
//!
//! ```text
//! cut       = floor(max_threat * aggro_range_fraction)
//! potential = entries with value >= cut, remainder = value - cut, sorted ascending
//! ladder    = prefix sums of remainders
//! roll      = uniform integer in [1, ladder.last]
//! winner    = first rung >= roll
//! ```
//!
//! Every potential entry holds a bucket proportional to its remainder. Entries below the cut
//! are "safe" this pass. An entry sitting exactly on the cut has a zero-width bucket.
//!
//! ## Legacy tactics
//! One tactic is drawn uniformly from the actor's set every pass. Hold and Focused keep a still
//! eligible current target. Damage-history tactics and Hold without a usable target fall back to
//! the distance sampler so the actor can still acquire someone.

use crate::config::ThreatTuning;
use crate::ecs::components::{Level, ThreatLedger, ThreatOutlook};
use crate::ecs::systems::{Candidate, DamageHistory, DamageLogHistory, distance_weighted};
use crate::ecs::{EcsEntity, GameWorld};
use aggro_common::{Tactic, TacticDraw, TacticSet};
use rand::Rng;

/// Result of one selection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionOutcome {
    /// A target was picked this pass
    Chosen(EcsEntity),
    /// The drawn tactic keeps the current, still eligible target
    Kept(EcsEntity),
    /// A tactic bit with no meaning was drawn; nothing is chosen
    Rejected(u16),
    /// Nothing to choose from
    Empty,
}

impl SelectionOutcome {
    pub fn target(&self) -> Option<EcsEntity> {
        match self {
            SelectionOutcome::Chosen(entity) | SelectionOutcome::Kept(entity) => Some(*entity),
            SelectionOutcome::Rejected(_) | SelectionOutcome::Empty => None,
        }
    }
}

/// One rung of the lottery ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotteryRung {
    pub entity: EcsEntity,
    pub remainder: i64,
    pub cumulative: i64,
}

/// Ladder and diagnostics for one threat lottery
#[derive(Debug, Clone, PartialEq)]
pub struct ThreatLottery {
    pub max_threat: i64,
    pub cut: i64,
    pub rungs: Vec<LotteryRung>,
    pub outlook: ThreatOutlook,
}

impl ThreatLottery {
    /// Build the ladder from `(entity, value)` pairs. `None` when no value is above the floor.
    pub fn build(tuning: &ThreatTuning, entries: &[(EcsEntity, i64)]) -> Option<Self> {
        let max_threat = entries.iter().map(|(_, value)| *value).max()?;
        if max_threat <= tuning.threat_minimum {
            return None;
        }

        let cut = (max_threat as f64 * tuning.aggro_range_fraction).floor() as i64;
        let mut potential: Vec<(EcsEntity, i64)> = Vec::new();
        let mut outlook = ThreatOutlook::default();

        for (entity, value) in entries {
            if *value >= cut {
                potential.push((*entity, value - cut));
            } else if cut > 0 {
                outlook
                    .negative
                    .insert(*entity, *value as f64 / cut as f64 - 1.0);
            }
        }
        potential.sort_by_key(|(_, remainder)| *remainder);

        let mut cumulative: i64 = 0;
        let rungs: Vec<LotteryRung> = potential
            .into_iter()
            .map(|(entity, remainder)| {
                cumulative = cumulative.saturating_add(remainder);
                LotteryRung {
                    entity,
                    remainder,
                    cumulative,
                }
            })
            .collect();

        let total = cumulative.max(1);
        for rung in &rungs {
            outlook
                .positive
                .insert(rung.entity, rung.remainder as f64 / total as f64);
        }

        Some(Self {
            max_threat,
            cut,
            rungs,
            outlook,
        })
    }

    pub fn cumulative_max(&self) -> i64 {
        self.rungs.last().map_or(0, |rung| rung.cumulative)
    }

    /// Winner for a roll in `[1, cumulative_max]`; out-of-range rolls are clamped
    pub fn winner(&self, roll: i64) -> Option<EcsEntity> {
        let roll = roll.clamp(1, self.cumulative_max().max(1));
        self.rungs
            .iter()
            .find(|rung| rung.cumulative >= roll)
            .or(self.rungs.last())
            .map(|rung| rung.entity)
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<EcsEntity> {
        let roll = rng.random_range(1..=self.cumulative_max().max(1));
        self.winner(roll)
    }
}

/// Chooses one candidate per pass
pub struct TargetSelector {
    damage_history: Box<dyn DamageHistory + Send>,
}

impl TargetSelector {
    pub fn new(damage_history: impl DamageHistory + Send + 'static) -> Self {
        Self {
            damage_history: Box::new(damage_history),
        }
    }

    /// Threat-table selection. Rebuilds the ledger's outlook as a side effect.
    pub fn select_by_threat<R: Rng + ?Sized>(
        &self,
        tuning: &ThreatTuning,
        ledger: &mut ThreatLedger,
        candidates: &[Candidate],
        rng: &mut R,
    ) -> SelectionOutcome {
        let tracked: Vec<Candidate> = candidates
            .iter()
            .filter(|candidate| ledger.contains(candidate.entity))
            .copied()
            .collect();
        let entries: Vec<(EcsEntity, i64)> = tracked
            .iter()
            .filter_map(|c| ledger.value(c.entity).map(|value| (c.entity, value)))
            .collect();

        match ThreatLottery::build(tuning, &entries) {
            Some(lottery) => {
                let winner = lottery.draw(rng);
                tracing::debug!(
                    "Threat lottery: max {} cut {} over {} rungs -> {:?}",
                    lottery.max_threat,
                    lottery.cut,
                    lottery.rungs.len(),
                    winner
                );
                ledger.set_outlook(lottery.outlook);
                winner.map_or(SelectionOutcome::Empty, SelectionOutcome::Chosen)
            }
            None => {
                ledger.set_outlook(ThreatOutlook::default());
                Self::by_distance(&tracked, rng)
            }
        }
    }

    /// Legacy tactic selection
    pub fn select_by_tactic<R: Rng + ?Sized>(
        &self,
        world: &GameWorld,
        actor: EcsEntity,
        tactics: TacticSet,
        current: Option<EcsEntity>,
        candidates: &[Candidate],
        rng: &mut R,
    ) -> SelectionOutcome {
        if candidates.is_empty() {
            return SelectionOutcome::Empty;
        }

        let tactic = match tactics.sample(rng) {
            Some(TacticDraw::Known(tactic)) => tactic,
            Some(TacticDraw::Unknown(bits)) => return SelectionOutcome::Rejected(bits),
            None => Tactic::Hold,
        };
        tracing::trace!("Actor {:?} drew tactic {}", actor, tactic.as_str());

        let eligible = |entity: EcsEntity| candidates.iter().any(|c| c.entity == entity);

        match tactic {
            // With no eligible current target there is nothing to hold, and the host hands a
            // waking actor no target of its own. Acquire by distance so the actor still engages.
            Tactic::Hold | Tactic::Focused => match current.filter(|t| eligible(*t)) {
                Some(target) => SelectionOutcome::Kept(target),
                None => Self::by_distance(candidates, rng),
            },
            Tactic::Random => Self::by_distance(candidates, rng),
            Tactic::LastDamager => match self
                .damage_history
                .last_damager(world, actor)
                .filter(|d| eligible(*d))
            {
                Some(damager) => SelectionOutcome::Chosen(damager),
                None => Self::by_distance(candidates, rng),
            },
            Tactic::TopDamager => match self
                .damage_history
                .top_damager(world, actor)
                .filter(|d| eligible(*d))
            {
                Some(damager) => SelectionOutcome::Chosen(damager),
                None => Self::by_distance(candidates, rng),
            },
            Tactic::Weakest => Self::by_level(world, candidates, false),
            Tactic::Strongest => Self::by_level(world, candidates, true),
            Tactic::Nearest => Self::nearest(candidates),
        }
    }

    fn by_distance<R: Rng + ?Sized>(candidates: &[Candidate], rng: &mut R) -> SelectionOutcome {
        let pairs: Vec<(EcsEntity, f64)> =
            candidates.iter().map(|c| (c.entity, c.distance)).collect();
        distance_weighted(&pairs, rng).map_or(SelectionOutcome::Empty, SelectionOutcome::Chosen)
    }

    /// Lowest (or highest) level; ties go to the earlier candidate
    fn by_level(world: &GameWorld, candidates: &[Candidate], highest: bool) -> SelectionOutcome {
        let level = |entity: EcsEntity| world.get::<&Level>(entity).map_or(0, |l| l.0);
        candidates
            .iter()
            .map(|c| (c.entity, level(c.entity)))
            .fold(None, |best: Option<(EcsEntity, u32)>, (entity, value)| match best {
                Some((_, best_value))
                    if (highest && best_value >= value) || (!highest && best_value <= value) =>
                {
                    best
                }
                _ => Some((entity, value)),
            })
            .map_or(SelectionOutcome::Empty, |(entity, _)| {
                SelectionOutcome::Chosen(entity)
            })
    }

    fn nearest(candidates: &[Candidate]) -> SelectionOutcome {
        candidates
            .iter()
            .fold(None, |best: Option<&Candidate>, c| match best {
                Some(b) if b.distance <= c.distance => best,
                _ => Some(c),
            })
            .map_or(SelectionOutcome::Empty, |c| SelectionOutcome::Chosen(c.entity))
    }
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::new(DamageLogHistory)
    }
}

impl std::fmt::Debug for TargetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetSelector").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::systems::MockDamageHistory;
    use crate::ecs::test_utils::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entities(n: usize) -> Vec<EcsEntity> {
        let mut world = hecs::World::new();
        (0..n).map(|_| world.spawn(())).collect()
    }

    #[test]
    fn test_lottery_scenario_a() {
        let tuning = ThreatTuning::default();
        let e = entities(2);
        let lottery = ThreatLottery::build(&tuning, &[(e[0], 100), (e[1], 500)]).unwrap();

        assert_eq!(lottery.cut, 250);
        assert_eq!(lottery.rungs.len(), 1);
        assert_eq!(lottery.cumulative_max(), 250);
        for roll in 1..=250 {
            assert_eq!(lottery.winner(roll), Some(e[1]));
        }
        assert_eq!(lottery.outlook.positive.get(&e[1]), Some(&1.0));
        assert_eq!(lottery.outlook.negative.get(&e[0]), Some(&(100.0 / 250.0 - 1.0)));
    }

    #[test]
    fn test_lottery_ladder_is_ascending() {
        let tuning = ThreatTuning::default();
        let e = entities(3);
        // cut 200; remainders 200, 50, 100
        let lottery =
            ThreatLottery::build(&tuning, &[(e[0], 400), (e[1], 250), (e[2], 300)]).unwrap();

        let order: Vec<EcsEntity> = lottery.rungs.iter().map(|r| r.entity).collect();
        assert_eq!(order, vec![e[1], e[2], e[0]]);
        assert_eq!(lottery.cumulative_max(), 350);

        assert_eq!(lottery.winner(1), Some(e[1]));
        assert_eq!(lottery.winner(50), Some(e[1]));
        assert_eq!(lottery.winner(51), Some(e[2]));
        assert_eq!(lottery.winner(150), Some(e[2]));
        assert_eq!(lottery.winner(151), Some(e[0]));
        assert_eq!(lottery.winner(350), Some(e[0]));
        // Clamped
        assert_eq!(lottery.winner(10_000), Some(e[0]));
        assert_eq!(lottery.winner(-3), Some(e[1]));
    }

    #[test]
    fn test_lottery_ladder_saturates() {
        let tuning = ThreatTuning::default();
        let e = entities(3);
        let entries: Vec<(EcsEntity, i64)> = e.iter().map(|entity| (*entity, i64::MAX)).collect();
        let lottery = ThreatLottery::build(&tuning, &entries).unwrap();

        assert_eq!(lottery.rungs.len(), 3);
        assert_eq!(lottery.cumulative_max(), i64::MAX);
        assert!(lottery.rungs.windows(2).all(|w| w[0].cumulative <= w[1].cumulative));
        assert_eq!(lottery.winner(i64::MAX), Some(lottery.rungs[2].entity));
        assert!(lottery.draw(&mut StdRng::seed_from_u64(TEST_SEED)).is_some());
    }

    #[test]
    fn test_lottery_needs_threat_above_floor() {
        let tuning = ThreatTuning::default();
        let e = entities(2);
        assert!(ThreatLottery::build(&tuning, &[(e[0], 100), (e[1], 100)]).is_none());
        assert!(ThreatLottery::build(&tuning, &[]).is_none());
    }

    #[test]
    fn test_select_by_threat_sets_outlook() {
        let tuning = ThreatTuning::default();
        let e = entities(3);
        let mut ledger = ThreatLedger::new();
        ledger.seed(e[0], 100);
        ledger.seed(e[1], 100);
        ledger.raise_to(e[1], 500);
        // Tracked but not visible
        ledger.seed(e[2], 100);
        ledger.raise_to(e[2], 5000);

        let candidates = [candidate(e[0], 3.0), candidate(e[1], 8.0)];
        let mut rng = StdRng::seed_from_u64(3);
        let selector = TargetSelector::default();

        for _ in 0..20 {
            let outcome = selector.select_by_threat(&tuning, &mut ledger, &candidates, &mut rng);
            assert_eq!(outcome, SelectionOutcome::Chosen(e[1]));
        }
        assert!(ledger.outlook().positive.contains_key(&e[1]));
        assert!(!ledger.outlook().positive.contains_key(&e[2]));
    }

    #[test]
    fn test_select_by_threat_falls_back_to_distance() {
        let tuning = ThreatTuning::default();
        let e = entities(3);
        let mut ledger = ThreatLedger::new();
        ledger.seed(e[0], 100);
        ledger.seed(e[1], 100);

        // e[2] has no ledger entry and is never picked
        let candidates = [candidate(e[0], 3.0), candidate(e[1], 8.0), candidate(e[2], 1.0)];
        let mut rng = StdRng::seed_from_u64(3);
        let selector = TargetSelector::default();

        for _ in 0..50 {
            let outcome = selector.select_by_threat(&tuning, &mut ledger, &candidates, &mut rng);
            assert_ne!(outcome.target(), Some(e[2]));
            assert!(outcome.target().is_some());
        }
        assert!(ledger.outlook().is_empty());
    }

    #[test]
    fn test_tactic_nearest_and_levels() {
        let (mut world, _) = test_world();
        let actor = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let low = world.spawn((Level(2),));
        let high = world.spawn((Level(9),));
        let mid = world.spawn((Level(5),));
        let candidates = [candidate(low, 7.0), candidate(high, 3.0), candidate(mid, 5.0)];
        let selector = TargetSelector::default();
        let mut rng = StdRng::seed_from_u64(1);

        let pick = |tactic: Tactic, rng: &mut StdRng| {
            selector.select_by_tactic(
                &world,
                actor,
                TacticSet::empty().with(tactic),
                None,
                &candidates,
                rng,
            )
        };

        assert_eq!(pick(Tactic::Nearest, &mut rng), SelectionOutcome::Chosen(high));
        assert_eq!(pick(Tactic::Weakest, &mut rng), SelectionOutcome::Chosen(low));
        assert_eq!(pick(Tactic::Strongest, &mut rng), SelectionOutcome::Chosen(high));
    }

    #[test]
    fn test_tactic_hold_keeps_eligible_target() {
        let (mut world, _) = test_world();
        let actor = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let a = spawn_player(&mut world, "Aria", [1.0, 0.0, 0.0]);
        let b = spawn_player(&mut world, "Bram", [2.0, 0.0, 0.0]);
        let gone = spawn_player(&mut world, "Cass", [2.0, 0.0, 0.0]);
        let candidates = [candidate(a, 1.0), candidate(b, 2.0)];
        let selector = TargetSelector::default();
        let mut rng = StdRng::seed_from_u64(1);

        let hold = TacticSet::default();
        assert_eq!(
            selector.select_by_tactic(&world, actor, hold, Some(b), &candidates, &mut rng),
            SelectionOutcome::Kept(b)
        );

        let outcome =
            selector.select_by_tactic(&world, actor, hold, Some(gone), &candidates, &mut rng);
        assert!(matches!(outcome, SelectionOutcome::Chosen(t) if t == a || t == b));
    }

    #[test]
    fn test_tactic_damage_history() {
        let (mut world, _) = test_world();
        let actor = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let a = spawn_player(&mut world, "Aria", [1.0, 0.0, 0.0]);
        let b = spawn_player(&mut world, "Bram", [2.0, 0.0, 0.0]);
        let candidates = [candidate(a, 1.0), candidate(b, 2.0)];

        let mut history = MockDamageHistory::new();
        history.expect_last_damager().returning(move |_, _| Some(b));
        history.expect_top_damager().returning(move |_, _| Some(a));
        let selector = TargetSelector::new(history);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            selector.select_by_tactic(
                &world,
                actor,
                TacticSet::empty().with(Tactic::LastDamager),
                None,
                &candidates,
                &mut rng
            ),
            SelectionOutcome::Chosen(b)
        );
        assert_eq!(
            selector.select_by_tactic(
                &world,
                actor,
                TacticSet::empty().with(Tactic::TopDamager),
                None,
                &candidates,
                &mut rng
            ),
            SelectionOutcome::Chosen(a)
        );
    }

    #[test]
    fn test_unknown_tactic_is_rejected() {
        let (mut world, _) = test_world();
        let actor = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let a = spawn_player(&mut world, "Aria", [1.0, 0.0, 0.0]);
        let selector = TargetSelector::default();
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = selector.select_by_tactic(
            &world,
            actor,
            TacticSet::from_bits(1 << 12),
            None,
            &[candidate(a, 1.0)],
            &mut rng,
        );
        assert_eq!(outcome, SelectionOutcome::Rejected(1 << 12));
        assert_eq!(outcome.target(), None);
    }
}
