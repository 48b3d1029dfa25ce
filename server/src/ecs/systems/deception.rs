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

//! Deception checks against a freshly selected target
//!
//! A hiding player picked out of a crowd gets one opposed check per selection:
//!
//! ```text
//! chance = evaluator(perception, deception) * deception_factor
//!          * 2 if specialized deception
//!          + deception_ability_bonus if the ability is running
//! ```
//!
//! Success excludes the player for the rest of this pass and selection runs again on the
//! remaining candidates.

use crate::config::ThreatTuning;
use crate::ecs::components::{Concealment, Targetable};
use crate::ecs::events::AggroEvent;
use crate::ecs::{AggroContext, EcsEntity, GameWorld};
use metrics::counter;

/// Opposed-skill collaborator: probability in `[0, 1]` that the defender wins
#[cfg_attr(test, mockall::automock)]
pub trait StealthEvaluator {
    fn success_probability(&self, perception: u32, deception: u32) -> f64;
}

/// `deception / (perception + deception)`; zero when both are zero
#[derive(Debug, Clone, Copy, Default)]
pub struct OpposedSkillEvaluator;

impl StealthEvaluator for OpposedSkillEvaluator {
    fn success_probability(&self, perception: u32, deception: u32) -> f64 {
        let total = perception as f64 + deception as f64;
        if total <= 0.0 {
            return 0.0;
        }
        deception as f64 / total
    }
}

pub struct DeceptionCheck {
    evaluator: Box<dyn StealthEvaluator + Send>,
}

impl DeceptionCheck {
    pub fn new(evaluator: impl StealthEvaluator + Send + 'static) -> Self {
        Self {
            evaluator: Box::new(evaluator),
        }
    }

    /// Chance that `concealment` slips an actor with `perception` among `crowd` candidates
    pub fn chance(
        &self,
        tuning: &ThreatTuning,
        perception: u32,
        concealment: &Concealment,
        crowd: usize,
    ) -> f64 {
        let base = self
            .evaluator
            .success_probability(perception, concealment.deception)
            .clamp(0.0, 1.0);
        let mut chance = base * tuning.deception_factor;
        if concealment.specialized_deception && crowd > 1 {
            chance *= 2.0;
        }
        if concealment.ability_active {
            chance += tuning.deception_ability_bonus;
        }
        chance.clamp(0.0, 1.0)
    }

    /// Roll a deception attempt by `target` against `actor`
    ///
    /// Returns `None` when no attempt applies: the target is not a hiding player, or it is the
    /// only candidate. Otherwise returns whether the deception succeeded.
    pub fn attempt(
        &self,
        world: &GameWorld,
        context: &mut AggroContext,
        actor: EcsEntity,
        perception: u32,
        target: EcsEntity,
        crowd: usize,
    ) -> Option<bool> {
        if crowd <= 1 {
            return None;
        }
        let is_player = world
            .get::<&Targetable>(target)
            .is_ok_and(|t| t.kind.is_player());
        if !is_player {
            return None;
        }
        let concealment = *world.get::<&Concealment>(target).ok()?;
        if !concealment.hiding {
            return None;
        }

        let chance = self.chance(context.tuning(), perception, &concealment, crowd);
        let succeeded = context.roll_unit() < chance;

        tracing::debug!(
            "Deception by {:?} against {:?}: chance {:.3} {}",
            target,
            actor,
            chance,
            if succeeded { "succeeded" } else { "failed" }
        );
        counter!(
            "aggro.deceptions.total",
            "outcome" => if succeeded { "succeeded" } else { "failed" }
        )
        .increment(1);
        context.publish(AggroEvent::DeceptionAttempted {
            actor,
            target,
            chance,
            succeeded,
        });
        Some(succeeded)
    }
}

impl Default for DeceptionCheck {
    fn default() -> Self {
        Self::new(OpposedSkillEvaluator)
    }
}

impl std::fmt::Debug for DeceptionCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeceptionCheck").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::test_utils::*;

    #[test]
    fn test_opposed_skill() {
        let evaluator = OpposedSkillEvaluator;
        assert_eq!(evaluator.success_probability(10, 10), 0.5);
        assert_eq!(evaluator.success_probability(30, 10), 0.25);
        assert_eq!(evaluator.success_probability(0, 0), 0.0);
    }

    #[test]
    fn test_chance_modifiers() {
        let tuning = ThreatTuning::default();
        let check = DeceptionCheck::default();
        let mut concealment = Concealment::hiding(10);

        // 0.5 * 0.5
        assert_eq!(check.chance(&tuning, 10, &concealment, 3), 0.25);

        concealment.specialized_deception = true;
        assert_eq!(check.chance(&tuning, 10, &concealment, 3), 0.5);
        assert_eq!(check.chance(&tuning, 10, &concealment, 1), 0.25);

        concealment.ability_active = true;
        assert!((check.chance(&tuning, 10, &concealment, 3) - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_chance_is_clamped() {
        let tuning = ThreatTuning {
            deception_factor: 5.0,
            ..ThreatTuning::default()
        };
        let mut evaluator = MockStealthEvaluator::new();
        evaluator.expect_success_probability().returning(|_, _| 3.0);
        let check = DeceptionCheck::new(evaluator);

        assert_eq!(check.chance(&tuning, 1, &Concealment::hiding(1), 2), 1.0);
    }

    #[test]
    fn test_attempt_requires_hiding_player_in_crowd() {
        let (mut world, mut context) = test_world();
        let actor = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let open = spawn_player(&mut world, "Aria", [1.0, 0.0, 0.0]);
        let hiding = spawn_player(&mut world, "Bram", [1.0, 0.0, 0.0]);
        world.insert_one(hiding, Concealment::hiding(10)).unwrap();
        let creature = world.spawn((Targetable::creature(), Concealment::hiding(10)));

        let check = DeceptionCheck::default();
        assert_eq!(check.attempt(&world, &mut context, actor, 10, open, 3), None);
        assert_eq!(check.attempt(&world, &mut context, actor, 10, hiding, 1), None);
        assert_eq!(check.attempt(&world, &mut context, actor, 10, creature, 3), None);
        assert!(context.events().drain().is_empty());

        assert!(check.attempt(&world, &mut context, actor, 10, hiding, 3).is_some());
        let events = context.events().drain();
        assert!(matches!(events[0], AggroEvent::DeceptionAttempted { .. }));
    }

    #[test]
    fn test_attempt_uses_evaluator() {
        let (mut world, mut context) = test_world();
        let actor = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let hiding = spawn_player(&mut world, "Bram", [1.0, 0.0, 0.0]);
        world.insert_one(hiding, Concealment::hiding(10)).unwrap();

        let mut certain = MockStealthEvaluator::new();
        certain
            .expect_success_probability()
            .withf(|perception, deception| *perception == 12 && *deception == 10)
            .returning(|_, _| 1.0);
        let tuning_factor_one = ThreatTuning {
            deception_factor: 1.0,
            ..ThreatTuning::default()
        };
        let mut certain_context = AggroContext::seeded(tuning_factor_one, TEST_SEED);
        let check = DeceptionCheck::new(certain);
        assert_eq!(
            check.attempt(&world, &mut certain_context, actor, 12, hiding, 2),
            Some(true)
        );

        let mut hopeless = MockStealthEvaluator::new();
        hopeless.expect_success_probability().returning(|_, _| 0.0);
        let check = DeceptionCheck::new(hopeless);
        assert_eq!(
            check.attempt(&world, &mut context, actor, 12, hiding, 2),
            Some(false)
        );
    }
}
