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

//! Threat ledger maintenance: increases, decay, seeding, pruning and resets

use crate::config::ThreatTuning;
use crate::ecs::components::{
    Health, HostileController, Name, PassiveBias, PassiveThreatSource, ThreatLedger,
    ThreatModifiers,
};
use crate::ecs::events::AggroEvent;
use crate::ecs::systems::Candidate;
use crate::ecs::{AggroContext, AggroError, EcsEntity, GameWorld};
use std::collections::BTreeMap;

pub struct ThreatSystem;

impl ThreatSystem {
    /// Apply a candidate's modifiers to a base amount, consuming one-shot flags
    ///
    /// Order: provoke, smokescreen, skip (returns `None`), double, item gain, item reduction,
    /// then the minimum gain clamp.
    pub fn modified_amount(
        tuning: &ThreatTuning,
        base: i64,
        modifiers: &mut ThreatModifiers,
    ) -> Option<i64> {
        let mut amount = base as f64;

        if modifiers.provoke.applies(tuning.ability_readiness_threshold) {
            amount *= tuning.provoke_multiplier;
        }
        if modifiers.smokescreen.applies(tuning.ability_readiness_threshold) {
            amount *= tuning.smokescreen_multiplier;
        }

        if modifiers.skip_next {
            modifiers.skip_next = false;
            return None;
        }
        if modifiers.double_next {
            modifiers.double_next = false;
            amount *= 2.0;
        }

        amount *= (1.0 + modifiers.threat_gain).max(0.0);
        amount *= 1.0 - modifiers.threat_reduction.clamp(0.0, 1.0);

        Some((amount as i64).max(tuning.minimum_threat_gain))
    }

    /// Record threat generated by `candidate` against `actor`
    ///
    /// Returns the new ledger value, or `None` when nothing was recorded (skip flag consumed,
    /// reserved name, or the actor runs legacy tactics).
    pub fn increase_threat(
        world: &mut GameWorld,
        context: &AggroContext,
        actor: EcsEntity,
        candidate: EcsEntity,
        base: i64,
    ) -> Result<Option<i64>, AggroError> {
        let legacy = Self::actor_mode(world, actor)?;
        if !world.contains(candidate) {
            return Err(AggroError::NoSuchEntity(candidate));
        }
        if legacy {
            tracing::trace!("Actor {:?} uses legacy tactics; threat not recorded", actor);
            return Ok(None);
        }
        if Self::is_reserved(world, context.tuning(), candidate) {
            tracing::trace!("Candidate {:?} has a reserved name; threat not recorded", candidate);
            return Ok(None);
        }

        let amount = match world.get::<&mut ThreatModifiers>(candidate) {
            Ok(mut modifiers) => Self::modified_amount(context.tuning(), base, &mut modifiers),
            Err(_) => {
                Self::modified_amount(context.tuning(), base, &mut ThreatModifiers::default())
            }
        };
        let Some(amount) = amount else {
            tracing::debug!("Threat from {:?} against {:?} skipped", candidate, actor);
            context.publish(AggroEvent::ThreatSkipped { actor, candidate });
            return Ok(None);
        };

        Self::ensure_ledger(world, actor)?;
        let total = world
            .get::<&mut ThreatLedger>(actor)
            .map(|mut ledger| ledger.add(candidate, amount, context.threat_minimum()))
            .map_err(|_| AggroError::NoSuchEntity(actor))?;

        tracing::trace!(
            "Actor {:?} threat from {:?} +{} = {}",
            actor,
            candidate,
            amount,
            total
        );
        context.publish(AggroEvent::ThreatIncreased {
            actor,
            candidate,
            amount,
            total,
        });
        Ok(Some(total))
    }

    /// Prune, then apply one decay step to the actor's ledger
    pub fn decay(world: &GameWorld, context: &AggroContext, actor: EcsEntity) -> Option<i64> {
        let tracked: Vec<EcsEntity> = world
            .get::<&ThreatLedger>(actor)
            .ok()?
            .iter()
            .map(|(entity, _)| entity)
            .collect();

        let mut gone = Vec::new();
        let mut thresholds = BTreeMap::new();
        for entity in tracked {
            if !Self::is_present(world, entity) {
                gone.push(entity);
            } else if let Ok(passive) = world.get::<&PassiveThreatSource>(entity) {
                thresholds.insert(entity, passive.threshold);
            }
        }
        Self::forget(world, actor, &gone);

        let mut ledger = world.get::<&mut ThreatLedger>(actor).ok()?;
        let entries = ledger.len();
        let amount = ledger.decay(
            context.threat_minimum(),
            context.tuning().decay_fraction,
            |entity| thresholds.get(&entity).copied(),
        )?;
        drop(ledger);

        tracing::trace!(
            "Actor {:?} decayed {} across {} entries",
            actor,
            amount,
            entries
        );
        context.publish(AggroEvent::ThreatDecayed {
            actor,
            amount,
            entries,
        });
        Some(amount)
    }

    /// Create floor entries for every candidate not yet tracked. Returns how many were created.
    pub fn seed_candidates(
        world: &mut GameWorld,
        context: &AggroContext,
        actor: EcsEntity,
        candidates: &[Candidate],
    ) -> Result<usize, AggroError> {
        let seedable: Vec<EcsEntity> = candidates
            .iter()
            .map(|candidate| candidate.entity)
            .filter(|entity| !Self::is_reserved(world, context.tuning(), *entity))
            .collect();

        Self::ensure_ledger(world, actor)?;
        let mut ledger = world
            .get::<&mut ThreatLedger>(actor)
            .map_err(|_| AggroError::NoSuchEntity(actor))?;
        Ok(seedable
            .into_iter()
            .filter(|entity| ledger.seed(*entity, context.threat_minimum()))
            .count())
    }

    /// Wipe ledger and passive state
    pub fn reset(world: &GameWorld, context: &AggroContext, actor: EcsEntity) {
        if let Ok(mut ledger) = world.get::<&mut ThreatLedger>(actor) {
            ledger.clear();
        }
        if let Ok(mut bias) = world.get::<&mut PassiveBias>(actor) {
            bias.clear();
        }
        tracing::debug!("Actor {:?} ledger reset", actor);
        context.publish(AggroEvent::LedgerReset { actor });
    }

    /// Drop entries for candidates that died or despawned
    pub fn prune(world: &GameWorld, actor: EcsEntity) -> Vec<EcsEntity> {
        let gone: Vec<EcsEntity> = match world.get::<&ThreatLedger>(actor) {
            Ok(ledger) => ledger
                .iter()
                .map(|(entity, _)| entity)
                .filter(|entity| !Self::is_present(world, *entity))
                .collect(),
            Err(_) => return Vec::new(),
        };
        Self::forget(world, actor, &gone);
        gone
    }

    /// Whether a candidate's name keeps it out of ledgers
    pub fn is_reserved(world: &GameWorld, tuning: &ThreatTuning, entity: EcsEntity) -> bool {
        world
            .get::<&Name>(entity)
            .is_ok_and(|name| tuning.is_reserved_name(name.as_str()))
    }

    /// Exists and is not dead
    pub fn is_present(world: &GameWorld, entity: EcsEntity) -> bool {
        world.contains(entity)
            && world
                .get::<&Health>(entity)
                .map_or(true, |health| health.is_alive())
    }

    pub fn ensure_ledger(world: &mut GameWorld, actor: EcsEntity) -> Result<(), AggroError> {
        if world.get::<&ThreatLedger>(actor).is_err() {
            world
                .insert_one(actor, ThreatLedger::new())
                .map_err(|_| AggroError::NoSuchEntity(actor))?;
        }
        Ok(())
    }

    fn forget(world: &GameWorld, actor: EcsEntity, gone: &[EcsEntity]) {
        if gone.is_empty() {
            return;
        }
        if let Ok(mut ledger) = world.get::<&mut ThreatLedger>(actor) {
            for entity in gone {
                ledger.remove(*entity);
            }
        }
        if let Ok(mut bias) = world.get::<&mut PassiveBias>(actor) {
            for entity in gone {
                bias.remove(*entity);
            }
        }
        tracing::trace!("Actor {:?} pruned {} ledger entries", actor, gone.len());
    }

    /// `Ok(legacy_mode)` for a hostile actor
    fn actor_mode(world: &GameWorld, actor: EcsEntity) -> Result<bool, AggroError> {
        if !world.contains(actor) {
            return Err(AggroError::NoSuchEntity(actor));
        }
        world
            .get::<&HostileController>(actor)
            .map(|controller| controller.profile.legacy_mode)
            .map_err(|_| AggroError::NotAnActor(actor))
    }
}
