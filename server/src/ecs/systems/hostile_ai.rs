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

//! Hostile actor AI system
//!
//! Drives each due actor through one think:
//!
//! 1. Reset ledger and passive state if the actor switched between legacy and threat mode
//! 2. Prune and decay the ledger (threat mode)
//! 3. Filter sightings down to candidates; with none left the actor drops its target and heads
//!    home
//! 4. Seed new candidates and run the passive bias pass (threat mode)
//! 5. Select, re-selecting after each successful deception
//! 6. Engage the result and, when waking from idle, alert nearby kin
//!
//! Awareness moves `Idle -> Awake -> Engaged -> Returning -> Idle`. The host calls
//! [`HostileAiSystem::arrive_home`] when a returning actor reaches its post.

use crate::ecs::components::{
    Allegiance, AwarenessState, DamageLog, Health, HostileController, PassiveBias, ThreatLedger,
};
use crate::ecs::events::AggroEvent;
use crate::ecs::systems::{
    AlertPropagator, Candidate, CandidateFilter, DamageHistory, DeceptionCheck, PassiveBiasEngine,
    ProximityQuery, SelectionOutcome, StealthEvaluator, TargetSelector, ThreatSystem,
    VisibilityQuery,
};
use crate::ecs::{AggroContext, AggroError, EcsEntity, GameWorld};
use metrics::{counter, histogram};
use std::time::Instant;

pub struct HostileAiSystem {
    visibility: Box<dyn VisibilityQuery + Send>,
    filter: CandidateFilter,
    selector: TargetSelector,
    deception: DeceptionCheck,
    alerts: AlertPropagator,
}

impl HostileAiSystem {
    /// Create a system with the default damage history and stealth evaluator
    pub fn new(visibility: impl VisibilityQuery + Send + 'static) -> Self {
        Self {
            visibility: Box::new(visibility),
            filter: CandidateFilter::new(),
            selector: TargetSelector::default(),
            deception: DeceptionCheck::default(),
            alerts: AlertPropagator::new(),
        }
    }

    pub fn with_damage_history(mut self, history: impl DamageHistory + Send + 'static) -> Self {
        self.selector = TargetSelector::new(history);
        self
    }

    pub fn with_stealth_evaluator(
        mut self,
        evaluator: impl StealthEvaluator + Send + 'static,
    ) -> Self {
        self.deception = DeceptionCheck::new(evaluator);
        self
    }

    pub fn alerts(&self) -> &AlertPropagator {
        &self.alerts
    }

    /// Advance think timers and run every due actor. Returns how many actors thought.
    pub fn update(
        &mut self,
        world: &mut GameWorld,
        context: &mut AggroContext,
        delta_time: f32,
    ) -> usize {
        let mut due = Vec::new();
        for entity_ref in world.iter() {
            let Some(mut controller) = entity_ref.get::<&mut HostileController>() else {
                continue;
            };
            controller.update_timer(delta_time);
            let alive = entity_ref
                .get::<&Health>()
                .is_none_or(|health| health.is_alive());
            if alive && controller.should_think() {
                due.push(entity_ref.entity());
            }
        }

        self.alerts.expire(context);

        for actor in &due {
            if let Err(e) = self.think(world, context, *actor) {
                tracing::warn!("Actor {:?} failed to think: {}", actor, e);
            }
        }
        due.len()
    }

    /// Run one target evaluation for `actor`. Returns the target it ends up with.
    #[tracing::instrument(skip(self, world, context))]
    pub fn think(
        &mut self,
        world: &mut GameWorld,
        context: &mut AggroContext,
        actor: EcsEntity,
    ) -> Result<Option<EcsEntity>, AggroError> {
        let started_at = Instant::now();
        let mut controller = Self::controller(world, actor)?;
        let legacy = controller.profile.legacy_mode;
        let woke_from = controller.state;

        if controller.mode_switched() {
            tracing::debug!(
                "Actor {:?} switched to {} mode",
                actor,
                if legacy { "legacy" } else { "threat" }
            );
            ThreatSystem::reset(world, context, actor);
        }
        controller.last_legacy_mode = Some(legacy);
        controller.mark_thought();

        if !legacy {
            ThreatSystem::decay(world, context, actor);
        }

        let sightings = self.visibility.visible(world, actor);
        let candidates = self.filter.filter(world, actor, &controller, &sightings);

        if candidates.is_empty() {
            Self::disengage(context, actor, &mut controller);
            Self::store(world, actor, controller)?;
            return Ok(None);
        }

        if !controller.state.is_awake() {
            Self::transition(context, actor, &mut controller, AwarenessState::Awake);
        }

        let outcome = self.choose(world, context, actor, &controller, &candidates)?;

        let acquired = match outcome {
            SelectionOutcome::Chosen(target) | SelectionOutcome::Kept(target) => {
                Self::engage(context, actor, &mut controller, target);
                Some(target)
            }
            SelectionOutcome::Rejected(bits) => {
                tracing::warn!(
                    "Actor {:?} drew unknown tactic bits {:#06x}; no target this pass",
                    actor,
                    bits
                );
                context.publish(AggroEvent::TacticRejected { actor, bits });
                None
            }
            SelectionOutcome::Empty => None,
        };

        let target = controller.target;
        Self::store(world, actor, controller)?;

        if let Some(enemy) = acquired {
            if woke_from == AwarenessState::Idle {
                self.alerts
                    .propagate(world, context, &*self.visibility, actor, enemy);
            }
        }

        if let Ok(ledger) = world.get::<&ThreatLedger>(actor) {
            histogram!("aggro.ledger.entries").record(ledger.len() as f64);
        }
        histogram!("aggro.think.duration").record(started_at.elapsed().as_secs_f64());
        Ok(target)
    }

    /// Feed a damage event: log it, register same-faction retaliation, and raise threat
    pub fn record_damage(
        &mut self,
        world: &mut GameWorld,
        context: &AggroContext,
        actor: EcsEntity,
        attacker: EcsEntity,
        amount: i64,
    ) -> Result<Option<i64>, AggroError> {
        Self::controller(world, actor)?;
        if !world.contains(attacker) {
            return Err(AggroError::NoSuchEntity(attacker));
        }

        if world.get::<&DamageLog>(actor).is_err() {
            world
                .insert_one(actor, DamageLog::default())
                .map_err(|_| AggroError::NoSuchEntity(actor))?;
        }
        if let Ok(mut log) = world.get::<&mut DamageLog>(actor) {
            log.record(attacker, amount, context.now());
        }

        let same_faction = match (
            world.get::<&Allegiance>(actor),
            world.get::<&Allegiance>(attacker),
        ) {
            (Ok(mine), Ok(theirs)) => mine.same_faction(&theirs),
            _ => false,
        };
        if same_faction {
            if let Ok(mut controller) = world.get::<&mut HostileController>(actor) {
                if !controller.is_retaliation_target(attacker) {
                    tracing::debug!("Actor {:?} retaliates against {:?}", actor, attacker);
                    controller.retaliate_against(attacker);
                }
            }
        }

        ThreatSystem::increase_threat(world, context, actor, attacker, amount)
    }

    /// A returning actor reached home: go idle and forget the encounter
    pub fn arrive_home(
        &mut self,
        world: &mut GameWorld,
        context: &AggroContext,
        actor: EcsEntity,
    ) -> Result<(), AggroError> {
        let mut controller = Self::controller(world, actor)?;
        controller.target = None;
        Self::transition(context, actor, &mut controller, AwarenessState::Idle);
        Self::store(world, actor, controller)?;
        ThreatSystem::reset(world, context, actor);
        Ok(())
    }

    /// Seed, bias, then select with deception re-rolls
    fn choose(
        &self,
        world: &mut GameWorld,
        context: &mut AggroContext,
        actor: EcsEntity,
        controller: &HostileController,
        candidates: &[Candidate],
    ) -> Result<SelectionOutcome, AggroError> {
        let legacy = controller.profile.legacy_mode;
        if !legacy {
            ThreatSystem::seed_candidates(world, context, actor, candidates)?;
            if world.get::<&PassiveBias>(actor).is_err() {
                world
                    .insert_one(actor, PassiveBias::new())
                    .map_err(|_| AggroError::NoSuchEntity(actor))?;
            }
            if let (Ok(mut ledger), Ok(mut bias)) = (
                world.get::<&mut ThreatLedger>(actor),
                world.get::<&mut PassiveBias>(actor),
            ) {
                PassiveBiasEngine::apply(context.tuning(), &mut *ledger, &mut bias, candidates);
            }
        }

        let limit = context.tuning().max_deception_rerolls.min(candidates.len());
        let mut remaining = candidates.to_vec();
        let mut deceived = 0;

        let outcome = loop {
            let outcome = self.select_once(world, context, actor, controller, &remaining);
            let SelectionOutcome::Chosen(target) = outcome else {
                break outcome;
            };
            if deceived >= limit {
                break outcome;
            }
            let attempt = self.deception.attempt(
                world,
                context,
                actor,
                controller.profile.perception,
                target,
                remaining.len(),
            );
            if attempt != Some(true) {
                break outcome;
            }

            deceived += 1;
            remaining.retain(|candidate| candidate.entity != target);
            if remaining.is_empty() {
                break SelectionOutcome::Empty;
            }
        };

        if !legacy {
            if let Ok(mut bias) = world.get::<&mut PassiveBias>(actor) {
                PassiveBiasEngine::update_streaks(&mut bias, outcome.target());
            }
        }
        Ok(outcome)
    }

    fn select_once(
        &self,
        world: &GameWorld,
        context: &mut AggroContext,
        actor: EcsEntity,
        controller: &HostileController,
        candidates: &[Candidate],
    ) -> SelectionOutcome {
        let (tuning, rng) = context.tuning_and_rng();
        if controller.profile.legacy_mode {
            return self.selector.select_by_tactic(
                world,
                actor,
                controller.profile.tactics,
                controller.target,
                candidates,
                rng,
            );
        }
        match world.get::<&mut ThreatLedger>(actor) {
            Ok(mut ledger) => self
                .selector
                .select_by_threat(tuning, &mut ledger, candidates, rng),
            Err(_) => SelectionOutcome::Empty,
        }
    }

    fn engage(
        context: &AggroContext,
        actor: EcsEntity,
        controller: &mut HostileController,
        target: EcsEntity,
    ) {
        let previous = controller.target;
        if previous != Some(target) {
            tracing::debug!("Actor {:?} new enemy {:?} (was {:?})", actor, target, previous);
            context.publish(AggroEvent::NewEnemy {
                actor,
                previous,
                enemy: target,
            });
        }
        controller.target = Some(target);
        Self::transition(context, actor, controller, AwarenessState::Engaged);

        let mode = if controller.profile.legacy_mode {
            "legacy"
        } else {
            "threat"
        };
        counter!("aggro.selections.total", "mode" => mode).increment(1);
        context.publish(AggroEvent::TargetAcquired { actor, target });
    }

    fn disengage(context: &AggroContext, actor: EcsEntity, controller: &mut HostileController) {
        if let Some(target) = controller.target.take() {
            tracing::debug!("Actor {:?} lost target {:?}", actor, target);
            context.publish(AggroEvent::TargetLost { actor, target });
        }
        if controller.state.is_awake() {
            Self::transition(context, actor, controller, AwarenessState::Returning);
        }
    }

    fn transition(
        context: &AggroContext,
        actor: EcsEntity,
        controller: &mut HostileController,
        to: AwarenessState,
    ) {
        let from = controller.state;
        if from == to {
            return;
        }
        tracing::trace!("Actor {:?} {} -> {}", actor, from.as_str(), to.as_str());
        controller.state = to;
        context.publish(AggroEvent::StateChanged { actor, from, to });
    }

    fn controller(world: &GameWorld, actor: EcsEntity) -> Result<HostileController, AggroError> {
        if !world.contains(actor) {
            return Err(AggroError::NoSuchEntity(actor));
        }
        world
            .get::<&HostileController>(actor)
            .map(|controller| (*controller).clone())
            .map_err(|_| AggroError::NotAnActor(actor))
    }

    fn store(
        world: &GameWorld,
        actor: EcsEntity,
        controller: HostileController,
    ) -> Result<(), AggroError> {
        let mut slot = world
            .get::<&mut HostileController>(actor)
            .map_err(|_| AggroError::NotAnActor(actor))?;
        *slot = controller;
        Ok(())
    }
}

impl Default for HostileAiSystem {
    fn default() -> Self {
        Self::new(ProximityQuery::default())
    }
}

impl std::fmt::Debug for HostileAiSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostileAiSystem")
            .field("alerts", &self.alerts)
            .finish_non_exhaustive()
    }
}
