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

//! Scripted encounter host
//!
//! Builds a world from a [`ScenarioConfig`] and drives the hostile AI tick by tick. The host
//! stands in for the surrounding game: it applies scripted damage, walks returning actors home,
//! and advances the clock.

use crate::config::{CandidateKind, Configuration, ScriptedHit, ScenarioConfig};
use crate::ecs::components::{
    Allegiance, AwarenessState, Concealment, Health, HostileController, Level, Name,
    PassiveThreatSource, Position, Targetable, ThreatLedger,
};
use crate::ecs::events::AggroEvent;
use crate::ecs::systems::HostileAiSystem;
use crate::ecs::{AggroContext, AggroError, EcsEntity, GameWorld};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Name '{0}' is used by more than one entity")]
    DuplicateName(String),

    #[error("Damage script references unknown entity '{0}'")]
    UnknownName(String),

    #[error(transparent)]
    Aggro(#[from] AggroError),
}

/// What happened during one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u32,
    /// Actors that ran a think
    pub thinkers: usize,
    pub events: Vec<AggroEvent>,
}

/// Where an actor stands after a tick
#[derive(Debug, Clone, PartialEq)]
pub struct ActorReport {
    pub name: String,
    pub state: AwarenessState,
    pub target: Option<String>,
    /// Ledger entries by candidate name, highest first
    pub threat: Vec<(String, i64)>,
    /// Lottery odds from the most recent threat selection
    pub odds: Vec<(String, f64)>,
}

pub struct Simulation {
    world: GameWorld,
    context: AggroContext,
    system: HostileAiSystem,
    entities: BTreeMap<String, EcsEntity>,
    actors: Vec<EcsEntity>,
    damage: Vec<ScriptedHit>,
    tick: u32,
    tick_seconds: f32,
}

impl Simulation {
    /// Build the world described by `config`, seeding the random source from it
    pub fn from_config(config: &Configuration) -> Result<Self, SimulationError> {
        let seed = *config.simulation.seed;
        tracing::debug!("Seeding simulation with {}", seed);
        let context = AggroContext::seeded(config.tuning.clone(), seed);
        Self::build(
            &config.scenario,
            context,
            HostileAiSystem::default(),
            config.simulation.tick_seconds,
        )
    }

    /// Build the world from a scenario using the given context and AI system
    pub fn build(
        scenario: &ScenarioConfig,
        context: AggroContext,
        system: HostileAiSystem,
        tick_seconds: f32,
    ) -> Result<Self, SimulationError> {
        let mut world = GameWorld::new();
        let mut entities = BTreeMap::new();
        let mut actors = Vec::with_capacity(scenario.actors.len());

        for template in &scenario.actors {
            let actor = world.spawn((
                Name::new(template.name.as_str()),
                Position::from(template.position),
                Allegiance::new(template.faction, template.kinship.clone()),
                Level(template.level),
                Health::default(),
                HostileController::new(template.profile.clone()),
            ));
            if entities.insert(template.name.clone(), actor).is_some() {
                return Err(SimulationError::DuplicateName(template.name.clone()));
            }
            actors.push(actor);
        }

        for template in &scenario.candidates {
            let targetable = match template.kind {
                CandidateKind::Player => Targetable::player(),
                CandidateKind::Companion => Targetable::companion(None),
                CandidateKind::Creature => Targetable::creature(),
                CandidateKind::Objective => Targetable::inert(),
            };
            let candidate = world.spawn((
                Name::new(template.name.as_str()),
                Position::from(template.position),
                Allegiance::faction(template.faction),
                Level(template.level),
                Health::default(),
                targetable,
            ));
            if let Some(threshold) = template.passive_threshold {
                world
                    .insert_one(candidate, PassiveThreatSource::new(threshold))
                    .map_err(|_| AggroError::NoSuchEntity(candidate))?;
            }
            if template.hiding {
                world
                    .insert_one(candidate, Concealment::hiding(template.deception))
                    .map_err(|_| AggroError::NoSuchEntity(candidate))?;
            }
            if entities.insert(template.name.clone(), candidate).is_some() {
                return Err(SimulationError::DuplicateName(template.name.clone()));
            }
        }

        for hit in &scenario.damage {
            for name in [&hit.attacker, &hit.victim] {
                if !entities.contains_key(name) {
                    return Err(SimulationError::UnknownName(name.clone()));
                }
            }
        }

        tracing::info!(
            "Scenario loaded: {} actors, {} candidates, {} scripted hits",
            actors.len(),
            scenario.candidates.len(),
            scenario.damage.len()
        );

        Ok(Self {
            world,
            context,
            system,
            entities,
            actors,
            damage: scenario.damage.clone(),
            tick: 0,
            tick_seconds,
        })
    }

    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut GameWorld {
        &mut self.world
    }

    pub fn context(&self) -> &AggroContext {
        &self.context
    }

    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    pub fn entity(&self, name: &str) -> Option<EcsEntity> {
        self.entities.get(name).copied()
    }

    /// Display name of an entity, falling back to its debug form
    pub fn name_of(&self, entity: EcsEntity) -> String {
        self.world
            .get::<&Name>(entity)
            .map(|name| name.display.clone())
            .unwrap_or_else(|_| format!("{:?}", entity))
    }

    /// Run one tick: scripted damage, homecomings, AI update, clock advance
    pub fn step(&mut self) -> Result<TickReport, SimulationError> {
        let tick = self.tick;

        let hits: Vec<ScriptedHit> = self
            .damage
            .iter()
            .filter(|hit| hit.tick == tick)
            .cloned()
            .collect();
        for hit in hits {
            let attacker = self.lookup(&hit.attacker)?;
            let victim = self.lookup(&hit.victim)?;
            let amount = hit.amount;
            match self
                .system
                .record_damage(&mut self.world, &self.context, victim, attacker, amount)
            {
                Ok(total) => tracing::debug!(
                    "Tick {}: {} hit {} for {} (threat now {:?})",
                    tick,
                    self.name_of(attacker),
                    self.name_of(victim),
                    amount,
                    total
                ),
                Err(AggroError::NotAnActor(_)) => tracing::trace!(
                    "Tick {}: {} is not an actor; hit ignored",
                    tick,
                    self.name_of(victim)
                ),
                Err(e) => return Err(e.into()),
            }
        }

        for actor in self.actors.clone() {
            let returning = self
                .world
                .get::<&HostileController>(actor)
                .is_ok_and(|controller| controller.state == AwarenessState::Returning);
            if returning {
                self.system
                    .arrive_home(&mut self.world, &self.context, actor)?;
            }
        }

        let thinkers = self
            .system
            .update(&mut self.world, &mut self.context, self.tick_seconds);

        let step = chrono::Duration::milliseconds((self.tick_seconds * 1000.0) as i64);
        self.context.advance(step);
        self.tick += 1;

        Ok(TickReport {
            tick,
            thinkers,
            events: self.context.events().drain(),
        })
    }

    /// Run `ticks` ticks, stopping at the first error
    pub fn run(&mut self, ticks: u32) -> Result<Vec<TickReport>, SimulationError> {
        (0..ticks).map(|_| self.step()).collect()
    }

    /// Current state of every actor, in scenario order
    pub fn report(&self) -> Vec<ActorReport> {
        self.actors
            .iter()
            .filter_map(|actor| {
                let controller = self.world.get::<&HostileController>(*actor).ok()?;
                let (mut threat, odds) = match self.world.get::<&ThreatLedger>(*actor) {
                    Ok(ledger) => (
                        ledger
                            .iter()
                            .map(|(entity, value)| (self.name_of(entity), value))
                            .collect::<Vec<_>>(),
                        ledger
                            .outlook()
                            .positive
                            .iter()
                            .map(|(entity, share)| (self.name_of(*entity), *share))
                            .collect::<Vec<_>>(),
                    ),
                    Err(_) => (Vec::new(), Vec::new()),
                };
                threat.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                Some(ActorReport {
                    name: self.name_of(*actor),
                    state: controller.state,
                    target: controller.target.map(|target| self.name_of(target)),
                    threat,
                    odds,
                })
            })
            .collect()
    }

    /// One-line description of an event using display names
    pub fn describe(&self, event: &AggroEvent) -> String {
        match event {
            AggroEvent::TargetAcquired { actor, target } => {
                format!("{} targets {}", self.name_of(*actor), self.name_of(*target))
            }
            AggroEvent::NewEnemy { actor, enemy, .. } => {
                format!("{} turns on {}", self.name_of(*actor), self.name_of(*enemy))
            }
            AggroEvent::TargetLost { actor, target } => {
                format!("{} lost {}", self.name_of(*actor), self.name_of(*target))
            }
            AggroEvent::StateChanged { actor, from, to } => format!(
                "{} {} -> {}",
                self.name_of(*actor),
                from.as_str(),
                to.as_str()
            ),
            AggroEvent::AllyAlerted {
                alerter,
                ally,
                enemy,
            } => format!(
                "{} alerts {} to {}",
                self.name_of(*alerter),
                self.name_of(*ally),
                self.name_of(*enemy)
            ),
            AggroEvent::DeceptionAttempted {
                actor,
                target,
                chance,
                succeeded,
            } => format!(
                "{} {} {} ({:.0}%)",
                self.name_of(*target),
                if *succeeded { "deceives" } else { "fails to deceive" },
                self.name_of(*actor),
                chance * 100.0
            ),
            AggroEvent::ThreatIncreased {
                actor,
                candidate,
                amount,
                total,
            } => format!(
                "{} threat on {} +{} = {}",
                self.name_of(*actor),
                self.name_of(*candidate),
                amount,
                total
            ),
            AggroEvent::ThreatSkipped { actor, candidate } => format!(
                "{} ignored threat from {}",
                self.name_of(*actor),
                self.name_of(*candidate)
            ),
            AggroEvent::ThreatDecayed {
                actor,
                amount,
                entries,
            } => format!(
                "{} threat decayed by {} across {} entries",
                self.name_of(*actor),
                amount,
                entries
            ),
            AggroEvent::LedgerReset { actor } => {
                format!("{} forgot its threat", self.name_of(*actor))
            }
            AggroEvent::TacticRejected { actor, bits } => {
                format!("{} rejected tactic {:#06x}", self.name_of(*actor), bits)
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<EcsEntity, SimulationError> {
        self.entity(name)
            .ok_or_else(|| SimulationError::UnknownName(name.to_string()))
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.tick)
            .field("entities", &self.entities.len())
            .field("actors", &self.actors.len())
            .finish_non_exhaustive()
    }
}
