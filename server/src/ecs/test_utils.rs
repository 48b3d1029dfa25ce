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

//! Test utilities for ECS testing

use crate::config::ThreatTuning;
use crate::ecs::components::{
    Allegiance, EntityKind, Health, HostileController, Level, Name, PassiveThreatSource, Position,
    Targetable,
};
use crate::ecs::systems::Candidate;
use crate::ecs::{AggroContext, EcsEntity, GameWorld};
use aggro_common::{ActorProfile, FactionId, Kinship, TacticSet};

/// Seed shared by every test world
pub const TEST_SEED: u64 = 0x5EED;

/// Create an empty world and a seeded context with default tuning
pub fn test_world() -> (GameWorld, AggroContext) {
    (
        GameWorld::new(),
        AggroContext::seeded(ThreatTuning::default(), TEST_SEED),
    )
}

/// Spawn a threat-table actor of kind "orc" in faction 1
pub fn spawn_actor(world: &mut GameWorld, position: [f64; 3]) -> EcsEntity {
    spawn_actor_with(world, position, ActorProfile::default())
}

pub fn spawn_actor_with(
    world: &mut GameWorld,
    position: [f64; 3],
    profile: ActorProfile,
) -> EcsEntity {
    world.spawn((
        Name::new("orc"),
        Position::from(position),
        Allegiance::new(FactionId(1), Kinship::new("orc")),
        Health::default(),
        Level(5),
        HostileController::new(profile),
    ))
}

pub fn spawn_legacy_actor(
    world: &mut GameWorld,
    position: [f64; 3],
    tactics: TacticSet,
) -> EcsEntity {
    spawn_actor_with(
        world,
        position,
        ActorProfile::default().with_legacy_tactics(tactics),
    )
}

pub fn spawn_player(world: &mut GameWorld, name: &str, position: [f64; 3]) -> EcsEntity {
    world.spawn((
        Name::new(name),
        Position::from(position),
        Targetable::player(),
        Health::default(),
        Level(1),
    ))
}

/// Spawn an inert objective generating passive threat
pub fn spawn_passive(
    world: &mut GameWorld,
    name: &str,
    position: [f64; 3],
    threshold: i64,
) -> EcsEntity {
    world.spawn((
        Name::new(name),
        Position::from(position),
        Targetable::inert(),
        PassiveThreatSource::new(threshold),
        Health::default(),
    ))
}

/// A non-passive player candidate at the given distance
pub fn candidate(entity: EcsEntity, distance: f64) -> Candidate {
    Candidate {
        entity,
        distance,
        kind: EntityKind::Player,
        passive_threshold: None,
    }
}

pub fn passive_candidate(entity: EcsEntity, distance: f64, threshold: i64) -> Candidate {
    Candidate {
        entity,
        distance,
        kind: EntityKind::Creature,
        passive_threshold: Some(threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_helpers() {
        let (mut world, _context) = test_world();
        let actor = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let player = spawn_player(&mut world, "Aria", [1.0, 0.0, 0.0]);
        let objective = spawn_passive(&mut world, "Banner", [2.0, 0.0, 0.0], 10);

        assert!(world.get::<&HostileController>(actor).is_ok());
        assert!(world.get::<&Targetable>(player).unwrap().kind.is_player());
        assert_eq!(world.get::<&PassiveThreatSource>(objective).unwrap().threshold, 10);
    }
}
