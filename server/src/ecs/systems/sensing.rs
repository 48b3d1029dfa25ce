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

//! Visibility queries

use crate::ecs::components::{HostileController, Position};
use crate::ecs::{EcsEntity, GameWorld};

/// One entity seen by an actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub entity: EcsEntity,
    pub distance: f64,
}

impl Sighting {
    pub fn new(entity: EcsEntity, distance: f64) -> Self {
        Self { entity, distance }
    }

    pub fn distance_squared(&self) -> f64 {
        self.distance * self.distance
    }
}

/// Spatial collaborator supplying what an actor can currently perceive
#[cfg_attr(test, mockall::automock)]
pub trait VisibilityQuery {
    /// Entities near `actor`, excluding the actor itself
    fn visible(&self, world: &GameWorld, actor: EcsEntity) -> Vec<Sighting>;

    /// Scalar distance between two entities; `None` if either has no position
    fn distance(&self, world: &GameWorld, from: EcsEntity, to: EcsEntity) -> Option<f64>;
}

/// Radius scan over [`Position`]
///
/// Hostile actors scan out to the larger of their visual and chase ranges so a fleeing target is
/// still reported; everything else uses `default_radius`. Sightings come back in world iteration
/// order, which is stable for a given spawn sequence.
#[derive(Debug, Clone, Copy)]
pub struct ProximityQuery {
    pub default_radius: f64,
}

impl ProximityQuery {
    pub fn new(default_radius: f64) -> Self {
        Self { default_radius }
    }

    fn scan_radius(&self, world: &GameWorld, actor: EcsEntity) -> f64 {
        match world.get::<&HostileController>(actor) {
            Ok(controller) => controller
                .profile
                .visual_range
                .max(controller.profile.chase_range),
            Err(_) => self.default_radius,
        }
    }
}

impl Default for ProximityQuery {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl VisibilityQuery for ProximityQuery {
    fn visible(&self, world: &GameWorld, actor: EcsEntity) -> Vec<Sighting> {
        let origin = match world.get::<&Position>(actor) {
            Ok(position) => *position,
            Err(_) => return Vec::new(),
        };
        let radius_sq = self.scan_radius(world, actor).powi(2);

        world
            .iter()
            .filter(|entity_ref| entity_ref.entity() != actor)
            .filter_map(|entity_ref| {
                let position = entity_ref.get::<&Position>()?;
                let distance_sq = origin.distance_squared(&position);
                (distance_sq <= radius_sq)
                    .then(|| Sighting::new(entity_ref.entity(), distance_sq.sqrt()))
            })
            .collect()
    }

    fn distance(&self, world: &GameWorld, from: EcsEntity, to: EcsEntity) -> Option<f64> {
        let a = *world.get::<&Position>(from).ok()?;
        let b = *world.get::<&Position>(to).ok()?;
        Some(a.distance(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aggro_common::ActorProfile;

    #[test]
    fn test_radius_scan() {
        let mut world = GameWorld::new();
        let actor = world.spawn((
            Position::new(0.0, 0.0, 0.0),
            HostileController::new(ActorProfile::default().with_ranges(10.0, 5.0, 15.0)),
        ));
        let near = world.spawn((Position::new(3.0, 4.0, 0.0),));
        let chase = world.spawn((Position::new(14.0, 0.0, 0.0),));
        let far = world.spawn((Position::new(30.0, 0.0, 0.0),));
        let _nowhere = world.spawn(());

        let query = ProximityQuery::default();
        let seen: Vec<EcsEntity> = query
            .visible(&world, actor)
            .iter()
            .map(|s| s.entity)
            .collect();

        assert!(seen.contains(&near));
        assert!(seen.contains(&chase));
        assert!(!seen.contains(&far));
        assert!(!seen.contains(&actor));
        assert_eq!(query.distance(&world, actor, near), Some(5.0));
    }

    #[test]
    fn test_no_position_sees_nothing() {
        let mut world = GameWorld::new();
        let actor = world.spawn(());
        world.spawn((Position::new(0.0, 0.0, 0.0),));

        let query = ProximityQuery::default();
        assert!(query.visible(&world, actor).is_empty());
        assert_eq!(query.distance(&world, actor, actor), None);
    }
}
