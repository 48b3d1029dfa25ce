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

//! Candidate filtering
//!
//! Reduces a raw sighting list to the candidates an actor may target. Rules run in order and the
//! first match excludes the candidate:
//!
//! 1. Not attackable and not a passive threat source, unless it is itself a hostile actor running
//!    non-default tactics
//! 2. In transit
//! 3. Has evaded this actor with an active vanish
//! 4. Fails the live stealth check against this actor's perception
//! 5. Out of range: passive sources use the visual range; the current target uses the chase range;
//!    everything else uses the visual range
//! 6. Same faction and not a retaliation target
//! 7. Actor locked to its current target and this is not it
//! 8. Actor restricted to monsters and this is a player or companion
//!
//! Dead entities are dropped before any rule runs.

use crate::ecs::components::{
    Allegiance, Concealment, EntityKind, Health, HostileController, InTransit,
    PassiveThreatSource, Targetable, Vanish,
};
use crate::ecs::systems::Sighting;
use crate::ecs::{EcsEntity, GameWorld};

/// An eligible targeting candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub entity: EcsEntity,
    pub distance: f64,
    pub kind: EntityKind,
    /// Threshold when the candidate is a passive threat source
    pub passive_threshold: Option<i64>,
}

impl Candidate {
    pub fn is_passive(&self) -> bool {
        self.passive_threshold.is_some()
    }
}

/// Why a sighting was not eligible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    Dead,
    NotTargetable,
    InTransit,
    Evaded,
    Undetected,
    OutOfRange,
    SameFaction,
    NotLockedTarget,
    PlayerSide,
}

impl Exclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exclusion::Dead => "dead",
            Exclusion::NotTargetable => "not targetable",
            Exclusion::InTransit => "in transit",
            Exclusion::Evaded => "evaded",
            Exclusion::Undetected => "undetected",
            Exclusion::OutOfRange => "out of range",
            Exclusion::SameFaction => "same faction",
            Exclusion::NotLockedTarget => "not the locked target",
            Exclusion::PlayerSide => "player side",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateFilter;

impl CandidateFilter {
    pub fn new() -> Self {
        Self
    }

    /// Eligible candidates for `actor`, in sighting order
    pub fn filter(
        &self,
        world: &GameWorld,
        actor: EcsEntity,
        controller: &HostileController,
        sightings: &[Sighting],
    ) -> Vec<Candidate> {
        let allegiance = world
            .get::<&Allegiance>(actor)
            .map(|a| (*a).clone())
            .unwrap_or_default();

        sightings
            .iter()
            .filter(|sighting| sighting.entity != actor)
            .filter_map(|sighting| {
                match self.evaluate(world, actor, controller, &allegiance, sighting) {
                    Ok(candidate) => Some(candidate),
                    Err(exclusion) => {
                        tracing::trace!(
                            "Actor {:?} excluded {:?}: {}",
                            actor,
                            sighting.entity,
                            exclusion.as_str()
                        );
                        None
                    }
                }
            })
            .collect()
    }

    /// Apply every rule to one sighting
    pub fn evaluate(
        &self,
        world: &GameWorld,
        actor: EcsEntity,
        controller: &HostileController,
        allegiance: &Allegiance,
        sighting: &Sighting,
    ) -> Result<Candidate, Exclusion> {
        let entity = sighting.entity;
        let entity_ref = world.entity(entity).map_err(|_| Exclusion::Dead)?;

        if entity_ref
            .get::<&Health>()
            .is_some_and(|health| !health.is_alive())
        {
            return Err(Exclusion::Dead);
        }

        let targetable = entity_ref.get::<&Targetable>().map(|t| *t);
        let passive_threshold = entity_ref
            .get::<&PassiveThreatSource>()
            .map(|p| p.threshold);
        let attackable = targetable.is_some_and(|t| t.attackable);
        let runs_tactics = entity_ref
            .get::<&HostileController>()
            .is_some_and(|other| !other.profile.tactics.is_default());

        // 1
        if !attackable && passive_threshold.is_none() && !runs_tactics {
            return Err(Exclusion::NotTargetable);
        }

        // 2
        if entity_ref.has::<InTransit>() {
            return Err(Exclusion::InTransit);
        }

        // 3
        if entity_ref
            .get::<&Vanish>()
            .is_some_and(|vanish| vanish.has_evaded(actor))
        {
            return Err(Exclusion::Evaded);
        }

        // 4
        if entity_ref
            .get::<&Concealment>()
            .is_some_and(|c| !c.detected_by(controller.profile.perception))
        {
            return Err(Exclusion::Undetected);
        }

        // 5
        let range_sq = if passive_threshold.is_some() {
            controller.profile.visual_range_sq()
        } else if controller.target == Some(entity) {
            controller.profile.chase_range_sq()
        } else {
            controller.profile.visual_range_sq()
        };
        if sighting.distance_squared() > range_sq {
            return Err(Exclusion::OutOfRange);
        }

        // 6
        if entity_ref
            .get::<&Allegiance>()
            .is_some_and(|other| allegiance.same_faction(&other))
            && !controller.is_retaliation_target(entity)
        {
            return Err(Exclusion::SameFaction);
        }

        // 7
        if controller.is_locked_to_target() {
            if let Some(target) = controller.target {
                if target != entity {
                    return Err(Exclusion::NotLockedTarget);
                }
            }
        }

        let kind = targetable.map_or(EntityKind::Creature, |t| t.kind);

        // 8
        if controller.monsters_only() && kind.is_player_side() {
            return Err(Exclusion::PlayerSide);
        }

        Ok(Candidate {
            entity,
            distance: sighting.distance,
            kind,
            passive_threshold,
        })
    }
}
