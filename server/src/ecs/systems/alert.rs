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

//! Ally alerting
//!
//! When an actor wakes onto a target it calls nearby kin. A neighbor answers when it is asleep,
//! alive, listening, related by creature or friend type, and within its own aural range of the
//! caller. Answering neighbors take the same target directly; they do not call further.
//!
//! Alerts about one enemy are suppressed for `alert_cooldown_secs` after the last call, no matter
//! which actor made it.

use crate::ecs::components::{Allegiance, AwarenessState, HostileController, ThreatLedger};
use crate::ecs::events::AggroEvent;
use crate::ecs::systems::{ThreatSystem, VisibilityQuery};
use crate::ecs::{AggroContext, EcsEntity, GameWorld};
use chrono::{DateTime, Utc};
use metrics::counter;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct AlertPropagator {
    last_alert: HashMap<EcsEntity, DateTime<Utc>>,
}

impl AlertPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an alert about `enemy` is still cooling down at `now`
    pub fn on_cooldown(&self, context: &AggroContext, enemy: EcsEntity) -> bool {
        self.last_alert
            .get(&enemy)
            .is_some_and(|at| context.now() - *at < context.tuning().alert_cooldown())
    }

    /// Forget cooldowns that have expired
    pub fn expire(&mut self, context: &AggroContext) {
        let cooldown = context.tuning().alert_cooldown();
        let now = context.now();
        self.last_alert.retain(|_, at| now - *at < cooldown);
    }

    /// Wake kin of `caller` onto `enemy`. Returns the allies that answered.
    pub fn propagate(
        &mut self,
        world: &mut GameWorld,
        context: &AggroContext,
        visibility: &dyn VisibilityQuery,
        caller: EcsEntity,
        enemy: EcsEntity,
    ) -> Vec<EcsEntity> {
        if self.on_cooldown(context, enemy) {
            tracing::trace!("Alert about {:?} suppressed by cooldown", enemy);
            return Vec::new();
        }
        self.last_alert.insert(enemy, context.now());

        let Ok(caller_allegiance) = world.get::<&Allegiance>(caller).map(|a| (*a).clone()) else {
            return Vec::new();
        };
        let caller_retaliates = world
            .get::<&HostileController>(caller)
            .is_ok_and(|c| c.is_retaliation_target(enemy));
        let enemy_allegiance = world.get::<&Allegiance>(enemy).map(|a| (*a).clone()).ok();

        let answering: Vec<EcsEntity> = visibility
            .visible(world, caller)
            .into_iter()
            .filter(|sighting| sighting.entity != enemy)
            .filter(|sighting| {
                let heard_from = visibility
                    .distance(world, sighting.entity, caller)
                    .unwrap_or(sighting.distance);
                Self::answers(world, &caller_allegiance, sighting.entity, heard_from)
            })
            .map(|sighting| sighting.entity)
            .collect();

        for ally in &answering {
            let ally = *ally;
            let shares_enemy_faction = match (&enemy_allegiance, world.get::<&Allegiance>(ally)) {
                (Some(enemy_allegiance), Ok(ally_allegiance)) => {
                    ally_allegiance.same_faction(enemy_allegiance)
                }
                _ => false,
            };

            let mut legacy = true;
            if let Ok(mut controller) = world.get::<&mut HostileController>(ally) {
                let from = controller.state;
                controller.target = Some(enemy);
                controller.state = AwarenessState::Engaged;
                if shares_enemy_faction && caller_retaliates {
                    controller.retaliate_against(enemy);
                }
                legacy = controller.profile.legacy_mode;
                context.publish(AggroEvent::StateChanged {
                    actor: ally,
                    from,
                    to: AwarenessState::Engaged,
                });
            }

            if !legacy && !ThreatSystem::is_reserved(world, context.tuning(), enemy) {
                if ThreatSystem::ensure_ledger(world, ally).is_ok() {
                    if let Ok(mut ledger) = world.get::<&mut ThreatLedger>(ally) {
                        ledger.seed(enemy, context.threat_minimum());
                    }
                }
            }

            tracing::debug!("Actor {:?} alerted ally {:?} to {:?}", caller, ally, enemy);
            counter!("aggro.alerts.total").increment(1);
            context.publish(AggroEvent::AllyAlerted {
                alerter: caller,
                ally,
                enemy,
            });
        }

        answering
    }

    fn answers(
        world: &GameWorld,
        caller_allegiance: &Allegiance,
        neighbor: EcsEntity,
        distance: f64,
    ) -> bool {
        let Ok(entity_ref) = world.entity(neighbor) else {
            return false;
        };
        let Some(controller) = entity_ref.get::<&HostileController>() else {
            return false;
        };
        if controller.state.is_awake() || controller.ignores_alerts() {
            return false;
        }
        if distance > controller.profile.aural_range {
            return false;
        }
        if !ThreatSystem::is_present(world, neighbor) {
            return false;
        }
        entity_ref
            .get::<&Allegiance>()
            .is_some_and(|a| a.kinship.is_kin(&caller_allegiance.kinship))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Health, Position};
    use crate::ecs::systems::{MockVisibilityQuery, ProximityQuery, Sighting};
    use crate::ecs::test_utils::*;
    use aggro_common::{ActorProfile, FactionId, Kinship, Tolerance, Tolerances};

    fn spawn_kin(world: &mut GameWorld, position: [f64; 3], kin: &str) -> EcsEntity {
        world.spawn((
            Position::from(position),
            Allegiance::new(FactionId(1), Kinship::new(kin)),
            Health::default(),
            HostileController::new(ActorProfile::default().with_ranges(12.0, 6.0, 18.0)),
        ))
    }

    #[test]
    fn test_wakes_kin_within_aural_range() {
        let (mut world, context) = test_world();
        let caller = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let enemy = spawn_player(&mut world, "Aria", [3.0, 0.0, 0.0]);
        let near = spawn_kin(&mut world, [4.0, 0.0, 0.0], "orc");
        let deaf = spawn_kin(&mut world, [9.0, 0.0, 0.0], "orc");
        let stranger = spawn_kin(&mut world, [2.0, 0.0, 0.0], "kobold");

        let mut alerts = AlertPropagator::new();
        let answered =
            alerts.propagate(&mut world, &context, &ProximityQuery::default(), caller, enemy);

        assert_eq!(answered, vec![near]);
        let controller = world.get::<&HostileController>(near).unwrap();
        assert_eq!(controller.target, Some(enemy));
        assert_eq!(controller.state, AwarenessState::Engaged);
        assert_eq!(
            world.get::<&ThreatLedger>(near).unwrap().value(enemy),
            Some(100)
        );
        assert_eq!(world.get::<&HostileController>(deaf).unwrap().target, None);
        assert_eq!(world.get::<&HostileController>(stranger).unwrap().target, None);
    }

    #[test]
    fn test_aural_range_measured_from_neighbor() {
        let (mut world, context) = test_world();
        let caller = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let enemy = spawn_player(&mut world, "Aria", [3.0, 0.0, 0.0]);
        let near = spawn_kin(&mut world, [1.0, 0.0, 0.0], "orc");
        let far = spawn_kin(&mut world, [1.0, 0.0, 0.0], "orc");

        let mut visibility = MockVisibilityQuery::new();
        visibility.expect_visible().returning(move |_, _| {
            vec![
                Sighting::new(enemy, 3.0),
                Sighting::new(near, 1.0),
                Sighting::new(far, 1.0),
            ]
        });
        visibility
            .expect_distance()
            .returning(move |_, from, _| Some(if from == far { 30.0 } else { 1.0 }));

        let answered =
            AlertPropagator::new().propagate(&mut world, &context, &visibility, caller, enemy);
        assert_eq!(answered, vec![near]);
    }

    #[test]
    fn test_friend_types_answer() {
        let (mut world, context) = test_world();
        let caller = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let enemy = spawn_player(&mut world, "Aria", [3.0, 0.0, 0.0]);
        let goblin = world.spawn((
            Position::new(1.0, 0.0, 0.0),
            Allegiance::new(FactionId(1), Kinship::new("goblin").with_friend("orc")),
            HostileController::new(ActorProfile::default()),
        ));

        let answered = AlertPropagator::new().propagate(
            &mut world,
            &context,
            &ProximityQuery::default(),
            caller,
            enemy,
        );
        assert_eq!(answered, vec![goblin]);
    }

    #[test]
    fn test_skips_awake_and_deaf_allies() {
        let (mut world, context) = test_world();
        let caller = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let enemy = spawn_player(&mut world, "Aria", [3.0, 0.0, 0.0]);
        let busy = spawn_kin(&mut world, [1.0, 0.0, 0.0], "orc");
        world.get::<&mut HostileController>(busy).unwrap().state = AwarenessState::Engaged;
        let ignoring = world.spawn((
            Position::new(1.0, 0.0, 0.0),
            Allegiance::new(FactionId(1), Kinship::new("orc")),
            HostileController::new(
                ActorProfile::default().with_tolerances(Tolerances::from(Tolerance::IgnoreAlerts)),
            ),
        ));
        let corpse = spawn_kin(&mut world, [1.0, 0.0, 0.0], "orc");
        world.get::<&mut Health>(corpse).unwrap().apply_damage(1000.0);

        let answered = AlertPropagator::new().propagate(
            &mut world,
            &context,
            &ProximityQuery::default(),
            caller,
            enemy,
        );
        assert!(answered.is_empty());
        assert_eq!(world.get::<&HostileController>(ignoring).unwrap().target, None);
    }

    #[test]
    fn test_cooldown_per_enemy() {
        let (mut world, mut context) = test_world();
        let caller = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let enemy = spawn_player(&mut world, "Aria", [3.0, 0.0, 0.0]);
        let other_enemy = spawn_player(&mut world, "Bram", [3.0, 0.0, 0.0]);
        let query = ProximityQuery::default();
        let mut alerts = AlertPropagator::new();

        alerts.propagate(&mut world, &context, &query, caller, enemy);
        assert!(alerts.on_cooldown(&context, enemy));
        assert!(!alerts.on_cooldown(&context, other_enemy));

        let ally = spawn_kin(&mut world, [1.0, 0.0, 0.0], "orc");
        assert!(alerts.propagate(&mut world, &context, &query, caller, enemy).is_empty());

        context.advance(chrono::Duration::seconds(121));
        assert!(!alerts.on_cooldown(&context, enemy));
        assert_eq!(
            alerts.propagate(&mut world, &context, &query, caller, enemy),
            vec![ally]
        );

        context.advance(chrono::Duration::seconds(500));
        alerts.expire(&context);
        assert!(!alerts.on_cooldown(&context, enemy));
    }

    #[test]
    fn test_registers_retaliation_for_shared_faction_enemy() {
        let (mut world, context) = test_world();
        let caller = spawn_actor(&mut world, [0.0, 0.0, 0.0]);
        let traitor = world.spawn((
            Position::new(2.0, 0.0, 0.0),
            Allegiance::new(FactionId(1), Kinship::new("troll")),
            crate::ecs::components::Targetable::creature(),
        ));
        world
            .get::<&mut HostileController>(caller)
            .unwrap()
            .retaliate_against(traitor);
        let ally = spawn_kin(&mut world, [1.0, 0.0, 0.0], "orc");

        AlertPropagator::new().propagate(
            &mut world,
            &context,
            &ProximityQuery::default(),
            caller,
            traitor,
        );
        assert!(
            world
                .get::<&HostileController>(ally)
                .unwrap()
                .is_retaliation_target(traitor)
        );
    }
}
