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

//! Hostile actor controller

use crate::ecs::EcsEntity;
use aggro_common::{ActorProfile, Tolerance};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Awareness state of a hostile actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AwarenessState {
    /// Asleep or unaware
    Idle,
    /// Woken, but nothing chosen yet
    Awake,
    /// Fighting its current target
    Engaged,
    /// Lost everything it was fighting and heading home
    Returning,
}

impl AwarenessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AwarenessState::Idle => "Idle",
            AwarenessState::Awake => "Awake",
            AwarenessState::Engaged => "Engaged",
            AwarenessState::Returning => "Returning",
        }
    }

    pub fn is_awake(&self) -> bool {
        matches!(self, AwarenessState::Awake | AwarenessState::Engaged)
    }
}

/// Hostile actor ("monster") controller component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostileController {
    pub profile: ActorProfile,
    pub state: AwarenessState,
    pub target: Option<EcsEntity>,
    /// Same-faction entities this actor may attack anyway
    pub retaliation: HashSet<EcsEntity>,
    /// Mode used on the previous think; `None` before the first one
    pub last_legacy_mode: Option<bool>,
    pub time_since_think: f32,
}

impl HostileController {
    pub fn new(profile: ActorProfile) -> Self {
        let time_since_think = profile.think_interval;
        Self {
            profile,
            state: AwarenessState::Idle,
            target: None,
            retaliation: HashSet::new(),
            last_legacy_mode: None,
            time_since_think,
        }
    }

    /// Check if the actor should think this tick
    pub fn should_think(&self) -> bool {
        self.time_since_think >= self.profile.think_interval
    }

    pub fn mark_thought(&mut self) {
        self.time_since_think = 0.0;
    }

    pub fn update_timer(&mut self, delta_time: f32) {
        self.time_since_think += delta_time;
    }

    pub fn is_locked_to_target(&self) -> bool {
        self.profile.tolerances.contains(Tolerance::LockedToTarget)
    }

    pub fn monsters_only(&self) -> bool {
        self.profile.tolerances.contains(Tolerance::MonstersOnly)
    }

    pub fn ignores_alerts(&self) -> bool {
        self.profile.tolerances.contains(Tolerance::IgnoreAlerts)
    }

    /// Allow attacking a same-faction entity from now on
    pub fn retaliate_against(&mut self, entity: EcsEntity) {
        self.retaliation.insert(entity);
    }

    pub fn forgive(&mut self, entity: EcsEntity) {
        self.retaliation.remove(&entity);
    }

    pub fn is_retaliation_target(&self, entity: EcsEntity) -> bool {
        self.retaliation.contains(&entity)
    }

    /// Whether the configured mode differs from the one used on the previous think
    pub fn mode_switched(&self) -> bool {
        self.last_legacy_mode
            .is_some_and(|legacy| legacy != self.profile.legacy_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aggro_common::{TacticSet, Tolerances};

    #[test]
    fn test_think_timer() {
        let mut controller = HostileController::new(ActorProfile::default());
        assert!(controller.should_think());

        controller.mark_thought();
        assert!(!controller.should_think());

        controller.update_timer(1.0);
        assert!(controller.should_think());
    }

    #[test]
    fn test_tolerances() {
        let profile = ActorProfile::default()
            .with_tolerances(Tolerances::from(Tolerance::LockedToTarget));
        let controller = HostileController::new(profile);
        assert!(controller.is_locked_to_target());
        assert!(!controller.monsters_only());
    }

    #[test]
    fn test_retaliation_registry() {
        let mut world = hecs::World::new();
        let rival = world.spawn(());
        let mut controller = HostileController::new(ActorProfile::default());

        controller.retaliate_against(rival);
        assert!(controller.is_retaliation_target(rival));
        controller.forgive(rival);
        assert!(!controller.is_retaliation_target(rival));
    }

    #[test]
    fn test_mode_switch_detection() {
        let mut controller = HostileController::new(ActorProfile::default());
        assert!(!controller.mode_switched());

        controller.last_legacy_mode = Some(false);
        assert!(!controller.mode_switched());

        controller.profile = controller
            .profile
            .clone()
            .with_legacy_tactics(TacticSet::default());
        assert!(controller.mode_switched());
    }
}
