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

//! Stealth and deception components carried by candidates

use crate::ecs::EcsEntity;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How well a candidate hides from and misleads hostile actors
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Concealment {
    /// Cloaked; invisible to actors whose perception is below `stealth`
    pub stealthed: bool,
    pub stealth: u32,
    /// Actively trying to slip out of an actor's attention
    pub hiding: bool,
    pub deception: u32,
    /// Trained in misdirection; doubles deception odds in a crowd
    pub specialized_deception: bool,
    /// A deception ability is currently running
    pub ability_active: bool,
}

impl Concealment {
    pub fn hiding(deception: u32) -> Self {
        Self {
            hiding: true,
            deception,
            ..Self::default()
        }
    }

    pub fn stealthed(stealth: u32) -> Self {
        Self {
            stealthed: true,
            stealth,
            ..Self::default()
        }
    }

    /// Live check of the cloak against one actor's perception
    pub fn detected_by(&self, perception: u32) -> bool {
        !self.stealthed || perception >= self.stealth
    }
}

/// Evasion ("vanish") effect
///
/// Records the actors this candidate successfully evaded. Each listed actor cannot detect the
/// candidate until the effect ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vanish {
    pub evaded: HashSet<EcsEntity>,
    pub active: bool,
}

impl Vanish {
    pub fn new() -> Self {
        Self {
            evaded: HashSet::new(),
            active: true,
        }
    }

    pub fn evade(&mut self, actor: EcsEntity) {
        if self.active {
            self.evaded.insert(actor);
        }
    }

    pub fn has_evaded(&self, actor: EcsEntity) -> bool {
        self.active && self.evaded.contains(&actor)
    }

    /// End the effect; every actor may detect the candidate again
    pub fn end(&mut self) {
        self.active = false;
        self.evaded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloak_detection() {
        let cloak = Concealment::stealthed(20);
        assert!(!cloak.detected_by(10));
        assert!(cloak.detected_by(20));
        assert!(Concealment::default().detected_by(0));
    }

    #[test]
    fn test_vanish_lifecycle() {
        let mut world = hecs::World::new();
        let actor = world.spawn(());
        let other = world.spawn(());

        let mut vanish = Vanish::new();
        vanish.evade(actor);
        assert!(vanish.has_evaded(actor));
        assert!(!vanish.has_evaded(other));

        vanish.end();
        assert!(!vanish.has_evaded(actor));

        vanish.evade(actor);
        assert!(!vanish.has_evaded(actor));
    }
}
