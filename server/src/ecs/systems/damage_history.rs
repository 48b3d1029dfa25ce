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

//! Damage history lookups for the LastDamager and TopDamager tactics

use crate::ecs::components::DamageLog;
use crate::ecs::{EcsEntity, GameWorld};

#[cfg_attr(test, mockall::automock)]
pub trait DamageHistory {
    fn last_damager(&self, world: &GameWorld, actor: EcsEntity) -> Option<EcsEntity>;
    fn top_damager(&self, world: &GameWorld, actor: EcsEntity) -> Option<EcsEntity>;
}

/// Reads the actor's [`DamageLog`] component
#[derive(Debug, Clone, Copy, Default)]
pub struct DamageLogHistory;

impl DamageHistory for DamageLogHistory {
    fn last_damager(&self, world: &GameWorld, actor: EcsEntity) -> Option<EcsEntity> {
        world.get::<&DamageLog>(actor).ok()?.last_damager()
    }

    fn top_damager(&self, world: &GameWorld, actor: EcsEntity) -> Option<EcsEntity> {
        world.get::<&DamageLog>(actor).ok()?.top_damager()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_reads_damage_log() {
        let mut world = GameWorld::new();
        let first = world.spawn(());
        let second = world.spawn(());

        let mut log = DamageLog::default();
        log.record(first, 50, Utc::now());
        log.record(second, 10, Utc::now());
        let actor = world.spawn((log,));

        let history = DamageLogHistory;
        assert_eq!(history.last_damager(&world, actor), Some(second));
        assert_eq!(history.top_damager(&world, actor), Some(first));
    }

    #[test]
    fn test_no_log() {
        let mut world = GameWorld::new();
        let actor = world.spawn(());
        assert_eq!(DamageLogHistory.last_damager(&world, actor), None);
        assert_eq!(DamageLogHistory.top_damager(&world, actor), None);
    }
}
