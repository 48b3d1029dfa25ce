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

//! Combat components consulted by target selection

use crate::ecs::EcsEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Hit points; an entity at zero is dead and gets pruned from ledgers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub maximum: f32,
}

impl Health {
    pub fn new(maximum: f32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn apply_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Character or creature level used by the Weakest/Strongest tactics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Level(pub u32);

/// One damage record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageEntry {
    pub attacker: EcsEntity,
    pub amount: i64,
    pub at: DateTime<Utc>,
}

/// Recent damage taken by an actor, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageLog {
    pub entries: VecDeque<DamageEntry>,
    pub capacity: usize,
}

impl DamageLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, attacker: EcsEntity, amount: i64, at: DateTime<Utc>) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(DamageEntry { attacker, amount, at });
    }

    pub fn last_damager(&self) -> Option<EcsEntity> {
        self.entries.back().map(|e| e.attacker)
    }

    /// Attacker with the largest summed damage; ties go to whoever hit first
    pub fn top_damager(&self) -> Option<EcsEntity> {
        let mut totals: Vec<(EcsEntity, i64)> = Vec::new();
        for entry in &self.entries {
            match totals.iter_mut().find(|(attacker, _)| *attacker == entry.attacker) {
                Some((_, total)) => *total = total.saturating_add(entry.amount),
                None => totals.push((entry.attacker, entry.amount)),
            }
        }
        totals
            .into_iter()
            .fold(None, |best: Option<(EcsEntity, i64)>, (attacker, total)| match best {
                Some((_, best_total)) if best_total >= total => best,
                _ => Some((attacker, total)),
            })
            .map(|(attacker, _)| attacker)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for DamageLog {
    fn default() -> Self {
        Self::new(32)
    }
}
