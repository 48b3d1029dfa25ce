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

//! # Threat Components
//!
//! ## Ledger
//! Every hostile actor in threat-table mode owns a [`ThreatLedger`]: candidate -> integer threat.
//! While an entry exists its value never drops below the threat floor (`threat_minimum`, 100 by
//! default). Entries are created lazily at the floor, raised by combat events, lowered once per
//! tick by decay, and pruned when the candidate dies or disappears.
//!
//! Entries are kept in a `BTreeMap` so iteration order, and therefore every random draw made
//! over the ledger, is reproducible for a fixed seed.
//!
//! ## Decay
//! ```text
//! minimum_subtraction = max(1, floor((total - floor * count) * decay_fraction))
//! decay               = max(floor(gained_since_decay / count), minimum_subtraction)
//! ```
//! `decay` is subtracted from each entry, clamped at the floor. Passive sources with a threshold
//! of at least 2 are held at `floor + threshold`.
//!
//! ## Outlook
//! Each selection pass rebuilds a [`ThreatOutlook`] of lottery odds (positive) and distance to
//! the lottery cut (negative). It is diagnostic only.

use crate::ecs::EcsEntity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-actor threat table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreatLedger {
    entries: BTreeMap<EcsEntity, i64>,
    /// Threat added since the last decay
    gained_since_decay: i64,
    outlook: ThreatOutlook,
}

impl ThreatLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn value(&self, entity: EcsEntity) -> Option<i64> {
        self.entries.get(&entity).copied()
    }

    pub fn contains(&self, entity: EcsEntity) -> bool {
        self.entries.contains_key(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EcsEntity, i64)> + '_ {
        self.entries.iter().map(|(entity, value)| (*entity, *value))
    }

    /// Sum of every entry, saturating at `i64::MAX`
    pub fn total(&self) -> i64 {
        self.entries
            .values()
            .fold(0i64, |total, value| total.saturating_add(*value))
    }

    pub fn gained_since_decay(&self) -> i64 {
        self.gained_since_decay
    }

    /// Create an entry at the floor if absent. Returns whether one was created.
    pub fn seed(&mut self, entity: EcsEntity, floor: i64) -> bool {
        if self.entries.contains_key(&entity) {
            return false;
        }
        self.entries.insert(entity, floor);
        true
    }

    /// Add threat, creating the entry at the floor first
    pub fn add(&mut self, entity: EcsEntity, amount: i64, floor: i64) -> i64 {
        let value = self.entries.entry(entity).or_insert(floor);
        *value = value.saturating_add(amount).max(floor);
        self.gained_since_decay = self.gained_since_decay.saturating_add(amount);
        *value
    }

    /// Raise an existing entry to `value` if it is currently lower
    pub fn raise_to(&mut self, entity: EcsEntity, value: i64) -> bool {
        match self.entries.get_mut(&entity) {
            Some(current) if *current < value => {
                *current = value;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, entity: EcsEntity) -> Option<i64> {
        self.outlook.forget(entity);
        self.entries.remove(&entity)
    }

    /// Drop every entry the predicate rejects. Returns the removed candidates.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<EcsEntity>
    where
        F: FnMut(EcsEntity) -> bool,
    {
        let removed: Vec<EcsEntity> = self
            .entries
            .keys()
            .copied()
            .filter(|entity| !keep(*entity))
            .collect();
        for entity in &removed {
            self.remove(*entity);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.gained_since_decay = 0;
        self.outlook.clear();
    }

    /// Apply one decay step. `passive_threshold` reports the threshold of passive candidates.
    ///
    /// Returns the amount subtracted, or `None` when the ledger is empty.
    pub fn decay<F>(&mut self, floor: i64, fraction: f64, passive_threshold: F) -> Option<i64>
    where
        F: Fn(EcsEntity) -> Option<i64>,
    {
        if self.entries.is_empty() {
            return None;
        }

        let count = self.entries.len() as i64;
        let excess = self.total().saturating_sub(floor.saturating_mul(count)).max(0);
        let minimum_subtraction = ((excess as f64 * fraction).floor() as i64).max(1);
        let decay = (self.gained_since_decay / count).max(minimum_subtraction);

        for (entity, value) in self.entries.iter_mut() {
            *value = value.saturating_sub(decay).max(floor);
            if let Some(threshold) = passive_threshold(*entity) {
                if threshold >= 2 {
                    *value = (*value).max(floor.saturating_add(threshold));
                }
            }
        }
        self.gained_since_decay = 0;
        Some(decay)
    }

    pub fn outlook(&self) -> &ThreatOutlook {
        &self.outlook
    }

    pub fn set_outlook(&mut self, outlook: ThreatOutlook) {
        self.outlook = outlook;
    }
}

/// Ephemeral per-pass view of lottery odds, for feedback only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatOutlook {
    /// Share of the lottery held by each candidate above the cut
    pub positive: BTreeMap<EcsEntity, f64>,
    /// `(value / cut) - 1` for each candidate below the cut
    pub negative: BTreeMap<EcsEntity, f64>,
}

impl ThreatOutlook {
    pub fn clear(&mut self) {
        self.positive.clear();
        self.negative.clear();
    }

    pub fn forget(&mut self, entity: EcsEntity) {
        self.positive.remove(&entity);
        self.negative.remove(&entity);
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }
}

/// Smoothing and debounce state for one passive source
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PassiveBiasEntry {
    /// Exponential moving average of desired pressure; `None` until first seen
    pub ema: Option<f64>,
    /// Consecutive passes this source was selected
    pub streak: u32,
}

/// Per-actor passive bias state; lives for the engagement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassiveBias {
    entries: BTreeMap<EcsEntity, PassiveBiasEntry>,
}

impl PassiveBias {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: EcsEntity) -> Option<&PassiveBiasEntry> {
        self.entries.get(&entity)
    }

    pub fn entry_mut(&mut self, entity: EcsEntity) -> &mut PassiveBiasEntry {
        self.entries.entry(entity).or_default()
    }

    pub fn streak(&self, entity: EcsEntity) -> u32 {
        self.entries.get(&entity).map_or(0, |e| e.streak)
    }

    /// Extend the winner's streak and reset every other source's
    pub fn record_selection(&mut self, chosen: Option<EcsEntity>) {
        for (entity, entry) in self.entries.iter_mut() {
            if Some(*entity) == chosen {
                entry.streak = entry.streak.saturating_add(1);
            } else {
                entry.streak = 0;
            }
        }
    }

    pub fn remove(&mut self, entity: EcsEntity) {
        self.entries.remove(&entity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A threat-altering ability on a candidate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreatAbility {
    pub active: bool,
    /// Charge built up by the wielder; the ability only counts past the readiness threshold
    pub readiness: f32,
}

impl ThreatAbility {
    pub fn ready(readiness: f32) -> Self {
        Self {
            active: true,
            readiness,
        }
    }

    pub fn applies(&self, threshold: f32) -> bool {
        self.active && self.readiness >= threshold
    }
}

/// Candidate-side modifiers applied when it generates threat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreatModifiers {
    pub provoke: ThreatAbility,
    pub smokescreen: ThreatAbility,
    /// The next threat increase is ignored
    pub skip_next: bool,
    /// The next threat increase is doubled
    pub double_next: bool,
    /// Item-derived fractional bonus, e.g. `0.1` for +10%
    pub threat_gain: f64,
    /// Item-derived fractional reduction, e.g. `0.25` for -25%
    pub threat_reduction: f64,
}

impl Default for ThreatModifiers {
    fn default() -> Self {
        Self {
            provoke: ThreatAbility::default(),
            smokescreen: ThreatAbility::default(),
            skip_next: false,
            double_next: false,
            threat_gain: 0.0,
            threat_reduction: 0.0,
        }
    }
}
