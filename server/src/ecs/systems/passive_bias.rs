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

//! # Passive Threat Bias
//!
//! Passive sources (banners, caravans, objectives) have no combat of their own to generate
//! threat. Each selection pass this engine computes the pressure a passive source should hold
//! so it wins the lottery with roughly `passive_target_pct` odds against the strongest real
//! combatant, then smooths and debounces it:
//!
//! ```text
//! max_active = highest ledger value among non-passive candidates (floor if none)
//! desired    = min(ceil(aggro_range_fraction * max_active / (1 - target_pct)),
//!                  floor(max_active * (1 - player_favor)))
//! ema        = ema * (1 - s) + desired * s          (starts at desired)
//! smoothed   = round(ema) - penalty if streak >= streak_threshold
//! applied    = max(smoothed, floor + max(threshold, 0))
//! ```
//!
//! `applied` only ever raises the ledger entry. Lowering is left to decay.

use crate::config::ThreatTuning;
use crate::ecs::EcsEntity;
use crate::ecs::components::{PassiveBias, ThreatLedger};
use crate::ecs::systems::Candidate;

/// The two ledger operations the bias engine is allowed
pub trait ThreatFloorAccess {
    fn current(&self, entity: EcsEntity) -> Option<i64>;

    /// Raise `entity` to `value` if it is lower. Returns whether anything changed.
    fn propose_floor(&mut self, entity: EcsEntity, value: i64) -> bool;
}

impl ThreatFloorAccess for ThreatLedger {
    fn current(&self, entity: EcsEntity) -> Option<i64> {
        self.value(entity)
    }

    fn propose_floor(&mut self, entity: EcsEntity, value: i64) -> bool {
        self.raise_to(entity, value)
    }
}

/// Per-source record of one bias pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassiveBiasOutcome {
    pub candidate: EcsEntity,
    pub max_active: i64,
    /// Capped target pressure before smoothing
    pub desired: i64,
    pub ema: f64,
    /// `round(ema)` minus any debounce penalty
    pub smoothed: i64,
    pub debounced: bool,
    /// Value proposed to the ledger after the floor
    pub applied: i64,
    pub raised: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveBiasEngine;

impl PassiveBiasEngine {
    /// Lowest value a passive source is held at
    pub fn min_floor(tuning: &ThreatTuning, threshold: i64) -> i64 {
        tuning.threat_minimum.saturating_add(threshold.max(0))
    }

    /// Highest pressure a passive source may be asked to hold
    pub fn ceiling(tuning: &ThreatTuning, max_active: i64) -> i64 {
        (max_active as f64 * (1.0 - tuning.passive_player_favor)).floor() as i64
    }

    /// Target pressure for a passive source, capped at [`Self::ceiling`]
    pub fn desired(tuning: &ThreatTuning, max_active: i64) -> i64 {
        let share = (1.0 - tuning.passive_target_pct).max(f64::EPSILON);
        let raw = (tuning.aggro_range_fraction * max_active as f64 / share).ceil() as i64;
        raw.min(Self::ceiling(tuning, max_active))
    }

    /// Highest ledger value among non-passive candidates, or the floor
    pub fn max_active<L>(tuning: &ThreatTuning, ledger: &L, candidates: &[Candidate]) -> i64
    where
        L: ThreatFloorAccess + ?Sized,
    {
        candidates
            .iter()
            .filter(|candidate| !candidate.is_passive())
            .filter_map(|candidate| ledger.current(candidate.entity))
            .max()
            .unwrap_or(tuning.threat_minimum)
    }

    /// Run one bias pass over every passive candidate
    pub fn apply<L>(
        tuning: &ThreatTuning,
        ledger: &mut L,
        bias: &mut PassiveBias,
        candidates: &[Candidate],
    ) -> Vec<PassiveBiasOutcome>
    where
        L: ThreatFloorAccess + ?Sized,
    {
        let max_active = Self::max_active(tuning, ledger, candidates);
        let desired = Self::desired(tuning, max_active);

        candidates
            .iter()
            .filter_map(|candidate| {
                let threshold = candidate.passive_threshold?;
                let min_floor = Self::min_floor(tuning, threshold);

                let entry = bias.entry_mut(candidate.entity);
                let ema = match entry.ema {
                    Some(previous) => {
                        previous * (1.0 - tuning.passive_smoothing)
                            + desired as f64 * tuning.passive_smoothing
                    }
                    None => desired as f64,
                };
                entry.ema = Some(ema);

                let mut smoothed = ema.round() as i64;
                let debounced = entry.streak >= tuning.passive_streak_threshold;
                if debounced {
                    smoothed -= tuning.passive_streak_penalty;
                }

                let applied = smoothed.max(min_floor);
                let raised = ledger.propose_floor(candidate.entity, applied);

                tracing::trace!(
                    "Passive {:?}: max_active {} desired {} ema {:.2} applied {}{}",
                    candidate.entity,
                    max_active,
                    desired,
                    ema,
                    applied,
                    if debounced { " (debounced)" } else { "" }
                );

                Some(PassiveBiasOutcome {
                    candidate: candidate.entity,
                    max_active,
                    desired,
                    ema,
                    smoothed,
                    debounced,
                    applied,
                    raised,
                })
            })
            .collect()
    }

    /// Extend the chosen passive source's win streak; reset every other
    pub fn update_streaks(bias: &mut PassiveBias, chosen: Option<EcsEntity>) {
        bias.record_selection(chosen);
    }
}
