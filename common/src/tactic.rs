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

//! # Legacy Tactics
//!
//! Actors running in legacy mode do not keep a threat table. Instead their profile carries a
//! bitset of allowed tactics and one tactic is drawn uniformly every acquisition cycle.
//!
//! | Tactic        | Behavior                                       |
//! |---------------|------------------------------------------------|
//! | `Hold`        | Keep whatever target is current                |
//! | `Focused`     | Keep whatever target is current                |
//! | `Random`      | Distance-weighted draw over eligible targets   |
//! | `LastDamager` | Whoever hit the actor most recently            |
//! | `TopDamager`  | Whoever dealt the most damage                  |
//! | `Weakest`     | Lowest level                                   |
//! | `Strongest`   | Highest level                                  |
//! | `Nearest`     | Minimum distance                               |
//!
//! The bitset is stored raw so content with bits this build does not understand still loads;
//! such bits surface as [`TacticDraw::Unknown`] when drawn.

use flagset::{FlagSet, flags};
use rand::Rng;
use serde::{Deserialize, Serialize};

flags! {
    /// A single legacy targeting tactic.
    pub enum Tactic: u16 {
        Hold,
        Focused,
        Random,
        LastDamager,
        TopDamager,
        Weakest,
        Strongest,
        Nearest,
    }
}

impl Tactic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tactic::Hold => "Hold",
            Tactic::Focused => "Focused",
            Tactic::Random => "Random",
            Tactic::LastDamager => "LastDamager",
            Tactic::TopDamager => "TopDamager",
            Tactic::Weakest => "Weakest",
            Tactic::Strongest => "Strongest",
            Tactic::Nearest => "Nearest",
        }
    }

    /// Resolve a single-bit value to its tactic
    pub fn from_bit(bit: u16) -> Option<Self> {
        if bit.count_ones() != 1 {
            return None;
        }
        FlagSet::<Tactic>::new(bit).ok()?.into_iter().next()
    }
}

/// Result of drawing one tactic out of a [`TacticSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacticDraw {
    Known(Tactic),
    /// A set bit that maps to no tactic in this build
    Unknown(u16),
}

/// Raw bitset of allowed legacy tactics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TacticSet(u16);

impl TacticSet {
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn with(mut self, tactic: Tactic) -> Self {
        self.0 |= FlagSet::from(tactic).bits();
        self
    }

    pub fn contains(&self, tactic: Tactic) -> bool {
        self.0 & FlagSet::from(tactic).bits() != 0
    }

    /// Tactics this build understands
    pub fn known(&self) -> FlagSet<Tactic> {
        FlagSet::new_truncated(self.0)
    }

    pub fn has_unknown_bits(&self) -> bool {
        self.known().bits() != self.0
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Draw one set bit uniformly. Every set bit, first and last included, has equal odds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<TacticDraw> {
        let count = self.len();
        if count == 0 {
            return None;
        }
        let pick = rng.random_range(0..count);
        let bit = (0..u16::BITS)
            .map(|shift| 1u16 << shift)
            .filter(|bit| self.0 & bit != 0)
            .nth(pick)?;

        Some(match Tactic::from_bit(bit) {
            Some(tactic) => TacticDraw::Known(tactic),
            None => TacticDraw::Unknown(bit),
        })
    }
}

impl Default for TacticSet {
    fn default() -> Self {
        Self::empty().with(Tactic::Hold)
    }
}

impl From<FlagSet<Tactic>> for TacticSet {
    fn from(set: FlagSet<Tactic>) -> Self {
        Self(set.bits())
    }
}

impl From<Tactic> for TacticSet {
    fn from(tactic: Tactic) -> Self {
        Self::empty().with(tactic)
    }
}

impl FromIterator<Tactic> for TacticSet {
    fn from_iter<I: IntoIterator<Item = Tactic>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), TacticSet::with)
    }
}
