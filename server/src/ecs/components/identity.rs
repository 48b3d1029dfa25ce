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

//! Identity and targeting capability components
//!
//! Candidates are classified by a closed [`EntityKind`] plus an explicit capability set rather
//! than by type hierarchy, so every filtering rule is an exhaustive match.

use crate::ecs::EcsEntity;
use aggro_common::{FactionId, Kinship};
use serde::{Deserialize, Serialize};

/// Display name for logging and reserved-name checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub display: String,
}

impl Name {
    pub fn new(display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display)
    }
}

/// Closed classification of targetable entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    /// Pet or hireling; `owner` is the controlling player when known
    Companion { owner: Option<EcsEntity> },
    Creature,
}

impl EntityKind {
    pub fn is_player(&self) -> bool {
        matches!(self, EntityKind::Player)
    }

    /// Players and their companions
    pub fn is_player_side(&self) -> bool {
        match self {
            EntityKind::Player | EntityKind::Companion { .. } => true,
            EntityKind::Creature => false,
        }
    }
}

/// Targeting capability of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targetable {
    pub kind: EntityKind,
    /// Whether attacks may be directed at this entity at all
    pub attackable: bool,
}

impl Targetable {
    pub fn player() -> Self {
        Self {
            kind: EntityKind::Player,
            attackable: true,
        }
    }

    pub fn companion(owner: Option<EcsEntity>) -> Self {
        Self {
            kind: EntityKind::Companion { owner },
            attackable: true,
        }
    }

    pub fn creature() -> Self {
        Self {
            kind: EntityKind::Creature,
            attackable: true,
        }
    }

    /// Scenery or objectives that only draw attention through passive threat
    pub fn inert() -> Self {
        Self {
            kind: EntityKind::Creature,
            attackable: false,
        }
    }
}

/// Faction membership and creature kinship
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allegiance {
    pub faction: FactionId,
    pub kinship: Kinship,
}

impl Allegiance {
    pub fn new(faction: FactionId, kinship: Kinship) -> Self {
        Self { faction, kinship }
    }

    pub fn faction(faction: FactionId) -> Self {
        Self {
            faction,
            kinship: Kinship::default(),
        }
    }

    /// Neutral entities never share a faction with anyone
    pub fn same_faction(&self, other: &Allegiance) -> bool {
        !self.faction.is_neutral() && self.faction == other.faction
    }
}

/// Marks a non-combatant that generates artificial ("passive") threat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveThreatSource {
    /// Extra pressure held above the threat floor. Values below 2 disable the decay re-raise.
    pub threshold: i64,
}

impl PassiveThreatSource {
    pub fn new(threshold: i64) -> Self {
        Self { threshold }
    }
}
