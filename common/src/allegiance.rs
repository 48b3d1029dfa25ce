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

//! Faction membership and creature kinship

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Faction grouping identifier
///
/// Members of the same faction do not target each other unless one is explicitly marked as a
/// retaliation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionId(pub u32);

impl FactionId {
    /// Faction of unaffiliated entities
    pub const NEUTRAL: FactionId = FactionId(0);

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

impl std::fmt::Display for FactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "faction#{}", self.0)
    }
}

/// Creature type and the types it counts as friends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kinship {
    pub creature_type: String,
    #[serde(default)]
    pub friend_types: BTreeSet<String>,
}

impl Kinship {
    pub fn new(creature_type: impl Into<String>) -> Self {
        Self {
            creature_type: creature_type.into(),
            friend_types: BTreeSet::new(),
        }
    }

    pub fn with_friend(mut self, friend_type: impl Into<String>) -> Self {
        self.friend_types.insert(friend_type.into());
        self
    }

    /// Whether either side counts the other as kin. Untyped creatures are kin to nobody.
    pub fn is_kin(&self, other: &Kinship) -> bool {
        if self.creature_type.is_empty() || other.creature_type.is_empty() {
            return false;
        }
        self.creature_type == other.creature_type
            || self.friend_types.contains(&other.creature_type)
            || other.friend_types.contains(&self.creature_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_type_is_kin() {
        let a = Kinship::new("goblin");
        let b = Kinship::new("goblin");
        assert!(a.is_kin(&b));
    }

    #[test]
    fn test_friend_type_is_kin_both_ways() {
        let goblin = Kinship::new("goblin").with_friend("wolf");
        let wolf = Kinship::new("wolf");
        assert!(goblin.is_kin(&wolf));
        assert!(wolf.is_kin(&goblin));
        assert!(!wolf.is_kin(&Kinship::new("bear")));
    }

    #[test]
    fn test_untyped_is_never_kin() {
        assert!(!Kinship::default().is_kin(&Kinship::default()));
    }
}
