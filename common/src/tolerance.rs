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

//! Tolerance flags restricting which categories of entities an actor may target

use flagset::{FlagSet, flags};

flags! {
    pub enum Tolerance: u8 {
        /// Only the current target stays eligible
        LockedToTarget,
        /// Players and companions are never eligible
        MonstersOnly,
        /// Allies may not wake this actor
        IgnoreAlerts,
    }
}

impl Tolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tolerance::LockedToTarget => "LockedToTarget",
            Tolerance::MonstersOnly => "MonstersOnly",
            Tolerance::IgnoreAlerts => "IgnoreAlerts",
        }
    }
}

/// Bitmask of [`Tolerance`] flags
pub type Tolerances = FlagSet<Tolerance>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_set() {
        let set: Tolerances = Tolerance::LockedToTarget | Tolerance::MonstersOnly;
        assert!(set.contains(Tolerance::LockedToTarget));
        assert!(!set.contains(Tolerance::IgnoreAlerts));
        assert!(Tolerances::default().is_empty());
    }
}
