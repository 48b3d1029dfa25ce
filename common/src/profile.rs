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

//! Typed per-actor awareness profile
//!
//! Populated once when an actor template is loaded and read-only to the engine afterwards.

use crate::tactic::TacticSet;
use crate::tolerance::Tolerances;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorProfile {
    /// Sight radius for acquiring new targets
    #[serde(default = "default_visual_range")]
    pub visual_range: f64,

    /// Hearing radius used when allies call for help
    #[serde(default = "default_aural_range")]
    pub aural_range: f64,

    /// Radius within which the current target stays eligible
    #[serde(default = "default_chase_range")]
    pub chase_range: f64,

    /// Opposed against a hiding target's deception
    #[serde(default = "default_perception")]
    pub perception: u32,

    /// Use simplified tactics instead of a threat table
    #[serde(default)]
    pub legacy_mode: bool,

    #[serde(default)]
    pub tactics: TacticSet,

    #[serde(default)]
    pub tolerances: Tolerances,

    /// Seconds between target evaluations
    #[serde(default = "default_think_interval")]
    pub think_interval: f32,
}

fn default_visual_range() -> f64 {
    12.0
}

fn default_aural_range() -> f64 {
    8.0
}

fn default_chase_range() -> f64 {
    18.0
}

fn default_perception() -> u32 {
    10
}

fn default_think_interval() -> f32 {
    1.0
}

impl ActorProfile {
    pub fn with_ranges(mut self, visual: f64, aural: f64, chase: f64) -> Self {
        self.visual_range = visual;
        self.aural_range = aural;
        self.chase_range = chase;
        self
    }

    pub fn with_legacy_tactics(mut self, tactics: TacticSet) -> Self {
        self.legacy_mode = true;
        self.tactics = tactics;
        self
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn with_perception(mut self, perception: u32) -> Self {
        self.perception = perception;
        self
    }

    pub fn visual_range_sq(&self) -> f64 {
        self.visual_range * self.visual_range
    }

    pub fn chase_range_sq(&self) -> f64 {
        self.chase_range * self.chase_range
    }
}

impl Default for ActorProfile {
    fn default() -> Self {
        Self {
            visual_range: default_visual_range(),
            aural_range: default_aural_range(),
            chase_range: default_chase_range(),
            perception: default_perception(),
            legacy_mode: false,
            tactics: TacticSet::default(),
            tolerances: Tolerances::default(),
            think_interval: default_think_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tactic::Tactic;
    use crate::tolerance::Tolerance;

    #[test]
    fn test_profile_defaults_from_empty_yaml() {
        let profile: ActorProfile = serde_yaml::from_str("{}").unwrap();
        assert_eq!(profile, ActorProfile::default());
        assert!(!profile.legacy_mode);
        assert!(profile.chase_range > profile.visual_range);
    }

    #[test]
    fn test_profile_from_yaml() {
        let yaml = "visual_range: 5.0\nlegacy_mode: true\ntactics: 128\ntolerances: 2\n";
        let profile: ActorProfile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(profile.visual_range_sq(), 25.0);
        assert!(profile.legacy_mode);
        assert!(profile.tactics.contains(Tactic::Nearest));
        assert!(profile.tolerances.contains(Tolerance::MonstersOnly));
    }
}
