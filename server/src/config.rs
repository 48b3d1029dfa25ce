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

use aggro_common::{ActorProfile, FactionId, Kinship};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file",
        default_value = "server/config.yaml"
    )]
    pub config_file: String,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file",
        default_value = "server/.env"
    )]
    pub env_file: Option<String>,

    #[arg(
        short = 't',
        long = "ticks",
        help = "Override the number of simulated ticks"
    )]
    pub ticks: Option<u32>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: "config.yaml".to_string(),
            env_file: Some(".env".to_string()),
            ticks: None,
        }
    }
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub tuning: ThreatTuning,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl Configuration {
    pub fn load(path: &str) -> Result<Configuration, ConfigError> {
        tracing::debug!("Loading configuration from file: {}", path);
        let file = std::fs::File::open(path)?;
        let conf: Configuration = serde_yaml::from_reader(file)?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tuning.validate()?;
        for actor in &self.scenario.actors {
            let profile = &actor.profile;
            if profile.visual_range <= 0.0 || profile.aural_range < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "actor '{}' has non-positive awareness ranges",
                    actor.name
                )));
            }
            if profile.chase_range < profile.visual_range {
                return Err(ConfigError::Invalid(format!(
                    "actor '{}' chase range {} is smaller than visual range {}",
                    actor.name, profile.chase_range, profile.visual_range
                )));
            }
        }
        for candidate in &self.scenario.candidates {
            if candidate.kind == CandidateKind::Objective && candidate.passive_threshold.is_none()
            {
                return Err(ConfigError::Invalid(format!(
                    "objective '{}' needs a passive_threshold",
                    candidate.name
                )));
            }
        }
        Ok(())
    }
}

/// Tunable constants of the threat engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatTuning {
    /// Floor every ledger entry is held at
    pub threat_minimum: i64,
    /// Smallest amount a single threat increase can add
    pub minimum_threat_gain: i64,
    /// Share of excess threat removed per decay when nothing was gained
    pub decay_fraction: f64,
    /// Share of the top threat below which candidates are safe from the lottery
    pub aggro_range_fraction: f64,
    /// Probability a passive source should win against one top competitor
    pub passive_target_pct: f64,
    /// Margin passive sources stay below real players
    pub passive_player_favor: f64,
    /// EMA smoothing factor for passive pressure
    pub passive_smoothing: f64,
    /// Consecutive wins before a passive source is debounced
    pub passive_streak_threshold: u32,
    pub passive_streak_penalty: i64,
    /// Readiness a provoke or smokescreen ability needs before it modifies threat
    pub ability_readiness_threshold: f32,
    pub provoke_multiplier: f64,
    pub smokescreen_multiplier: f64,
    /// Scales the stealth evaluator's probability for a hiding target
    pub deception_factor: f64,
    /// Added when the defender's deception ability is active
    pub deception_ability_bonus: f64,
    /// Selection passes re-run after successful deceptions
    pub max_deception_rerolls: usize,
    /// Seconds before the same enemy can trigger another ally alert
    pub alert_cooldown_secs: i64,
    /// Names that never enter a ledger
    pub reserved_names: Vec<String>,
}

impl Default for ThreatTuning {
    fn default() -> Self {
        Self {
            threat_minimum: 100,
            minimum_threat_gain: 2,
            decay_fraction: 0.1,
            aggro_range_fraction: 0.5,
            passive_target_pct: 0.40,
            passive_player_favor: 0.02,
            passive_smoothing: 0.20,
            passive_streak_threshold: 3,
            passive_streak_penalty: 5,
            ability_readiness_threshold: 1.0,
            provoke_multiplier: 2.0,
            smokescreen_multiplier: 0.5,
            deception_factor: 0.5,
            deception_ability_bonus: 0.15,
            max_deception_rerolls: 3,
            alert_cooldown_secs: 120,
            reserved_names: vec![
                String::new(),
                "placeholder".to_string(),
                "unknown".to_string(),
            ],
        }
    }
}

impl ThreatTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |name: &str, value: f64| {
            if (0.0..1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1), got {}",
                    name, value
                )))
            }
        };
        unit("decay_fraction", self.decay_fraction)?;
        unit("passive_target_pct", self.passive_target_pct)?;
        unit("passive_player_favor", self.passive_player_favor)?;
        if !(self.passive_smoothing > 0.0 && self.passive_smoothing <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "passive_smoothing must be within (0, 1], got {}",
                self.passive_smoothing
            )));
        }
        if !(self.aggro_range_fraction > 0.0 && self.aggro_range_fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "aggro_range_fraction must be within (0, 1), got {}",
                self.aggro_range_fraction
            )));
        }
        if self.threat_minimum < 1 {
            return Err(ConfigError::Invalid(
                "threat_minimum must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a display name is a reserved placeholder
    pub fn is_reserved_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.reserved_names
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(name))
    }

    pub fn alert_cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.alert_cooldown_secs)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// RNG seed, may be supplied as `"${AGGRO_SEED}"`
    #[serde(default)]
    pub seed: EnvField<u64>,

    #[serde(default = "default_ticks")]
    pub ticks: u32,

    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f32,
}

fn default_ticks() -> u32 {
    30
}

fn default_tick_seconds() -> f32 {
    1.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: EnvField::default(),
            ticks: default_ticks(),
            tick_seconds: default_tick_seconds(),
        }
    }
}

/// Scripted encounter driven by the simulation binary
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub actors: Vec<ActorTemplate>,

    #[serde(default)]
    pub candidates: Vec<CandidateTemplate>,

    #[serde(default)]
    pub damage: Vec<ScriptedHit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActorTemplate {
    pub name: String,
    pub position: [f64; 3],
    #[serde(default)]
    pub faction: FactionId,
    #[serde(default)]
    pub kinship: Kinship,
    #[serde(default)]
    pub profile: ActorProfile,
    #[serde(default = "default_level")]
    pub level: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CandidateTemplate {
    pub name: String,
    pub position: [f64; 3],
    #[serde(default)]
    pub kind: CandidateKind,
    #[serde(default)]
    pub faction: FactionId,
    #[serde(default = "default_level")]
    pub level: u32,
    /// Present for passive threat sources
    #[serde(default)]
    pub passive_threshold: Option<i64>,
    #[serde(default)]
    pub hiding: bool,
    #[serde(default)]
    pub deception: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    #[default]
    Player,
    Companion,
    Creature,
    /// Unattackable scenery that only draws attention through passive threat
    Objective,
}

/// A damage event applied on a given tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedHit {
    pub tick: u32,
    pub attacker: String,
    pub victim: String,
    pub amount: i64,
}

fn default_level() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_arguments_default() {
        let args = Arguments::default();
        assert_eq!(args.config_file, "config.yaml");
        assert_eq!(args.env_file, Some(".env".to_string()));
        assert_eq!(args.ticks, None);
    }

    #[test]
    fn test_tuning_defaults() {
        let tuning = ThreatTuning::default();
        assert_eq!(tuning.threat_minimum, 100);
        assert_eq!(tuning.passive_streak_threshold, 3);
        assert_eq!(tuning.alert_cooldown(), chrono::Duration::minutes(2));
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_reserved_names() {
        let tuning = ThreatTuning::default();
        assert!(tuning.is_reserved_name(""));
        assert!(tuning.is_reserved_name("  Placeholder "));
        assert!(!tuning.is_reserved_name("Aldric"));
    }

    #[test]
    fn test_tuning_rejects_bad_percentages() {
        let tuning = ThreatTuning {
            passive_target_pct: 1.0,
            ..ThreatTuning::default()
        };
        assert!(matches!(tuning.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_configuration_load_missing_file() {
        let result = Configuration::load("non_existent.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_configuration_load_from_file() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &file_path,
            "tuning:\n  threat_minimum: 50\nsimulation:\n  seed: \"42\"\n  ticks: 5\nscenario:\n  actors:\n    - name: Grunt\n      position: [0.0, 0.0, 0.0]\n  candidates:\n    - name: Aldric\n      position: [3.0, 0.0, 0.0]\n      kind: player\n",
        )
        .unwrap();

        let config = Configuration::load(file_path.to_str().unwrap()).unwrap();
        assert_eq!(config.tuning.threat_minimum, 50);
        assert_eq!(config.tuning.passive_target_pct, 0.40);
        assert_eq!(*config.simulation.seed, 42);
        assert_eq!(config.simulation.ticks, 5);
        assert_eq!(config.scenario.actors.len(), 1);
        assert_eq!(config.scenario.candidates[0].kind, CandidateKind::Player);
    }

    #[test]
    fn test_configuration_seed_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            std::env::set_var("AGGRO_TEST_SEED", "1234");
        }
        let config: Configuration =
            serde_yaml::from_str("simulation:\n  seed: \"${AGGRO_TEST_SEED}\"\n").unwrap();
        unsafe {
            std::env::remove_var("AGGRO_TEST_SEED");
        }
        assert_eq!(*config.simulation.seed, 1234);
    }

    #[test]
    fn test_sample_configuration_is_valid() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            std::env::set_var("AGGRO_SEED", "7");
        }
        let config: Configuration = serde_yaml::from_str(include_str!("../config.yaml")).unwrap();
        unsafe {
            std::env::remove_var("AGGRO_SEED");
        }
        assert!(config.validate().is_ok());
        assert_eq!(*config.simulation.seed, 7);
        assert_eq!(config.scenario.actors.len(), 3);
        assert!(config.scenario.actors[2].profile.legacy_mode);
        assert_eq!(
            config.scenario.candidates[3].kind,
            CandidateKind::Objective
        );
        assert_eq!(config.scenario.damage.len(), 3);
    }

    #[test]
    fn test_objective_needs_threshold() {
        let config: Configuration = serde_yaml::from_str(
            "scenario:\n  candidates:\n    - name: Banner\n      position: [0.0, 0.0, 0.0]\n      kind: objective\n",
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_configuration_rejects_short_chase_range() {
        let config: Configuration = serde_yaml::from_str(
            "scenario:\n  actors:\n    - name: Grunt\n      position: [0.0, 0.0, 0.0]\n      profile:\n        visual_range: 10.0\n        chase_range: 5.0\n",
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
