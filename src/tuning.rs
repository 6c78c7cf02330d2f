//! Gameplay tuning
//!
//! Balance values for health, the corruption cycle, experience, upgrades and the victory
//! countdown. Loaded from `assets/config/tuning.ron`; every field falls back to a default so a
//! partial file is valid.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::progression::Track;

/// Default location of the tuning file, relative to the working directory.
pub const TUNING_PATH: &str = "assets/config/tuning.ron";

/// Root of `tuning.ron`.
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayTuning {
    pub health: HealthTuning,
    pub corruption: CorruptionTuning,
    pub xp: XpTuning,
    pub upgrades: UpgradeRules,
    pub victory: VictoryTuning,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthTuning {
    pub player_max_hp: f32,
    pub enemy_max_hp: f32,
    /// Seconds of immunity to non-forced damage after a hit
    pub invuln_after_hit: f32,
    pub disable_interaction_on_death: bool,
    pub destroy_on_death: bool,
}

impl Default for HealthTuning {
    fn default() -> Self {
        Self {
            player_max_hp: 100.0,
            enemy_max_hp: 30.0,
            invuln_after_hit: 0.2,
            disable_interaction_on_death: true,
            destroy_on_death: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CorruptionTuning {
    /// Length of the pure phase in seconds
    pub interval: f32,
    /// Length of the corrupted phase in seconds
    pub duration: f32,
    pub auto_speed: f32,
    pub seek_radius: f32,
    pub ally_kill_penalty: f32,
    pub aura_radius: f32,
    pub aura_damage: f32,
    pub aura_interval: f32,
}

impl Default for CorruptionTuning {
    fn default() -> Self {
        Self {
            interval: 20.0,
            duration: 6.0,
            auto_speed: 4.0,
            seek_radius: 8.0,
            ally_kill_penalty: 10.0,
            aura_radius: 1.5,
            aura_damage: 10.0,
            aura_interval: 0.5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct XpTuning {
    pub pure_per_kill: f32,
    pub corrupt_per_kill: f32,
    /// XP needed to leave level 1
    pub curve_base: f32,
    /// Multiplier applied per level to the XP requirement
    pub curve_growth: f32,
}

impl Default for XpTuning {
    fn default() -> Self {
        Self {
            pure_per_kill: 5.0,
            corrupt_per_kill: 5.0,
            curve_base: 10.0,
            curve_growth: 1.25,
        }
    }
}

/// Rules deciding which level-ups grant an upgrade.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeRules {
    pub levels_per_choice: u32,
    pub avoid_repeat_back_to_back: bool,
    /// Track whose level-ups are watched
    pub track: Track,
    /// Real-time seconds each toast stays on screen
    pub toast_seconds: f32,
}

impl Default for UpgradeRules {
    fn default() -> Self {
        Self {
            levels_per_choice: 3,
            avoid_repeat_back_to_back: true,
            track: Track::Corrupt,
            toast_seconds: 2.5,
        }
    }
}

impl UpgradeRules {
    /// True when reaching `level` on `track` should grant an upgrade.
    pub fn qualifies(&self, track: Track, level: u32) -> bool {
        track == self.track
            && self.levels_per_choice > 0
            && level > 0
            && level % self.levels_per_choice == 0
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VictoryTuning {
    pub duration_seconds: f32,
    pub auto_start: bool,
    pub stop_on_player_death: bool,
    pub pure_scene: String,
    pub corrupt_scene: String,
    pub corrupt_wins_tie: bool,
}

impl Default for VictoryTuning {
    fn default() -> Self {
        Self {
            duration_seconds: 600.0,
            auto_start: true,
            stop_on_player_death: true,
            pure_scene: "VictoryPure".to_string(),
            corrupt_scene: "VictoryCorrupt".to_string(),
            corrupt_wins_tie: false,
        }
    }
}

impl GameplayTuning {
    /// Parse tuning from a RON string
    pub fn from_ron(contents: &str) -> Result<Self, String> {
        ron::from_str(contents).map_err(|e| format!("Failed to parse tuning: {}", e))
    }

    /// Load tuning from a file, or return defaults if it is missing or malformed
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No tuning file at {:?}, using defaults", path);
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_ron(&contents) {
                Ok(tuning) => {
                    info!("Loaded tuning from {:?}", path);
                    tuning
                }
                Err(e) => {
                    warn!("{} ({:?}), using defaults", e, path);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read tuning file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load from the default path
    pub fn load() -> Self {
        Self::load_or_default(&PathBuf::from(TUNING_PATH))
    }
}
