//! JSON configuration parsing for headless mode

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Headless run configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessRunConfig {
    /// Enemies alive at any time (default: 8)
    #[serde(default = "default_enemies")]
    pub enemies: usize,
    /// Allies spawned at start (default: 2)
    #[serde(default = "default_allies")]
    pub allies: usize,
    /// Radius of the spawn ring around the player (default: 6.0)
    #[serde(default = "default_arena_radius")]
    pub arena_radius: f32,
    /// Replace each dead enemy with a fresh one (default: true)
    #[serde(default = "default_true")]
    pub respawn_enemies: bool,
    /// Game speed multiplier; the victory countdown is unaffected (default: 1.0)
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,
    /// Override for the victory countdown length in seconds
    #[serde(default)]
    pub victory_seconds: Option<f32>,
    /// Custom output path for the run summary (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Maximum run length in real seconds (default: 120)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_enemies() -> usize {
    8
}

fn default_allies() -> usize {
    2
}

fn default_arena_radius() -> f32 {
    6.0
}

fn default_true() -> bool {
    true
}

fn default_time_scale() -> f32 {
    1.0
}

fn default_max_duration() -> f32 {
    120.0
}

impl Default for HeadlessRunConfig {
    fn default() -> Self {
        Self {
            enemies: default_enemies(),
            allies: default_allies(),
            arena_radius: default_arena_radius(),
            respawn_enemies: true,
            time_scale: default_time_scale(),
            victory_seconds: None,
            output_path: None,
            max_duration_secs: default_max_duration(),
            random_seed: None,
        }
    }
}

impl HeadlessRunConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, String> {
        let config: HeadlessRunConfig =
            serde_json::from_str(contents).map_err(|e| format!("Failed to parse JSON: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.enemies > 256 {
            return Err("enemies must be at most 256".to_string());
        }
        if self.allies > 64 {
            return Err("allies must be at most 64".to_string());
        }
        if !(self.arena_radius > 0.0) {
            return Err("arena_radius must be positive".to_string());
        }
        if !(self.time_scale > 0.0) {
            return Err("time_scale must be positive".to_string());
        }
        if let Some(seconds) = self.victory_seconds {
            if !(seconds > 0.0) {
                return Err("victory_seconds must be positive".to_string());
            }
        }
        if !(self.max_duration_secs > 0.0) {
            return Err("max_duration_secs must be positive".to_string());
        }
        Ok(())
    }
}
