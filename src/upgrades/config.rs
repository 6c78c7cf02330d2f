//! Data-driven upgrade pool
//!
//! Upgrades are defined in `assets/config/upgrades.ron` as a list of titled entries, each
//! carrying one or more effects applied to the player when picked.
//!
//! ## Usage
//! ```ignore
//! fn my_system(pool: Res<UpgradePool>) {
//!     for upgrade in pool.iter() {
//!         println!("{}: {} effects", upgrade.title, upgrade.effects.len());
//!     }
//! }
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::combat::health::Health;
use crate::corruption::aura::DamageAura;
use crate::corruption::PlayerCorruption;

/// Default location of the upgrade pool, relative to the working directory.
pub const UPGRADES_PATH: &str = "assets/config/upgrades.ron";

/// One stat change. Amounts are added to the current value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UpgradeEffect {
    /// Raise max HP. `proportional` keeps the current/max ratio instead of clamping.
    MaxHp { amount: f32, proportional: bool },
    Heal(f32),
    SeekSpeed(f32),
    SeekRadius(f32),
    AuraDamage(f32),
    AuraRadius(f32),
    /// Corrupted phase length, from the next corrupted phase on
    CorruptionDuration(f32),
    /// Pure phase length, from the next pure phase on
    CorruptionInterval(f32),
}

/// A pickable upgrade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    /// Display title. Empty titles fall back to a generic label on the toast.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Icon asset path
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub effects: Vec<UpgradeEffect>,
}

/// The player components an upgrade may touch. Missing ones are skipped.
#[derive(Default)]
pub struct UpgradeTarget<'a> {
    pub health: Option<&'a mut Health>,
    pub corruption: Option<&'a mut PlayerCorruption>,
    pub aura: Option<&'a mut DamageAura>,
}

impl UpgradeDefinition {
    pub fn new(title: impl Into<String>, effects: Vec<UpgradeEffect>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            icon: None,
            effects,
        }
    }

    /// Apply every effect. Returns how many found a component to act on.
    pub fn apply(&self, target: &mut UpgradeTarget) -> usize {
        self.effects
            .iter()
            .filter(|effect| apply_effect(effect, target))
            .count()
    }
}

fn apply_effect(effect: &UpgradeEffect, target: &mut UpgradeTarget) -> bool {
    match *effect {
        UpgradeEffect::MaxHp {
            amount,
            proportional,
        } => target.health.as_deref_mut().is_some_and(|health| {
            health.set_max_hp(health.max() + amount, proportional);
            true
        }),
        UpgradeEffect::Heal(amount) => target.health.as_deref_mut().is_some_and(|health| {
            health.heal(amount);
            true
        }),
        UpgradeEffect::SeekSpeed(amount) => target.corruption.as_deref_mut().is_some_and(|c| {
            c.auto_speed = (c.auto_speed + amount).max(0.0);
            true
        }),
        UpgradeEffect::SeekRadius(amount) => target.corruption.as_deref_mut().is_some_and(|c| {
            c.seek_radius = (c.seek_radius + amount).max(0.0);
            true
        }),
        UpgradeEffect::AuraDamage(amount) => target.aura.as_deref_mut().is_some_and(|aura| {
            aura.damage = (aura.damage + amount).max(0.0);
            true
        }),
        UpgradeEffect::AuraRadius(amount) => target.aura.as_deref_mut().is_some_and(|aura| {
            aura.radius = (aura.radius + amount).max(0.0);
            true
        }),
        UpgradeEffect::CorruptionDuration(amount) => {
            target.corruption.as_deref_mut().is_some_and(|c| {
                let duration = c.cycle.duration() + amount;
                c.cycle.set_duration(duration);
                true
            })
        }
        UpgradeEffect::CorruptionInterval(amount) => {
            target.corruption.as_deref_mut().is_some_and(|c| {
                let interval = c.cycle.interval() + amount;
                c.cycle.set_interval(interval);
                true
            })
        }
    }
}

/// Root of `upgrades.ron`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpgradesConfig {
    pub upgrades: Vec<UpgradeDefinition>,
}

/// Upgrades available for random selection. Empty disables upgrade selection.
#[derive(Resource, Debug, Default, Clone)]
pub struct UpgradePool {
    upgrades: Vec<UpgradeDefinition>,
}

impl UpgradePool {
    pub fn new(upgrades: Vec<UpgradeDefinition>) -> Self {
        Self { upgrades }
    }

    pub fn get(&self, index: usize) -> Option<&UpgradeDefinition> {
        self.upgrades.get(index)
    }

    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpgradeDefinition> {
        self.upgrades.iter()
    }

    pub fn from_ron(contents: &str) -> Result<Self, String> {
        let config: UpgradesConfig =
            ron::from_str(contents).map_err(|e| format!("Failed to parse upgrades: {}", e))?;
        Ok(Self::new(config.upgrades))
    }
}

pub fn load_upgrade_pool(path: &Path) -> Result<UpgradePool, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let pool = UpgradePool::from_ron(&contents)
        .map_err(|e| format!("{} ({})", e, path.display()))?;

    info!("Loaded {} upgrades from {}", pool.len(), path.display());
    Ok(pool)
}
