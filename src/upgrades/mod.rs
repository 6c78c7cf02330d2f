//! Periodic upgrades
//!
//! Every `levels_per_choice` levels on the watched track, one random upgrade from the pool
//! is applied to the player and announced through the toast queue.

use bevy::prelude::*;
use std::path::Path;

pub mod config;
pub mod picker;
pub mod toast;

use crate::combat::events::HpChangedEvent;
use crate::combat::health::Health;
use crate::combat::log::{GameplayLog, GameplayLogEventType};
use crate::corruption::aura::DamageAura;
use crate::corruption::PlayerCorruption;
use crate::gameplay::GameplayPhase;
use crate::progression::LevelUpEvent;
use crate::rng::GameRng;
use crate::tuning::GameplayTuning;
use config::{load_upgrade_pool, UpgradePool, UpgradeTarget, UPGRADES_PATH};
use picker::UpgradePicker;
use toast::{ToastBoard, ToastQueue};

/// An upgrade was applied to a player
#[derive(Event, Debug, Clone, PartialEq)]
pub struct UpgradeApplied {
    pub player: Entity,
    pub title: String,
    /// Level that triggered it
    pub level: u32,
}

/// Pick, apply and announce an upgrade for every qualifying level-up.
#[allow(clippy::too_many_arguments)]
pub fn offer_upgrades_on_level_up(
    mut level_ups: EventReader<LevelUpEvent>,
    tuning: Res<GameplayTuning>,
    pool: Res<UpgradePool>,
    real_time: Res<Time<Real>>,
    mut picker: ResMut<UpgradePicker>,
    mut rng: ResMut<GameRng>,
    mut players: Query<(
        Option<&mut Health>,
        Option<&mut PlayerCorruption>,
        Option<&mut DamageAura>,
    )>,
    mut toasts: ResMut<ToastQueue>,
    mut board: ResMut<ToastBoard>,
    mut applied: EventWriter<UpgradeApplied>,
    mut hp_changed: EventWriter<HpChangedEvent>,
    mut log: ResMut<GameplayLog>,
) {
    for level_up in level_ups.read() {
        if !tuning.upgrades.qualifies(level_up.track, level_up.level) || pool.is_empty() {
            continue;
        }
        let Ok((mut health, mut corruption, mut aura)) = players.get_mut(level_up.entity) else {
            continue;
        };
        let Some(upgrade) = picker.pick(pool.len(), &mut rng).and_then(|i| pool.get(i)) else {
            continue;
        };

        let hp_before = health.as_deref().map(|h| (h.current(), h.max()));
        let mut target = UpgradeTarget {
            health: health.as_deref_mut(),
            corruption: corruption.as_deref_mut(),
            aura: aura.as_deref_mut(),
        };
        upgrade.apply(&mut target);

        if let Some(health) = health.as_deref() {
            if hp_before != Some((health.current(), health.max())) {
                hp_changed.send(HpChangedEvent {
                    entity: level_up.entity,
                    current: health.current(),
                    max: health.max(),
                });
            }
        }

        info!(
            "Level {} upgrade for {:?}: {}",
            level_up.level, level_up.entity, upgrade.title
        );
        log.log(
            GameplayLogEventType::Upgrade,
            format!("Upgrade at level {}: {}", level_up.level, upgrade.title),
        );
        applied.send(UpgradeApplied {
            player: level_up.entity,
            title: upgrade.title.clone(),
            level: level_up.level,
        });
        toasts.enqueue(upgrade.clone(), real_time.elapsed_secs(), &mut *board);
    }
}

/// Advance the toast display on real time, so pausing the game doesn't stall it.
pub fn run_toasts(
    real_time: Res<Time<Real>>,
    mut toasts: ResMut<ToastQueue>,
    mut board: ResMut<ToastBoard>,
) {
    toasts.update(real_time.elapsed_secs(), &mut *board);
}

/// Plugin for upgrade selection and toasts
///
/// Loads the pool from `assets/config/upgrades.ron` unless an [`UpgradePool`] is already
/// present. A missing or malformed file leaves the pool empty.
pub struct UpgradesPlugin;

impl Plugin for UpgradesPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<UpgradePool>() {
            let pool = load_upgrade_pool(Path::new(UPGRADES_PATH)).unwrap_or_else(|e| {
                warn!("{}; upgrades disabled", e);
                UpgradePool::default()
            });
            app.insert_resource(pool);
        }

        app.add_event::<UpgradeApplied>()
            .init_resource::<GameRng>()
            .init_resource::<UpgradePicker>()
            .init_resource::<ToastQueue>()
            .init_resource::<ToastBoard>()
            .add_systems(
                Update,
                offer_upgrades_on_level_up
                    .in_set(GameplayPhase::Progression)
                    .after(crate::progression::bridge::grant_kill_xp),
            )
            .add_systems(Update, run_toasts.in_set(GameplayPhase::Presentation));
    }
}
