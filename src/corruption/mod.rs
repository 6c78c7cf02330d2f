//! Corruption phase machine
//!
//! The player alternates between a pure phase and a timed, automatic corrupted phase.
//! While corrupted:
//! - the player is immune to all damage (god mode)
//! - configured auxiliary behaviors are disabled, then restored afterwards
//! - a damage aura is active
//! - movement is driven toward the nearest living target

use bevy::prelude::*;

pub mod aura;
pub mod cycle;
pub mod overrides;
pub mod seek;
pub mod systems;

use crate::combat::body::CollisionLayers;
use crate::gameplay::GameplayPhase;
use crate::tuning::CorruptionTuning;
use cycle::CorruptionCycle;
use overrides::BehaviorOverride;
use systems::*;

/// Corruption state owned by a single player entity.
#[derive(Component, Debug)]
pub struct PlayerCorruption {
    pub cycle: CorruptionCycle,
    pub auto_speed: f32,
    pub seek_radius: f32,
    /// Layers considered when seeking a target
    pub seek_mask: u32,
    /// Self-damage when an ally dies to the corrupted player
    pub ally_kill_penalty: f32,
    /// Behavior entities switched off for the corrupted phase
    pub disable_while_corrupted: Vec<Entity>,
    enabled: bool,
    overrides: Option<BehaviorOverride>,
}

impl PlayerCorruption {
    pub fn new(interval: f32, duration: f32) -> Self {
        Self {
            cycle: CorruptionCycle::new(interval, duration),
            auto_speed: 4.0,
            seek_radius: 8.0,
            seek_mask: CollisionLayers::ENEMY | CollisionLayers::ALLY,
            ally_kill_penalty: 10.0,
            disable_while_corrupted: Vec::new(),
            enabled: true,
            overrides: None,
        }
    }

    pub fn from_tuning(tuning: &CorruptionTuning) -> Self {
        Self {
            auto_speed: tuning.auto_speed,
            seek_radius: tuning.seek_radius,
            ally_kill_penalty: tuning.ally_kill_penalty,
            ..Self::new(tuning.interval, tuning.duration)
        }
    }

    pub fn disabling(mut self, behaviors: impl IntoIterator<Item = Entity>) -> Self {
        self.disable_while_corrupted.extend(behaviors);
        self
    }

    pub fn is_corrupted(&self) -> bool {
        self.cycle.is_corrupted()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Penalty owed for an ally kill right now, if any.
    pub fn ally_kill_penalty_due(&self) -> Option<f32> {
        (self.enabled && self.is_corrupted() && self.ally_kill_penalty > 0.0)
            .then_some(self.ally_kill_penalty)
    }
}

/// Fired whenever a phase starts: flips, countdown resets, re-enables and teardown out of
/// the corrupted phase
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorruptionPhaseChanged {
    pub player: Entity,
    pub corrupted: bool,
}

/// Restart the pure countdown at full length. Ignored while corrupted.
#[derive(Event, Debug, Clone, Copy)]
pub struct ResetCorruptionCountdown {
    pub player: Entity,
}

/// Enable or disable a player's corruption machine
#[derive(Event, Debug, Clone, Copy)]
pub struct SetCorruptionActive {
    pub player: Entity,
    pub active: bool,
}

/// An ally died to the player
#[derive(Event, Debug, Clone, Copy)]
pub struct AllyKilledByPlayer {
    pub player: Entity,
    pub ally: Entity,
}

/// The corrupted player paid the ally-kill penalty
#[derive(Event, Debug, Clone, Copy)]
pub struct AllyKillPenalized {
    pub player: Entity,
    pub ally: Entity,
    pub penalty: f32,
}

/// Plugin for the corruption phase machine
pub struct CorruptionPlugin;

impl Plugin for CorruptionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CorruptionPhaseChanged>()
            .add_event::<ResetCorruptionCountdown>()
            .add_event::<SetCorruptionActive>()
            .add_event::<AllyKilledByPlayer>()
            .add_event::<AllyKillPenalized>()
            .add_observer(restore_on_corruption_removed)
            .add_systems(
                Update,
                (
                    handle_corruption_toggles,
                    handle_countdown_resets,
                    advance_corruption_cycles,
                )
                    .chain()
                    .in_set(GameplayPhase::Cycle),
            )
            .add_systems(
                Update,
                drive_auto_seek
                    .in_set(GameplayPhase::Movement)
                    .before(crate::combat::body::integrate_velocity),
            )
            .add_systems(
                Update,
                aura::pulse_damage_auras
                    .in_set(GameplayPhase::Combat)
                    .before(crate::combat::systems::apply_damage_requests),
            )
            .add_systems(
                Update,
                punish_ally_kills
                    .in_set(GameplayPhase::Progression)
                    .after(crate::progression::bridge::grant_kill_xp),
            );
    }
}
