//! Combat system
//!
//! Implements the health and damage pipeline:
//! - Health ledger with invulnerability windows, god mode and a one-shot death
//! - Damage, heal and kill requests resolved once per tick
//! - Knockback and simple kinematic motion
//! - Gameplay logging

use bevy::prelude::*;

pub mod body;
pub mod events;
pub mod health;
pub mod log;
pub mod systems;

use crate::gameplay::GameplayPhase;
use body::*;
use events::*;
use systems::*;

/// Plugin for the combat system
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Requests
            .add_event::<DamageRequest>()
            .add_event::<HealRequest>()
            .add_event::<KillRequest>()
            // Notifications
            .add_event::<HpChangedEvent>()
            .add_event::<KilledByEvent>()
            .add_event::<DeathEvent>()
            // Resources
            .init_resource::<log::GameplayLog>()
            .init_resource::<SimulationSpeed>()
            // Systems
            .add_systems(
                Update,
                (apply_simulation_speed, log::advance_log_clock)
                    .chain()
                    .in_set(GameplayPhase::Cycle),
            )
            .add_systems(Update, integrate_velocity.in_set(GameplayPhase::Movement))
            .add_systems(
                Update,
                (apply_damage_requests, apply_kill_requests, apply_heal_requests)
                    .chain()
                    .in_set(GameplayPhase::Combat),
            )
            .add_systems(Update, despawn_pending.in_set(GameplayPhase::Cleanup));
    }
}

/// Controls the speed of the simulation (scaled game time)
#[derive(Resource)]
pub struct SimulationSpeed {
    /// Speed multiplier (0.0 = paused, 0.5 = slow motion, 1.0 = normal)
    pub multiplier: f32,
}

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl SimulationSpeed {
    pub fn pause(&mut self) {
        self.multiplier = 0.0;
    }

    pub fn is_paused(&self) -> bool {
        self.multiplier == 0.0
    }
}

/// Push the speed multiplier into the virtual clock when it changes
pub fn apply_simulation_speed(speed: Res<SimulationSpeed>, mut time: ResMut<Time<Virtual>>) {
    if !speed.is_changed() {
        return;
    }
    if speed.is_paused() {
        time.pause();
        info!("Simulation PAUSED");
    } else {
        time.unpause();
        time.set_relative_speed(speed.multiplier.max(0.0));
        info!("Simulation running at {}x speed", speed.multiplier);
    }
}
