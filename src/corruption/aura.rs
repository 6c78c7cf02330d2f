//! Corruption damage aura
//!
//! Area damage around the player, switched on for the corrupted phase only. Pulses every
//! `interval` seconds of game time, hitting every targetable entity in range on the mask.

use bevy::prelude::*;

use super::seek::SpatialQuery;
use crate::combat::body::{CollisionLayers, Targetable};
use crate::combat::events::DamageRequest;

#[derive(Component, Debug, Clone)]
pub struct DamageAura {
    pub radius: f32,
    pub damage: f32,
    /// Seconds between pulses
    pub interval: f32,
    pub mask: u32,
    active: bool,
    cooldown: f32,
}

impl DamageAura {
    pub fn new(radius: f32, damage: f32, interval: f32, mask: u32) -> Self {
        Self {
            radius,
            damage,
            interval,
            mask,
            active: false,
            cooldown: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activating pulses on the next tick; deactivating drops any pending pulse.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.cooldown = 0.0;
    }

    /// Advance the pulse timer. Returns true when a pulse is due.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return false;
        }
        self.cooldown = self.interval.max(0.0);
        true
    }
}

/// Emit damage requests for every due aura pulse
pub fn pulse_damage_auras(
    time: Res<Time>,
    mut auras: Query<(Entity, &Transform, &mut DamageAura)>,
    targets: Query<(Entity, &Transform, &CollisionLayers), With<Targetable>>,
    mut damage: EventWriter<DamageRequest>,
) {
    let dt = time.delta_secs();
    for (owner, transform, mut aura) in auras.iter_mut() {
        if !aura.tick(dt) || aura.damage <= 0.0 {
            continue;
        }
        let center = transform.translation.truncate();
        for (target, _) in targets.overlap_circle(center, aura.radius, aura.mask) {
            if target == owner {
                continue;
            }
            damage.send(DamageRequest::new(target, aura.damage, Some(owner)));
        }
    }
}
