//! Kinematic bodies and interaction layers
//!
//! Just enough motion for knockback and automatic seeking: a velocity integrated
//! into the transform every tick, with optional linear damping.

use bevy::prelude::*;

/// Linear velocity in world units per second.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Deref, DerefMut)]
pub struct Velocity(pub Vec2);

impl Velocity {
    /// Instantaneous change of velocity (unit mass).
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.0 += impulse;
    }
}

/// Fraction of velocity lost per second.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Damping(pub f32);

impl Default for Damping {
    fn default() -> Self {
        Self(4.0)
    }
}

/// Bitmask of interaction categories an entity belongs to.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionLayers(pub u32);

impl CollisionLayers {
    pub const PLAYER: u32 = 1 << 0;
    pub const ENEMY: u32 = 1 << 1;
    pub const ALLY: u32 = 1 << 2;

    pub fn matches(&self, mask: u32) -> bool {
        self.0 & mask != 0
    }
}

/// Entity can be found by overlap queries (seeking, area damage).
/// Removed on death when the health ledger disables interaction.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Targetable;

/// Despawned during cleanup, after death consumers have run.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PendingDespawn;

/// Move entities by their velocity and apply damping.
pub fn integrate_velocity(
    time: Res<Time>,
    mut bodies: Query<(&mut Transform, &mut Velocity, Option<&Damping>)>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }
    for (mut transform, mut velocity, damping) in bodies.iter_mut() {
        transform.translation += velocity.0.extend(0.0) * dt;
        if let Some(damping) = damping {
            let keep = (1.0 - damping.0 * dt).max(0.0);
            velocity.0 *= keep;
        }
    }
}

/// Despawn everything marked with [`PendingDespawn`].
pub fn despawn_pending(mut commands: Commands, pending: Query<Entity, With<PendingDespawn>>) {
    for entity in pending.iter() {
        commands.entity(entity).despawn();
    }
}
