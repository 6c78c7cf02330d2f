//! Combat events
//!
//! Requests flow into the health ledger; notifications flow out of it in a fixed
//! order per hit: `HpChangedEvent`, then `KilledByEvent`, then `DeathEvent`.

use bevy::prelude::*;

/// Request to damage an entity
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: f32,
    pub knockback: Vec2,
    /// Entity credited with the hit (None for environmental damage)
    pub instigator: Option<Entity>,
    /// Ignore the target's post-hit invulnerability window
    pub forced: bool,
}

impl DamageRequest {
    pub fn new(target: Entity, amount: f32, instigator: Option<Entity>) -> Self {
        Self {
            target,
            amount,
            knockback: Vec2::ZERO,
            instigator,
            forced: false,
        }
    }
}

/// Request to heal an entity
#[derive(Event, Debug, Clone, Copy)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: f32,
}

/// Request to kill an entity outright
#[derive(Event, Debug, Clone, Copy)]
pub struct KillRequest {
    pub target: Entity,
}

/// Fired whenever an entity's HP or max HP changes
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HpChangedEvent {
    pub entity: Entity,
    pub current: f32,
    pub max: f32,
}

/// Fired once when an entity dies, naming its last damage source
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KilledByEvent {
    pub victim: Entity,
    pub killer: Option<Entity>,
}

/// Fired once when an entity dies, after `KilledByEvent`
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathEvent {
    pub victim: Entity,
    /// Last damage source at the moment of death. May already be stale.
    pub killer: Option<Entity>,
}
