//! Health ledger
//!
//! Hit points, post-hit invulnerability, god mode and the one-way death transition.
//! All mutation goes through methods so the invariants hold:
//! - `0 <= current <= max` and `max >= 1`
//! - death listeners fire exactly once per lifetime

use bevy::prelude::*;

use crate::listeners::ListenerRegistry;
use crate::tuning::HealthTuning;

/// Payload of an HP-changed notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HpChange {
    pub current: f32,
    pub max: f32,
}

/// Listener registries exposed by a [`Health`] ledger.
#[derive(Debug, Default)]
pub struct HealthListeners {
    pub hp_changed: ListenerRegistry<HpChange>,
    /// Receives the last damage source (None for environmental or scripted deaths)
    pub killed_by: ListenerRegistry<Option<Entity>>,
    pub death: ListenerRegistry<()>,
}

/// A single damage application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub amount: f32,
    /// Impulse applied to the target's velocity when the hit lands
    pub knockback: Vec2,
    pub instigator: Option<Entity>,
}

impl Hit {
    pub fn new(amount: f32) -> Self {
        Self {
            amount,
            knockback: Vec2::ZERO,
            instigator: None,
        }
    }

    pub fn by(mut self, instigator: Entity) -> Self {
        self.instigator = Some(instigator);
        self
    }

    pub fn with_knockback(mut self, knockback: Vec2) -> Self {
        self.knockback = knockback;
        self
    }
}

/// Why a damage call did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NonPositiveAmount,
    AlreadyDead,
    GodMode,
    Invulnerable,
}

/// Result of a damage call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    Ignored(IgnoreReason),
    Applied {
        /// HP actually removed (capped by remaining HP)
        dealt: f32,
        current: f32,
        max: f32,
        knockback: Vec2,
        lethal: bool,
    },
}

impl DamageOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DamageOutcome::Applied { .. })
    }

    pub fn is_lethal(&self) -> bool {
        matches!(self, DamageOutcome::Applied { lethal: true, .. })
    }
}

/// Hit point ledger for any damageable entity.
#[derive(Component, Debug)]
pub struct Health {
    current: f32,
    max: f32,
    /// Seconds of immunity to non-forced damage after each landed hit. The window is
    /// inclusive: a hit exactly `invuln_after_hit` later is still ignored.
    pub invuln_after_hit: f32,
    invulnerable_until: f32,
    god_mode: bool,
    last_damage_source: Option<Entity>,
    /// Remove `Targetable` from the entity when it dies
    pub disable_interaction_on_death: bool,
    /// Despawn the entity once its death has been processed
    pub destroy_on_death: bool,
    pub listeners: HealthListeners,
}

impl Health {
    /// Full health at `max` (floored at 1).
    pub fn new(max: f32) -> Self {
        Self::with_start(max, max)
    }

    /// Start at `start` HP. A non-positive start means full health.
    pub fn with_start(max: f32, start: f32) -> Self {
        let max = max.max(1.0);
        let current = if start <= 0.0 { max } else { start.min(max) };
        Self {
            current,
            max,
            invuln_after_hit: 0.2,
            invulnerable_until: f32::NEG_INFINITY,
            god_mode: false,
            last_damage_source: None,
            disable_interaction_on_death: true,
            destroy_on_death: false,
            listeners: HealthListeners::default(),
        }
    }

    pub fn from_tuning(max: f32, tuning: &HealthTuning) -> Self {
        let mut health = Self::new(max);
        health.invuln_after_hit = tuning.invuln_after_hit;
        health.disable_interaction_on_death = tuning.disable_interaction_on_death;
        health.destroy_on_death = tuning.destroy_on_death;
        health
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn god_mode(&self) -> bool {
        self.god_mode
    }

    pub fn invulnerable_until(&self) -> f32 {
        self.invulnerable_until
    }

    /// Last entity that landed a hit. May refer to an entity that no longer exists.
    pub fn last_damage_source(&self) -> Option<Entity> {
        self.last_damage_source
    }

    /// Damage immunity on all paths. Does not touch the invulnerability window.
    pub fn set_god_mode(&mut self, enabled: bool) {
        self.god_mode = enabled;
    }

    /// Regular damage, blocked by the post-hit invulnerability window.
    pub fn take_damage(&mut self, hit: &Hit, now: f32) -> DamageOutcome {
        self.apply_damage(hit, now, false)
    }

    /// Damage that ignores the invulnerability window. God mode still blocks it.
    pub fn force_damage(&mut self, hit: &Hit, now: f32) -> DamageOutcome {
        self.apply_damage(hit, now, true)
    }

    /// Lethal forced damage with no knockback and no instigator.
    pub fn kill(&mut self, now: f32) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Ignored(IgnoreReason::AlreadyDead);
        }
        let hit = Hit::new(self.current);
        self.force_damage(&hit, now)
    }

    fn apply_damage(&mut self, hit: &Hit, now: f32, ignore_window: bool) -> DamageOutcome {
        if hit.amount <= 0.0 {
            return DamageOutcome::Ignored(IgnoreReason::NonPositiveAmount);
        }
        if !self.is_alive() {
            return DamageOutcome::Ignored(IgnoreReason::AlreadyDead);
        }
        if self.god_mode {
            return DamageOutcome::Ignored(IgnoreReason::GodMode);
        }
        if !ignore_window && now <= self.invulnerable_until {
            return DamageOutcome::Ignored(IgnoreReason::Invulnerable);
        }

        self.last_damage_source = hit.instigator;
        self.invulnerable_until = now + self.invuln_after_hit;

        let before = self.current;
        self.current = (self.current - hit.amount).max(0.0);
        self.notify_hp_changed();

        let lethal = self.current <= 0.0;
        if lethal {
            self.listeners.killed_by.emit(&self.last_damage_source);
            self.listeners.death.emit(&());
        }

        DamageOutcome::Applied {
            dealt: before - self.current,
            current: self.current,
            max: self.max,
            knockback: hit.knockback,
            lethal,
        }
    }

    /// Restore HP up to max. Returns true if the heal was applied.
    pub fn heal(&mut self, amount: f32) -> bool {
        if amount <= 0.0 || !self.is_alive() {
            return false;
        }
        self.current = (self.current + amount).min(self.max);
        self.notify_hp_changed();
        true
    }

    /// Change max HP (floored at 1). `proportional` keeps the current/max ratio,
    /// otherwise current HP is only clamped down to the new max.
    pub fn set_max_hp(&mut self, new_max: f32, proportional: bool) {
        let new_max = new_max.max(1.0);
        let ratio = if self.max > 0.0 { self.current / self.max } else { 1.0 };

        self.max = new_max;
        self.current = if proportional {
            (new_max * ratio).clamp(0.0, new_max)
        } else {
            self.current.min(new_max)
        };

        self.notify_hp_changed();
    }

    fn notify_hp_changed(&mut self) {
        let change = HpChange {
            current: self.current,
            max: self.max,
        };
        self.listeners.hp_changed.emit(&change);
    }
}
