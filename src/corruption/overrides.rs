//! Scoped behavior overrides
//!
//! Corruption turns a set of auxiliary behaviors off and must put each one back exactly
//! as it found it. [`BehaviorOverride::acquire`] snapshots and disables;
//! [`BehaviorOverride::release`] consumes the guard and restores. Release is explicit and
//! called on every exit path (phase end, component disable, component removal).

use bevy::prelude::*;
use smallvec::SmallVec;

/// A toggleable auxiliary behavior (manual controls, regular attacks, ...).
#[derive(Component, Debug, Clone)]
pub struct AuxBehavior {
    pub label: String,
    pub enabled: bool,
}

impl AuxBehavior {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: true,
        }
    }
}

/// Read and write the enabled flag of behaviors by handle.
pub trait BehaviorSwitch {
    /// None if the handle no longer resolves to a behavior.
    fn is_enabled(&self, behavior: Entity) -> Option<bool>;
    fn set_enabled(&mut self, behavior: Entity, enabled: bool);
}

impl BehaviorSwitch for Query<'_, '_, &mut AuxBehavior> {
    fn is_enabled(&self, behavior: Entity) -> Option<bool> {
        self.get(behavior).ok().map(|b| b.enabled)
    }

    fn set_enabled(&mut self, behavior: Entity, enabled: bool) {
        if let Ok(mut b) = self.get_mut(behavior) {
            b.enabled = enabled;
        }
    }
}

/// Snapshot of behaviors disabled for one corrupted phase.
#[derive(Debug, Default)]
#[must_use = "a behavior override must be released to restore the behaviors"]
pub struct BehaviorOverride {
    saved: SmallVec<[(Entity, bool); 4]>,
}

impl BehaviorOverride {
    /// Record each behavior's current state, then disable it. Stale handles are skipped.
    pub fn acquire(targets: &[Entity], switch: &mut impl BehaviorSwitch) -> Self {
        let mut saved = SmallVec::new();
        for &behavior in targets {
            let Some(was_enabled) = switch.is_enabled(behavior) else {
                continue;
            };
            saved.push((behavior, was_enabled));
            switch.set_enabled(behavior, false);
        }
        Self { saved }
    }

    /// Put every behavior back to its recorded state.
    pub fn release(self, switch: &mut impl BehaviorSwitch) {
        for (behavior, was_enabled) in self.saved {
            switch.set_enabled(behavior, was_enabled);
        }
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}
