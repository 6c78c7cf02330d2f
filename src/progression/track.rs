//! Experience tracks
//!
//! A track accumulates XP and levels up whenever the accumulated amount crosses the
//! threshold for the current level. Thresholds come from an [`XpCurve`].

use bevy::prelude::*;
use smallvec::SmallVec;

use super::Track;
use crate::tuning::XpTuning;

/// Smallest XP requirement for any level.
pub const MIN_THRESHOLD: f32 = 1.0;

/// Most levels one grant can award. Surplus XP stays banked for the next grant.
pub const MAX_LEVELS_PER_GRANT: usize = 1000;

/// Level thresholds: leaving level `L` costs `base * growth^(L-1)` XP.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XpCurve {
    pub base: f32,
    pub growth: f32,
}

impl Default for XpCurve {
    fn default() -> Self {
        Self {
            base: 10.0,
            growth: 1.25,
        }
    }
}

impl XpCurve {
    pub fn threshold(&self, level: u32) -> f32 {
        let exponent = level.saturating_sub(1).min(i32::MAX as u32) as i32;
        let needed = self.base * self.growth.powi(exponent);
        if needed.is_finite() {
            needed.max(MIN_THRESHOLD)
        } else {
            f32::MAX
        }
    }
}

/// Levels reached by one XP grant, in order.
pub type LevelsGained = SmallVec<[u32; 4]>;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionTrack {
    level: u32,
    xp: f32,
    pub curve: XpCurve,
}

impl Default for ProgressionTrack {
    fn default() -> Self {
        Self::new(XpCurve::default())
    }
}

impl ProgressionTrack {
    pub fn new(curve: XpCurve) -> Self {
        Self {
            level: 1,
            xp: 0.0,
            curve,
        }
    }

    pub fn from_tuning(tuning: &XpTuning) -> Self {
        Self::new(XpCurve {
            base: tuning.curve_base,
            growth: tuning.curve_growth,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// XP accumulated toward the next level
    pub fn xp(&self) -> f32 {
        self.xp
    }

    pub fn xp_to_next(&self) -> f32 {
        self.curve.threshold(self.level)
    }

    /// Add XP and return every level reached. Non-positive amounts are ignored.
    pub fn add_xp(&mut self, amount: f32) -> LevelsGained {
        let mut gained = LevelsGained::new();
        if !(amount > 0.0) || !amount.is_finite() {
            return gained;
        }

        let mut xp = f64::from(self.xp) + f64::from(amount);
        while gained.len() < MAX_LEVELS_PER_GRANT && self.level < u32::MAX {
            let needed = f64::from(self.curve.threshold(self.level));
            if xp < needed || xp - needed == xp {
                break;
            }
            xp -= needed;
            self.level += 1;
            gained.push(self.level);
        }
        self.xp = xp.min(f64::from(f32::MAX)) as f32;
        gained
    }
}

/// Pure experience, earned by kills outside the corrupted phase.
#[derive(Component, Debug, Clone, Default, Deref, DerefMut)]
pub struct PureXp(pub ProgressionTrack);

/// Corrupt experience, earned by kills during the corrupted phase.
#[derive(Component, Debug, Clone, Default, Deref, DerefMut)]
pub struct CorruptXp(pub ProgressionTrack);

/// A track crossed a level threshold
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpEvent {
    pub entity: Entity,
    pub track: Track,
    pub level: u32,
}
