//! Dual progression
//!
//! Two independent experience tracks per player. Kills made while pure feed [`PureXp`],
//! kills made while corrupted feed [`CorruptXp`].

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod bridge;
pub mod track;

use crate::gameplay::GameplayPhase;
pub use bridge::{Ally, Player, XpDrop};
pub use track::{CorruptXp, LevelUpEvent, ProgressionTrack, PureXp, XpCurve};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Track {
    Pure,
    Corrupt,
}

impl Track {
    pub fn label(&self) -> &'static str {
        match self {
            Track::Pure => "pure",
            Track::Corrupt => "corrupt",
        }
    }
}

/// Plugin for experience tracks and kill XP routing
pub struct ProgressionPlugin;

impl Plugin for ProgressionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LevelUpEvent>().add_systems(
            Update,
            bridge::grant_kill_xp.in_set(GameplayPhase::Progression),
        );
    }
}
