//! Gameplay Systems API
//!
//! Both the headless runner and tests build their app through [`GameplayPlugin`]
//! rather than adding the individual plugins, so phase ordering stays in one place.
//!
//! ## System Phases
//!
//! Gameplay systems run in six ordered phases each frame:
//!
//! 1. **Cycle** - corruption countdowns and phase side effects
//! 2. **Movement** - automatic seeking, velocity integration
//! 3. **Combat** - area damage pulses, damage/heal/kill resolution
//! 4. **Progression** - XP routing, ally-kill penalties, upgrade selection
//! 5. **Presentation** - toast display loop, victory countdown, logging
//! 6. **Cleanup** - despawning dead entities

use bevy::prelude::*;

use crate::combat::CombatPlugin;
use crate::corruption::CorruptionPlugin;
use crate::progression::ProgressionPlugin;
use crate::tuning::GameplayTuning;
use crate::upgrades::UpgradesPlugin;
use crate::victory::VictoryPlugin;

/// System set labels for gameplay ordering.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameplayPhase {
    Cycle,
    Movement,
    Combat,
    Progression,
    Presentation,
    Cleanup,
}

/// Configures the ordering between gameplay phases.
pub fn configure_gameplay_phases(app: &mut App) {
    app.configure_sets(
        Update,
        (
            GameplayPhase::Cycle,
            GameplayPhase::Movement,
            GameplayPhase::Combat,
            GameplayPhase::Progression,
            GameplayPhase::Presentation,
            GameplayPhase::Cleanup,
        )
            .chain(),
    );

    // Flush death markers before progression reads the deaths
    app.add_systems(
        Update,
        apply_deferred
            .after(GameplayPhase::Combat)
            .before(GameplayPhase::Progression),
    );
}

/// All gameplay plugins with their phase ordering.
///
/// Inserts default [`GameplayTuning`] if none is present. Insert your own before adding
/// the plugin to override it.
pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameplayTuning>();
        configure_gameplay_phases(app);
        app.add_plugins((
            CombatPlugin,
            CorruptionPlugin,
            ProgressionPlugin,
            UpgradesPlugin,
            VictoryPlugin,
        ));
    }
}
