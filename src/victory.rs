//! Countdown to victory
//!
//! A match lasts a fixed span of real time. When it runs out, whichever experience track
//! the player levelled further decides the victory scene.

use bevy::prelude::*;

use crate::combat::events::DeathEvent;
use crate::combat::log::{GameplayLog, GameplayLogEventType};
use crate::gameplay::GameplayPhase;
use crate::progression::{CorruptXp, Player, PureXp, Track};
use crate::tuning::{GameplayTuning, VictoryTuning};

/// Ask the host to load a scene
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SceneTransitionRequest {
    pub scene: String,
}

/// Track that wins at time-out. An absent track counts as level 0, a present one as at
/// least 1. Ties go to `corrupt_wins_tie`.
pub fn victory_track(pure: Option<u32>, corrupt: Option<u32>, corrupt_wins_tie: bool) -> Track {
    let pure = pure.map_or(0, |level| level.max(1));
    let corrupt = corrupt.map_or(0, |level| level.max(1));
    match corrupt.cmp(&pure) {
        std::cmp::Ordering::Greater => Track::Corrupt,
        std::cmp::Ordering::Less => Track::Pure,
        std::cmp::Ordering::Equal if corrupt_wins_tie => Track::Corrupt,
        std::cmp::Ordering::Equal => Track::Pure,
    }
}

/// `MM:SS`, rounding seconds up
pub fn format_countdown(seconds: f32) -> String {
    let total = seconds.max(0.0).ceil() as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[derive(Resource, Debug, Clone)]
pub struct VictoryCountdown {
    pub config: VictoryTuning,
    remaining: f32,
    running: bool,
    finished: bool,
}

impl FromWorld for VictoryCountdown {
    fn from_world(world: &mut World) -> Self {
        let config = world
            .get_resource::<GameplayTuning>()
            .map(|t| t.victory.clone())
            .unwrap_or_default();
        Self::new(config)
    }
}

impl VictoryCountdown {
    pub fn new(config: VictoryTuning) -> Self {
        Self {
            remaining: config.duration_seconds.max(0.0),
            running: config.auto_start,
            finished: false,
            config,
        }
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running && !self.finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn label(&self) -> String {
        format_countdown(self.remaining)
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// No effect once finished.
    pub fn resume(&mut self) {
        if !self.finished {
            self.running = true;
        }
    }

    /// Add (or remove, if negative) time, clamped to [0, duration].
    pub fn add_seconds(&mut self, seconds: f32) {
        let duration = self.config.duration_seconds.max(0.0);
        self.remaining = (self.remaining + seconds).clamp(0.0, duration);
    }

    /// Consume `dt` real seconds. Returns true on the tick the countdown runs out.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.is_running() {
            return false;
        }
        self.remaining -= dt;
        if self.remaining > 0.0 {
            return false;
        }
        self.remaining = 0.0;
        self.finished = true;
        true
    }

    pub fn scene_for(&self, track: Track) -> &str {
        match track {
            Track::Pure => &self.config.pure_scene,
            Track::Corrupt => &self.config.corrupt_scene,
        }
    }
}

pub fn stop_countdown_on_player_death(
    mut deaths: EventReader<DeathEvent>,
    players: Query<(), With<Player>>,
    mut countdown: ResMut<VictoryCountdown>,
) {
    if !countdown.config.stop_on_player_death {
        deaths.clear();
        return;
    }
    for death in deaths.read() {
        if players.contains(death.victim) {
            info!("Player died, victory countdown stopped at {}", countdown.label());
            countdown.pause();
        }
    }
}

/// Run the countdown on real time and request the victory scene when it expires.
pub fn tick_victory_countdown(
    real_time: Res<Time<Real>>,
    mut countdown: ResMut<VictoryCountdown>,
    players: Query<(Option<&PureXp>, Option<&CorruptXp>), With<Player>>,
    mut transitions: EventWriter<SceneTransitionRequest>,
    mut log: ResMut<GameplayLog>,
) {
    if !countdown.tick(real_time.delta_secs()) {
        return;
    }

    let (pure, corrupt) = players
        .iter()
        .next()
        .map(|(pure, corrupt)| (pure.map(|t| t.level()), corrupt.map(|t| t.level())))
        .unwrap_or((None, None));
    let winner = victory_track(pure, corrupt, countdown.config.corrupt_wins_tie);
    let scene = countdown.scene_for(winner).to_string();

    info!("Time is up: {} victory, loading {}", winner.label(), scene);
    log.log(
        GameplayLogEventType::MatchEvent,
        format!("Time is up, {} path wins", winner.label()),
    );
    transitions.send(SceneTransitionRequest { scene });
}

/// Plugin for the victory countdown
pub struct VictoryPlugin;

impl Plugin for VictoryPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SceneTransitionRequest>()
            .init_resource::<VictoryCountdown>()
            .add_systems(
                Update,
                (stop_countdown_on_player_death, tick_victory_countdown)
                    .chain()
                    .in_set(GameplayPhase::Presentation),
            );
    }
}
