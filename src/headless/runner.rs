//! Headless run execution
//!
//! Runs the gameplay simulation without any graphical output, stepping a fixed frame until
//! the victory countdown requests a scene, the player dies, or the run times out.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::combat::body::{CollisionLayers, Damping, Targetable, Velocity};
use crate::combat::events::{DamageRequest, DeathEvent};
use crate::combat::health::Health;
use crate::combat::log::{GameplayLog, GameplayLogEventType};
use crate::combat::SimulationSpeed;
use crate::corruption::aura::DamageAura;
use crate::corruption::overrides::AuxBehavior;
use crate::corruption::seek::{find_seek_target, seek_velocity};
use crate::corruption::{AllyKilledByPlayer, CorruptionPhaseChanged, PlayerCorruption};
use crate::gameplay::{GameplayPhase, GameplayPlugin};
use crate::progression::{Ally, CorruptXp, Player, ProgressionTrack, PureXp, XpDrop};
use crate::rng::GameRng;
use crate::tuning::GameplayTuning;
use crate::upgrades::UpgradeApplied;
use crate::victory::SceneTransitionRequest;

use super::config::HeadlessRunConfig;

/// Fixed simulation step
pub const FRAME_SECS: f64 = 1.0 / 60.0;

/// Directory for run summaries without an explicit output path
pub const DEFAULT_OUTPUT_DIR: &str = "run_logs";

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEnd {
    Victory,
    PlayerDied,
    TimedOut,
}

/// Result of a completed headless run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub end: RunEnd,
    /// Scene requested by the victory countdown, if it ran out
    pub scene: Option<String>,
    /// Real (unscaled) seconds simulated
    pub real_time: f32,
    /// Scaled game seconds simulated
    pub game_time: f32,
    pub pure_level: u32,
    pub pure_xp: f32,
    pub corrupt_level: u32,
    pub corrupt_xp: f32,
    pub final_hp: f32,
    pub max_hp: f32,
    pub kills: u32,
    pub ally_kills: u32,
    pub phase_flips: u32,
    pub upgrades: Vec<String>,
    pub log_entries: usize,
    pub random_seed: Option<u64>,
}

/// Hostile unit in headless runs
#[derive(Component, Debug, Clone, Copy)]
pub struct Enemy;

/// Walks toward the player
#[derive(Component, Debug, Clone, Copy)]
pub struct Chaser {
    pub speed: f32,
}

/// Hurts the player on touch. Frequency is bounded by the player's invulnerability window.
#[derive(Component, Debug, Clone, Copy)]
pub struct ContactDamage {
    pub damage: f32,
    pub range: f32,
}

/// The player's regular attack. Lives on an [`AuxBehavior`] entity so corruption can
/// switch it off.
#[derive(Component, Debug, Clone)]
pub struct RegularAttack {
    pub owner: Entity,
    pub damage: f32,
    pub range: f32,
    pub interval: f32,
    cooldown: f32,
}

impl RegularAttack {
    pub fn new(owner: Entity) -> Self {
        Self {
            owner,
            damage: 12.0,
            range: 2.5,
            interval: 0.6,
            cooldown: 0.0,
        }
    }
}

/// Resource to track headless run state
#[derive(Resource)]
pub struct HeadlessRunState {
    pub config: HeadlessRunConfig,
    pub player: Option<Entity>,
    pub real_elapsed: f32,
    pub complete: bool,
    pub end: Option<RunEnd>,
    pub scene: Option<String>,
    pub kills: u32,
    pub ally_kills: u32,
    pub phase_flips: u32,
    pub upgrades: Vec<String>,
}

impl HeadlessRunState {
    pub fn new(config: HeadlessRunConfig) -> Self {
        Self {
            config,
            player: None,
            real_elapsed: 0.0,
            complete: false,
            end: None,
            scene: None,
            kills: 0,
            ally_kills: 0,
            phase_flips: 0,
            upgrades: Vec::new(),
        }
    }
}

/// Plugin for headless run execution
pub struct HeadlessPlugin {
    pub config: HeadlessRunConfig,
    pub tuning: GameplayTuning,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let rng = match self.config.random_seed {
            Some(seed) => {
                info!("Using deterministic RNG with seed: {}", seed);
                GameRng::from_seed(seed)
            }
            None => {
                info!("Using non-deterministic RNG (no seed provided)");
                GameRng::from_entropy()
            }
        };

        app.insert_resource(self.tuning.clone())
            .insert_resource(rng)
            .insert_resource(SimulationSpeed {
                multiplier: self.config.time_scale,
            })
            .insert_resource(HeadlessRunState::new(self.config.clone()))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
                FRAME_SECS,
            )))
            .add_plugins(GameplayPlugin)
            .add_systems(Startup, headless_setup_run)
            .add_systems(
                Update,
                chase_player
                    .in_set(GameplayPhase::Movement)
                    .before(crate::combat::body::integrate_velocity),
            )
            .add_systems(
                Update,
                (contact_damage, player_regular_attack)
                    .chain()
                    .in_set(GameplayPhase::Combat)
                    .after(crate::corruption::aura::pulse_damage_auras)
                    .before(crate::combat::systems::apply_damage_requests),
            )
            .add_systems(
                Update,
                respawn_fallen_enemies
                    .in_set(GameplayPhase::Progression)
                    .after(crate::upgrades::offer_upgrades_on_level_up),
            )
            .add_systems(
                Update,
                (track_run_events, headless_check_run_end)
                    .chain()
                    .in_set(GameplayPhase::Presentation)
                    .after(crate::victory::tick_victory_countdown),
            );
    }
}

fn ring_position(rng: &mut GameRng, radius: f32) -> Vec3 {
    let angle = rng.random_range(0.0, TAU);
    Vec3::new(angle.cos() * radius, angle.sin() * radius, 0.0)
}

fn spawn_enemy(commands: &mut Commands, rng: &mut GameRng, tuning: &GameplayTuning, radius: f32) {
    let mut health = Health::from_tuning(tuning.health.enemy_max_hp, &tuning.health);
    health.destroy_on_death = true;

    commands.spawn((
        Name::new("Enemy"),
        Enemy,
        Transform::from_translation(ring_position(rng, radius)),
        Velocity::default(),
        Damping::default(),
        CollisionLayers(CollisionLayers::ENEMY),
        Targetable,
        health,
        XpDrop {
            pure: tuning.xp.pure_per_kill,
            corrupt: tuning.xp.corrupt_per_kill,
        },
        Chaser { speed: 1.5 },
        ContactDamage {
            damage: 4.0,
            range: 0.6,
        },
    ));
}

/// Spawn the player, its behaviors, allies and the first wave of enemies
fn headless_setup_run(
    mut commands: Commands,
    tuning: Res<GameplayTuning>,
    mut rng: ResMut<GameRng>,
    mut state: ResMut<HeadlessRunState>,
    mut log: ResMut<GameplayLog>,
) {
    log.clear();
    log.log(
        GameplayLogEventType::MatchEvent,
        "Run started (headless mode)".to_string(),
    );

    let manual = commands
        .spawn((Name::new("Manual controls"), AuxBehavior::new("Manual controls")))
        .id();
    let attack = commands
        .spawn((Name::new("Regular attack"), AuxBehavior::new("Regular attack")))
        .id();

    let corruption = &tuning.corruption;
    let player = commands
        .spawn((
            Name::new("Player"),
            Player,
            Transform::default(),
            Velocity::default(),
            Damping::default(),
            CollisionLayers(CollisionLayers::PLAYER),
            Targetable,
            Health::from_tuning(tuning.health.player_max_hp, &tuning.health),
            PlayerCorruption::from_tuning(corruption).disabling([manual, attack]),
            DamageAura::new(
                corruption.aura_radius,
                corruption.aura_damage,
                corruption.aura_interval,
                CollisionLayers::ENEMY | CollisionLayers::ALLY,
            ),
            PureXp(ProgressionTrack::from_tuning(&tuning.xp)),
            CorruptXp(ProgressionTrack::from_tuning(&tuning.xp)),
        ))
        .id();
    commands.entity(attack).insert(RegularAttack::new(player));
    state.player = Some(player);

    let radius = state.config.arena_radius;
    for _ in 0..state.config.allies {
        commands.spawn((
            Name::new("Ally"),
            Ally,
            Transform::from_translation(ring_position(&mut rng, radius * 0.5)),
            Velocity::default(),
            Damping::default(),
            CollisionLayers(CollisionLayers::ALLY),
            Targetable,
            Health::from_tuning(tuning.health.enemy_max_hp, &tuning.health),
        ));
    }
    for _ in 0..state.config.enemies {
        spawn_enemy(&mut commands, &mut rng, &tuning, radius);
    }

    info!(
        "Headless run setup complete: {} enemies, {} allies",
        state.config.enemies, state.config.allies
    );
}

fn chase_player(
    players: Query<&Transform, With<Player>>,
    mut chasers: Query<(&Transform, &Chaser, &Health, &mut Velocity), With<Enemy>>,
) {
    let Some(target) = players.iter().next().map(|t| t.translation.truncate()) else {
        return;
    };
    for (transform, chaser, health, mut velocity) in chasers.iter_mut() {
        if !health.is_alive() {
            velocity.0 = Vec2::ZERO;
            continue;
        }
        velocity.0 = seek_velocity(transform.translation.truncate(), Some(target), chaser.speed);
    }
}

fn contact_damage(
    players: Query<(Entity, &Transform, &Health), With<Player>>,
    enemies: Query<(Entity, &Transform, &ContactDamage, &Health), With<Enemy>>,
    mut damage: EventWriter<DamageRequest>,
) {
    let Some((player, player_transform, player_health)) = players.iter().next() else {
        return;
    };
    if !player_health.is_alive() {
        return;
    }
    let center = player_transform.translation.truncate();
    for (enemy, transform, contact, health) in enemies.iter() {
        if !health.is_alive() {
            continue;
        }
        if transform.translation.truncate().distance(center) <= contact.range {
            damage.send(DamageRequest::new(player, contact.damage, Some(enemy)));
        }
    }
}

fn player_regular_attack(
    time: Res<Time>,
    mut attacks: Query<(&AuxBehavior, &mut RegularAttack)>,
    owners: Query<&Transform>,
    targets: Query<(Entity, &Transform, &CollisionLayers), With<Targetable>>,
    healths: Query<&Health>,
    mut damage: EventWriter<DamageRequest>,
) {
    let dt = time.delta_secs();
    for (behavior, mut attack) in attacks.iter_mut() {
        attack.cooldown = (attack.cooldown - dt).max(0.0);
        if !behavior.enabled || attack.cooldown > 0.0 {
            continue;
        }
        let Ok(owner) = owners.get(attack.owner) else {
            continue;
        };
        let origin = owner.translation.truncate();
        let Some((target, _)) = find_seek_target(
            &targets,
            origin,
            attack.range,
            CollisionLayers::ENEMY,
            attack.owner,
            |entity| healths.get(entity).map_or(false, Health::is_alive),
        ) else {
            continue;
        };
        damage.send(DamageRequest::new(target, attack.damage, Some(attack.owner)));
        attack.cooldown = attack.interval;
    }
}

fn respawn_fallen_enemies(
    mut commands: Commands,
    mut deaths: EventReader<DeathEvent>,
    enemies: Query<(), With<Enemy>>,
    tuning: Res<GameplayTuning>,
    mut rng: ResMut<GameRng>,
    state: Res<HeadlessRunState>,
) {
    for death in deaths.read() {
        if state.config.respawn_enemies && enemies.contains(death.victim) {
            spawn_enemy(&mut commands, &mut rng, &tuning, state.config.arena_radius);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn track_run_events(
    mut state: ResMut<HeadlessRunState>,
    mut deaths: EventReader<DeathEvent>,
    mut phases: EventReader<CorruptionPhaseChanged>,
    mut upgrades: EventReader<UpgradeApplied>,
    mut ally_kills: EventReader<AllyKilledByPlayer>,
    mut scenes: EventReader<SceneTransitionRequest>,
    enemies: Query<(), With<Enemy>>,
) {
    let player = state.player;
    for death in deaths.read() {
        if death.killer.is_some() && death.killer == player && enemies.contains(death.victim) {
            state.kills += 1;
        }
    }
    state.phase_flips += phases.read().count() as u32;
    for upgrade in upgrades.read() {
        state.upgrades.push(upgrade.title.clone());
    }
    state.ally_kills += ally_kills.read().count() as u32;
    if let Some(request) = scenes.read().last() {
        state.scene = Some(request.scene.clone());
    }
}

/// Stop on a scene request, the player's death, or the time limit
fn headless_check_run_end(
    real_time: Res<Time<Real>>,
    mut state: ResMut<HeadlessRunState>,
    players: Query<&Health, With<Player>>,
    mut log: ResMut<GameplayLog>,
) {
    if state.complete {
        return;
    }
    state.real_elapsed += real_time.delta_secs();

    let end = if state.scene.is_some() {
        Some(RunEnd::Victory)
    } else if players.iter().next().is_some_and(|h| !h.is_alive()) {
        Some(RunEnd::PlayerDied)
    } else if state.real_elapsed >= state.config.max_duration_secs {
        Some(RunEnd::TimedOut)
    } else {
        None
    };

    if let Some(end) = end {
        info!("Run ended after {:.1}s: {:?}", state.real_elapsed, end);
        log.log(GameplayLogEventType::MatchEvent, format!("Run ended: {:?}", end));
        state.end = Some(end);
        state.complete = true;
    }
}

/// Build the app for a headless run without stepping it.
pub fn build_headless_app(config: &HeadlessRunConfig, tuning: GameplayTuning, logging: bool) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    if logging {
        app.add_plugins(LogPlugin::default());
    }
    app.add_plugins(HeadlessPlugin {
        config: config.clone(),
        tuning,
    });
    app
}

/// Collect the summary from a finished (or stopped) run
pub fn collect_summary(world: &mut World) -> Result<RunSummary, String> {
    let state = world
        .get_resource::<HeadlessRunState>()
        .ok_or("Headless run state missing")?;
    let player = state.player.ok_or("Player was never spawned")?;
    let (end, scene, real_time) = (
        state.end.unwrap_or(RunEnd::TimedOut),
        state.scene.clone(),
        state.real_elapsed,
    );
    let (kills, ally_kills, phase_flips, upgrades, random_seed) = (
        state.kills,
        state.ally_kills,
        state.phase_flips,
        state.upgrades.clone(),
        state.config.random_seed,
    );

    let (game_time, log_entries) = world
        .get_resource::<GameplayLog>()
        .map_or((0.0, 0), |log| (log.match_time, log.entries.len()));

    let mut players = world.query::<(&Health, Option<&PureXp>, Option<&CorruptXp>)>();
    let (health, pure, corrupt) = players
        .get(world, player)
        .map_err(|_| "Player entity no longer exists".to_string())?;

    Ok(RunSummary {
        end,
        scene,
        real_time,
        game_time,
        pure_level: pure.map_or(0, |t| t.level()),
        pure_xp: pure.map_or(0.0, |t| t.xp()),
        corrupt_level: corrupt.map_or(0, |t| t.level()),
        corrupt_xp: corrupt.map_or(0.0, |t| t.xp()),
        final_hp: health.current(),
        max_hp: health.max(),
        kills,
        ally_kills,
        phase_flips,
        upgrades,
        log_entries,
        random_seed,
    })
}

/// Step a run to completion and return its summary
pub fn simulate(
    config: &HeadlessRunConfig,
    tuning: GameplayTuning,
    logging: bool,
) -> Result<RunSummary, String> {
    config.validate()?;
    let mut app = build_headless_app(config, tuning, logging);

    // The first frame has no delta, plus slack for float accumulation
    let max_frames = (f64::from(config.max_duration_secs) / FRAME_SECS).ceil() as u64 + 2;
    for _ in 0..max_frames {
        app.update();
        let complete = app
            .world()
            .get_resource::<HeadlessRunState>()
            .is_some_and(|s| s.complete);
        if complete {
            break;
        }
    }

    collect_summary(app.world_mut())
}

/// Write the summary as pretty JSON. Returns the path written.
pub fn save_summary(summary: &RunSummary, output_path: Option<&str>) -> Result<PathBuf, String> {
    let path = match output_path {
        Some(path) => PathBuf::from(path),
        None => {
            let stamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            Path::new(DEFAULT_OUTPUT_DIR).join(format!("run_{}.json", stamp))
        }
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| format!("Failed to serialize summary: {}", e))?;
    std::fs::write(&path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    Ok(path)
}

/// Run a headless simulation with the given configuration
pub fn run_headless(config: HeadlessRunConfig) -> Result<RunSummary, String> {
    println!("Starting headless run...");
    println!("  Enemies: {}  Allies: {}", config.enemies, config.allies);
    println!("  Time scale: {:.2}x", config.time_scale);
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    let mut tuning = GameplayTuning::load();
    if let Some(seconds) = config.victory_seconds {
        tuning.victory.duration_seconds = seconds;
    }

    let summary = simulate(&config, tuning, true)?;

    println!(
        "Run ended: {:?} after {:.1}s ({:.1}s game time)",
        summary.end, summary.real_time, summary.game_time
    );
    if let Some(scene) = &summary.scene {
        println!("  Victory scene: {}", scene);
    }
    println!(
        "  Pure level {} / Corrupt level {}  Kills: {}  Upgrades: {}",
        summary.pure_level,
        summary.corrupt_level,
        summary.kills,
        summary.upgrades.len()
    );

    match save_summary(&summary, config.output_path.as_deref()) {
        Ok(path) => println!("Summary saved to: {}", path.display()),
        Err(e) => eprintln!("Failed to save summary: {}", e),
    }
    Ok(summary)
}
