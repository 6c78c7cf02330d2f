//! Integration tests for the corruption phase machine
//!
//! These tests drive a full gameplay app in fixed 0.25 s steps and verify that:
//! - Phases alternate on schedule and apply their side effects
//! - Corrupted players are immune, seek targets and pulse their aura
//! - Behaviors are restored on every exit path (phase end, disable, removal, despawn)
//! - Ally kills are reported and penalized while corrupted

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use corruptsim::combat::body::{CollisionLayers, Targetable, Velocity};
use corruptsim::combat::events::DamageRequest;
use corruptsim::combat::health::Health;
use corruptsim::corruption::aura::DamageAura;
use corruptsim::corruption::overrides::AuxBehavior;
use corruptsim::corruption::{
    AllyKillPenalized, CorruptionPhaseChanged, PlayerCorruption, ResetCorruptionCountdown,
    SetCorruptionActive,
};
use corruptsim::gameplay::GameplayPlugin;
use corruptsim::progression::{Ally, CorruptXp, Player, PureXp, XpDrop};
use corruptsim::rng::GameRng;
use corruptsim::tuning::GameplayTuning;
use corruptsim::upgrades::config::UpgradePool;

const STEP: f32 = 0.25;

/// Events of one type seen so far
#[derive(Resource)]
struct Recorded<E: Event>(Vec<E>);

fn record<E: Event + Clone>(mut reader: EventReader<E>, mut out: ResMut<Recorded<E>>) {
    out.0.extend(reader.read().cloned());
}

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(GameplayTuning::default())
        .insert_resource(UpgradePool::default())
        .insert_resource(GameRng::from_seed(1))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            STEP,
        )))
        .add_plugins(GameplayPlugin)
        .insert_resource(Recorded::<CorruptionPhaseChanged>(Vec::new()))
        .insert_resource(Recorded::<AllyKillPenalized>(Vec::new()))
        .add_systems(
            Last,
            (record::<CorruptionPhaseChanged>, record::<AllyKillPenalized>),
        );
    // First frame has a zero delta
    app.update();
    app
}

fn step(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

struct Rig {
    player: Entity,
    manual: Entity,
    dash: Entity,
}

/// Player with a 1 s pure phase and the given corrupted phase length
fn spawn_player(app: &mut App, duration: f32) -> Rig {
    let world = app.world_mut();
    let manual = world.spawn(AuxBehavior::new("Manual controls")).id();
    let dash = world
        .spawn(AuxBehavior {
            label: "Dash".to_string(),
            enabled: false,
        })
        .id();
    let player = world
        .spawn((
            Player,
            Transform::default(),
            Velocity::default(),
            CollisionLayers(CollisionLayers::PLAYER),
            Targetable,
            Health::new(100.0),
            PlayerCorruption::new(1.0, duration).disabling([manual, dash]),
            DamageAura::new(
                1.5,
                10.0,
                0.5,
                CollisionLayers::ENEMY | CollisionLayers::ALLY,
            ),
            PureXp::default(),
            CorruptXp::default(),
        ))
        .id();
    Rig {
        player,
        manual,
        dash,
    }
}

fn is_corrupted(app: &App, player: Entity) -> bool {
    app.world()
        .get::<PlayerCorruption>(player)
        .is_some_and(|c| c.is_corrupted())
}

fn behavior_enabled(app: &App, behavior: Entity) -> bool {
    app.world()
        .get::<AuxBehavior>(behavior)
        .is_some_and(|b| b.enabled)
}

fn god_mode(app: &App, player: Entity) -> bool {
    app.world()
        .get::<Health>(player)
        .is_some_and(|h| h.god_mode())
}

fn hp(app: &App, entity: Entity) -> f32 {
    app.world().get::<Health>(entity).map_or(-1.0, |h| h.current())
}

fn phase_events(app: &App) -> Vec<bool> {
    app.world()
        .resource::<Recorded<CorruptionPhaseChanged>>()
        .0
        .iter()
        .map(|e| e.corrupted)
        .collect()
}

#[test]
fn test_phases_alternate_with_side_effects() {
    let mut app = test_app();
    let rig = spawn_player(&mut app, 0.5);

    step(&mut app, 3);
    assert!(!is_corrupted(&app, rig.player));
    assert!(behavior_enabled(&app, rig.manual));

    step(&mut app, 1);
    assert!(is_corrupted(&app, rig.player), "Corrupted after the 1 s interval");
    assert!(god_mode(&app, rig.player));
    assert!(!behavior_enabled(&app, rig.manual));
    assert!(!behavior_enabled(&app, rig.dash));
    assert!(app
        .world()
        .get::<DamageAura>(rig.player)
        .is_some_and(|a| a.is_active()));

    step(&mut app, 2);
    assert!(!is_corrupted(&app, rig.player), "Pure again after the 0.5 s duration");
    assert!(!god_mode(&app, rig.player));
    assert!(behavior_enabled(&app, rig.manual), "Restored to enabled");
    assert!(!behavior_enabled(&app, rig.dash), "Was disabled before, stays disabled");
    assert!(app
        .world()
        .get::<DamageAura>(rig.player)
        .is_some_and(|a| !a.is_active()));
    assert_eq!(
        app.world().get::<Velocity>(rig.player).map(|v| v.0),
        Some(Vec2::ZERO)
    );

    assert_eq!(phase_events(&app), vec![true, false]);
}

#[test]
fn test_corrupted_player_ignores_damage() {
    let mut app = test_app();
    let rig = spawn_player(&mut app, 2.0);
    step(&mut app, 4);
    assert!(is_corrupted(&app, rig.player));

    app.world_mut()
        .send_event(DamageRequest::new(rig.player, 40.0, None));
    step(&mut app, 1);
    assert_eq!(hp(&app, rig.player), 100.0);

    let mut forced = DamageRequest::new(rig.player, 40.0, None);
    forced.forced = true;
    app.world_mut().send_event(forced);
    step(&mut app, 1);
    assert_eq!(hp(&app, rig.player), 100.0, "God mode blocks forced damage too");
}

#[test]
fn test_aura_kill_routes_corrupt_xp() {
    let mut app = test_app();
    let rig = spawn_player(&mut app, 2.0);
    let enemy = app
        .world_mut()
        .spawn((
            Transform::from_xyz(1.0, 0.0, 0.0),
            CollisionLayers(CollisionLayers::ENEMY),
            Targetable,
            Health::new(30.0),
            XpDrop {
                pure: 3.0,
                corrupt: 7.0,
            },
        ))
        .id();

    // Corruption starts on the 4th step and the aura pulses at once, then every 0.5 s
    step(&mut app, 4);
    assert_eq!(hp(&app, enemy), 20.0);
    step(&mut app, 2);
    assert_eq!(hp(&app, enemy), 10.0);
    step(&mut app, 2);
    assert_eq!(hp(&app, enemy), 0.0);

    let world = app.world();
    assert!(world.get::<Targetable>(enemy).is_none(), "Dead entities stop being targets");
    assert_eq!(world.get::<CorruptXp>(rig.player).map(|t| t.xp()), Some(7.0));
    assert_eq!(world.get::<PureXp>(rig.player).map(|t| t.xp()), Some(0.0));
}

#[test]
fn test_corrupted_player_seeks_nearest_target() {
    let mut app = test_app();
    let rig = spawn_player(&mut app, 2.0);
    let _far = app
        .world_mut()
        .spawn((
            Transform::from_xyz(-6.0, 0.0, 0.0),
            CollisionLayers(CollisionLayers::ENEMY),
            Targetable,
            Health::new(30.0),
        ))
        .id();
    let _near = app
        .world_mut()
        .spawn((
            Transform::from_xyz(0.0, 4.0, 0.0),
            CollisionLayers(CollisionLayers::ENEMY),
            Targetable,
            Health::new(30.0),
        ))
        .id();

    step(&mut app, 3);
    assert_eq!(
        app.world().get::<Velocity>(rig.player).map(|v| v.0),
        Some(Vec2::ZERO),
        "No seeking while pure"
    );

    step(&mut app, 1);
    let velocity = app.world().get::<Velocity>(rig.player).map(|v| v.0);
    assert_eq!(velocity, Some(Vec2::new(0.0, 4.0)), "auto_speed toward the nearest");
}

#[test]
fn test_reset_countdown_only_while_pure() {
    let mut app = test_app();
    let rig = spawn_player(&mut app, 0.5);

    step(&mut app, 2);
    app.world_mut().send_event(ResetCorruptionCountdown { player: rig.player });
    step(&mut app, 1);
    assert_eq!(phase_events(&app), vec![false], "A reset starts a fresh pure phase");
    step(&mut app, 2);
    assert!(!is_corrupted(&app, rig.player), "Countdown restarted at full length");
    step(&mut app, 1);
    assert!(is_corrupted(&app, rig.player));

    app.world_mut().send_event(ResetCorruptionCountdown { player: rig.player });
    step(&mut app, 1);
    assert!(is_corrupted(&app, rig.player), "Reset ignored while corrupted");
    assert_eq!(phase_events(&app), vec![false, true]);
}

#[test]
fn test_disable_mid_corruption_restores() {
    let mut app = test_app();
    let rig = spawn_player(&mut app, 2.0);
    step(&mut app, 4);
    assert!(is_corrupted(&app, rig.player));

    app.world_mut().send_event(SetCorruptionActive {
        player: rig.player,
        active: false,
    });
    step(&mut app, 1);
    assert!(!is_corrupted(&app, rig.player));
    assert!(!god_mode(&app, rig.player));
    assert!(behavior_enabled(&app, rig.manual));

    step(&mut app, 12);
    assert!(!is_corrupted(&app, rig.player), "Disabled machines don't advance");
    let before = phase_events(&app).len();

    app.world_mut().send_event(SetCorruptionActive {
        player: rig.player,
        active: true,
    });
    step(&mut app, 3);
    assert!(!is_corrupted(&app, rig.player));
    assert_eq!(phase_events(&app)[before..], [false]);
    step(&mut app, 1);
    assert!(is_corrupted(&app, rig.player), "Re-enabled from a fresh pure phase");
}

#[test]
fn test_removing_component_restores() {
    let mut app = test_app();
    let rig = spawn_player(&mut app, 2.0);
    step(&mut app, 4);
    assert!(god_mode(&app, rig.player));

    app.world_mut()
        .entity_mut(rig.player)
        .remove::<PlayerCorruption>();

    assert!(!god_mode(&app, rig.player));
    assert!(behavior_enabled(&app, rig.manual));
    assert!(!behavior_enabled(&app, rig.dash));
    assert!(app
        .world()
        .get::<DamageAura>(rig.player)
        .is_some_and(|a| !a.is_active()));
}

#[test]
fn test_despawn_mid_corruption_restores_behaviors() {
    let mut app = test_app();
    let rig = spawn_player(&mut app, 2.0);
    step(&mut app, 4);
    assert!(!behavior_enabled(&app, rig.manual));

    app.world_mut().despawn(rig.player);
    assert!(behavior_enabled(&app, rig.manual));

    step(&mut app, 2);
    assert!(behavior_enabled(&app, rig.manual));
}

#[test]
fn test_ally_kill_while_corrupted_is_penalized() {
    let mut app = test_app();
    let rig = spawn_player(&mut app, 2.0);
    let ally = app
        .world_mut()
        .spawn((
            Ally,
            Transform::from_xyz(0.5, 0.0, 0.0),
            CollisionLayers(CollisionLayers::ALLY),
            Targetable,
            Health::new(10.0),
        ))
        .id();

    step(&mut app, 4);
    assert_eq!(hp(&app, ally), 0.0);

    let penalties = &app.world().resource::<Recorded<AllyKillPenalized>>().0;
    assert_eq!(penalties.len(), 1);
    assert_eq!(penalties[0].ally, ally);
    assert_eq!(penalties[0].penalty, 10.0);
    assert_eq!(
        hp(&app, rig.player),
        100.0,
        "The forced penalty is still absorbed by god mode"
    );
}
