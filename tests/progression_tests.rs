//! Integration tests for kill XP routing, upgrades and toasts

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use corruptsim::combat::events::DamageRequest;
use corruptsim::combat::health::Health;
use corruptsim::combat::SimulationSpeed;
use corruptsim::corruption::PlayerCorruption;
use corruptsim::gameplay::GameplayPlugin;
use corruptsim::progression::{
    CorruptXp, LevelUpEvent, Player, ProgressionTrack, PureXp, Track, XpCurve, XpDrop,
};
use corruptsim::rng::GameRng;
use corruptsim::tuning::GameplayTuning;
use corruptsim::upgrades::config::{UpgradeDefinition, UpgradeEffect, UpgradePool};
use corruptsim::upgrades::toast::ToastBoard;
use corruptsim::upgrades::UpgradeApplied;

#[derive(Resource, Default)]
struct Seen {
    level_ups: Vec<(Track, u32)>,
    upgrades: Vec<UpgradeApplied>,
}

fn record(
    mut level_ups: EventReader<LevelUpEvent>,
    mut upgrades: EventReader<UpgradeApplied>,
    mut seen: ResMut<Seen>,
) {
    seen.level_ups
        .extend(level_ups.read().map(|e| (e.track, e.level)));
    seen.upgrades.extend(upgrades.read().cloned());
}

fn test_app() -> App {
    let mut tuning = GameplayTuning::default();
    tuning.upgrades.toast_seconds = 1.0;

    let pool = UpgradePool::new(vec![
        UpgradeDefinition::new(
            "Vigor",
            vec![UpgradeEffect::MaxHp {
                amount: 20.0,
                proportional: false,
            }],
        ),
        UpgradeDefinition::new("Haste", vec![UpgradeEffect::SeekSpeed(1.0)]),
    ]);

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(tuning)
        .insert_resource(pool)
        .insert_resource(GameRng::from_seed(11))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(250)))
        .add_plugins(GameplayPlugin)
        .init_resource::<Seen>()
        .add_systems(Last, record);
    app.update();
    app
}

fn flat_curve() -> ProgressionTrack {
    ProgressionTrack::new(XpCurve {
        base: 10.0,
        growth: 1.0,
    })
}

/// Player whose pure phase lasts `interval` seconds, with 10 XP per level on both tracks
fn spawn_player(app: &mut App, interval: f32) -> Entity {
    app.world_mut()
        .spawn((
            Player,
            Transform::default(),
            Health::new(100.0),
            PlayerCorruption::new(interval, 100.0),
            PureXp(flat_curve()),
            CorruptXp(flat_curve()),
        ))
        .id()
}

/// Kill a fresh victim on behalf of `killer`
fn kill_for(app: &mut App, killer: Entity, drop: XpDrop) {
    let victim = app
        .world_mut()
        .spawn((Transform::default(), Health::new(1.0), drop))
        .id();
    app.world_mut()
        .send_event(DamageRequest::new(victim, 5.0, Some(killer)));
    app.update();
}

fn xp_drop(pure: f32, corrupt: f32) -> XpDrop {
    XpDrop { pure, corrupt }
}

#[test]
fn test_kill_xp_follows_killer_phase() {
    let mut app = test_app();
    let pure_player = spawn_player(&mut app, 100.0);
    let corrupt_player = spawn_player(&mut app, 0.01);
    app.update();
    assert!(app
        .world()
        .get::<PlayerCorruption>(corrupt_player)
        .is_some_and(|c| c.is_corrupted()));

    kill_for(&mut app, pure_player, xp_drop(3.0, 7.0));
    kill_for(&mut app, corrupt_player, xp_drop(3.0, 7.0));

    let world = app.world();
    assert_eq!(world.get::<PureXp>(pure_player).map(|t| t.xp()), Some(3.0));
    assert_eq!(world.get::<CorruptXp>(pure_player).map(|t| t.xp()), Some(0.0));
    assert_eq!(world.get::<PureXp>(corrupt_player).map(|t| t.xp()), Some(0.0));
    assert_eq!(world.get::<CorruptXp>(corrupt_player).map(|t| t.xp()), Some(7.0));
}

#[test]
fn test_kill_without_xp_components_is_ignored() {
    let mut app = test_app();
    let bystander = app.world_mut().spawn(Transform::default()).id();

    kill_for(&mut app, bystander, xp_drop(5.0, 5.0));

    assert!(app.world().resource::<Seen>().level_ups.is_empty());
}

#[test]
fn test_multi_level_grant_reports_each_level() {
    let mut app = test_app();
    let player = spawn_player(&mut app, 100.0);

    kill_for(&mut app, player, xp_drop(25.0, 0.0));

    let seen = app.world().resource::<Seen>();
    assert_eq!(seen.level_ups, vec![(Track::Pure, 2), (Track::Pure, 3)]);
    assert!(seen.upgrades.is_empty(), "Pure levels don't grant upgrades by default");
    assert_eq!(app.world().get::<PureXp>(player).map(|t| t.xp()), Some(5.0));
}

#[test]
fn test_upgrade_every_third_corrupt_level() {
    let mut app = test_app();
    let player = spawn_player(&mut app, 0.01);
    app.update();

    // Levels 2 to 5 at once: only level 3 qualifies
    kill_for(&mut app, player, xp_drop(0.0, 40.0));
    let upgrades = &app.world().resource::<Seen>().upgrades;
    assert_eq!(upgrades.len(), 1);
    assert_eq!(upgrades[0].level, 3);
    assert_eq!(upgrades[0].player, player);

    // Level 5 -> 6: exactly one more
    kill_for(&mut app, player, xp_drop(0.0, 10.0));
    let levels: Vec<u32> = app
        .world()
        .resource::<Seen>()
        .upgrades
        .iter()
        .map(|u| u.level)
        .collect();
    assert_eq!(levels, vec![3, 6]);
}

#[test]
fn test_toasts_play_in_order_on_real_time() {
    let mut app = test_app();
    let player = spawn_player(&mut app, 0.01);
    app.update();

    kill_for(&mut app, player, xp_drop(0.0, 30.0));
    kill_for(&mut app, player, xp_drop(0.0, 30.0));

    let titles: Vec<String> = app
        .world()
        .resource::<Seen>()
        .upgrades
        .iter()
        .map(|u| u.title.clone())
        .collect();
    assert_eq!(titles.len(), 2);
    assert_eq!(app.world().resource::<ToastBoard>().shown, titles[..1]);

    // Game time stops; the toast loop keeps going
    app.world_mut().resource_mut::<SimulationSpeed>().pause();
    app.update();
    app.update();
    assert_eq!(app.world().resource::<ToastBoard>().shown.len(), 1);

    app.update();
    let board = app.world().resource::<ToastBoard>();
    assert_eq!(board.shown, titles, "Second toast after the first one's second");
    assert_eq!(
        board.visible.as_ref().map(|card| card.title.clone()),
        Some(titles[1].clone())
    );
}

#[test]
fn test_max_hp_upgrade_reaches_player() {
    let mut app = test_app();
    app.insert_resource(UpgradePool::new(vec![UpgradeDefinition::new(
        "Vigor",
        vec![UpgradeEffect::MaxHp {
            amount: 20.0,
            proportional: false,
        }],
    )]));
    let player = spawn_player(&mut app, 0.01);
    app.update();

    kill_for(&mut app, player, xp_drop(0.0, 20.0));

    let health = app.world().get::<Health>(player);
    assert_eq!(health.map(|h| (h.current(), h.max())), Some((100.0, 120.0)));
}
