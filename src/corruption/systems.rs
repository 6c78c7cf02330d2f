//! Corruption systems
//!
//! Advance each player's cycle, apply the phase side effects, steer the corrupted player
//! and collect the ally-kill penalty.

use bevy::prelude::*;

use super::aura::DamageAura;
use super::cycle::Phase;
use super::overrides::{AuxBehavior, BehaviorOverride, BehaviorSwitch};
use super::seek::{find_seek_target, seek_velocity};
use super::{
    AllyKillPenalized, AllyKilledByPlayer, CorruptionPhaseChanged, PlayerCorruption,
    ResetCorruptionCountdown, SetCorruptionActive,
};
use crate::combat::body::{CollisionLayers, Targetable, Velocity};
use crate::combat::health::{Health, Hit};
use crate::combat::log::{GameplayLog, GameplayLogEventType};
use crate::combat::systems::{describe, HealthSignals};

/// Components touched by a phase transition
pub type CorruptionBody<'a> = (
    Entity,
    &'a mut PlayerCorruption,
    Option<&'a mut Health>,
    Option<&'a mut Velocity>,
    Option<&'a mut DamageAura>,
);

/// Pure -> Corrupted: god mode, disable behaviors, aura on. Seeking starts on its own.
pub fn enter_corruption(
    corruption: &mut PlayerCorruption,
    health: Option<&mut Health>,
    aura: Option<&mut DamageAura>,
    behaviors: &mut impl BehaviorSwitch,
) {
    if let Some(health) = health {
        health.set_god_mode(true);
    }
    if let Some(previous) = corruption.overrides.take() {
        previous.release(behaviors);
    }
    corruption.overrides = Some(BehaviorOverride::acquire(
        &corruption.disable_while_corrupted,
        behaviors,
    ));
    if let Some(aura) = aura {
        aura.set_active(true);
    }
}

/// Corrupted -> Pure: stop, aura off, restore behaviors, god mode off.
pub fn exit_corruption(
    corruption: &mut PlayerCorruption,
    health: Option<&mut Health>,
    velocity: Option<&mut Velocity>,
    aura: Option<&mut DamageAura>,
    behaviors: &mut impl BehaviorSwitch,
) {
    if let Some(velocity) = velocity {
        velocity.0 = Vec2::ZERO;
    }
    if let Some(aura) = aura {
        aura.set_active(false);
    }
    if let Some(guard) = corruption.overrides.take() {
        guard.release(behaviors);
    }
    if let Some(health) = health {
        health.set_god_mode(false);
    }
}

fn log_phase(log: &mut GameplayLog, name: String, corrupted: bool) {
    let message = if corrupted {
        format!("{} succumbs to corruption", name)
    } else {
        format!("{} is pure again", name)
    };
    log.log(GameplayLogEventType::Phase, message);
}

/// Tick every enabled cycle by scaled game time and apply flips.
pub fn advance_corruption_cycles(
    time: Res<Time>,
    mut players: Query<CorruptionBody>,
    mut behaviors: Query<&mut AuxBehavior>,
    mut phase_events: EventWriter<CorruptionPhaseChanged>,
    mut log: ResMut<GameplayLog>,
    names: Query<&Name>,
) {
    let dt = time.delta_secs();
    for (player, mut corruption, mut health, mut velocity, mut aura) in players.iter_mut() {
        if !corruption.enabled {
            continue;
        }
        let Some(phase) = corruption.cycle.advance(dt) else {
            continue;
        };

        let corrupted = phase == Phase::Corrupted;
        if corrupted {
            enter_corruption(
                &mut corruption,
                health.as_deref_mut(),
                aura.as_deref_mut(),
                &mut behaviors,
            );
        } else {
            exit_corruption(
                &mut corruption,
                health.as_deref_mut(),
                velocity.as_deref_mut(),
                aura.as_deref_mut(),
                &mut behaviors,
            );
        }

        debug!("{:?} entered {:?}", player, phase);
        log_phase(&mut log, describe(player, &names), corrupted);
        phase_events.send(CorruptionPhaseChanged { player, corrupted });
    }
}

pub fn handle_countdown_resets(
    mut requests: EventReader<ResetCorruptionCountdown>,
    mut players: Query<&mut PlayerCorruption>,
    mut phase_events: EventWriter<CorruptionPhaseChanged>,
) {
    for request in requests.read() {
        let Ok(mut corruption) = players.get_mut(request.player) else {
            continue;
        };
        if corruption.cycle.reset_countdown() {
            phase_events.send(CorruptionPhaseChanged {
                player: request.player,
                corrupted: false,
            });
        } else {
            debug!("Countdown reset ignored for {:?}: corrupted", request.player);
        }
    }
}

/// Enable or disable corruption machines. Disabling mid-corruption runs the exit effects;
/// enabling starts over from a fresh pure phase.
pub fn handle_corruption_toggles(
    mut requests: EventReader<SetCorruptionActive>,
    mut players: Query<CorruptionBody>,
    mut behaviors: Query<&mut AuxBehavior>,
    mut phase_events: EventWriter<CorruptionPhaseChanged>,
) {
    for request in requests.read() {
        let Ok((player, mut corruption, mut health, mut velocity, mut aura)) =
            players.get_mut(request.player)
        else {
            continue;
        };
        if corruption.enabled == request.active {
            continue;
        }

        corruption.enabled = request.active;
        let was_corrupted = corruption.is_corrupted();
        corruption.cycle.restart();
        if !request.active && was_corrupted {
            exit_corruption(
                &mut corruption,
                health.as_deref_mut(),
                velocity.as_deref_mut(),
                aura.as_deref_mut(),
                &mut behaviors,
            );
        }
        if request.active || was_corrupted {
            phase_events.send(CorruptionPhaseChanged {
                player,
                corrupted: false,
            });
        }
        info!(
            "Corruption {} for {:?}",
            if request.active { "enabled" } else { "disabled" },
            player
        );
    }
}

/// Steer each corrupted player toward the nearest living target.
pub fn drive_auto_seek(
    mut players: Query<(Entity, &PlayerCorruption, &Transform, &mut Velocity)>,
    targets: Query<(Entity, &Transform, &CollisionLayers), With<Targetable>>,
    healths: Query<&Health>,
) {
    for (player, corruption, transform, mut velocity) in players.iter_mut() {
        if !corruption.enabled || !corruption.is_corrupted() {
            continue;
        }
        let origin = transform.translation.truncate();
        let target = find_seek_target(
            &targets,
            origin,
            corruption.seek_radius,
            corruption.seek_mask,
            player,
            |entity| healths.get(entity).map_or(true, Health::is_alive),
        );
        velocity.0 = seek_velocity(origin, target.map(|(_, p)| p), corruption.auto_speed);
    }
}

/// A corrupted player pays `ally_kill_penalty` HP, through god mode's rules, per ally slain.
#[allow(clippy::too_many_arguments)]
pub fn punish_ally_kills(
    mut commands: Commands,
    time: Res<Time>,
    mut kills: EventReader<AllyKilledByPlayer>,
    mut players: Query<(&PlayerCorruption, Option<&mut Health>, Option<&mut Velocity>)>,
    mut signals: HealthSignals,
    mut penalized: EventWriter<AllyKillPenalized>,
    mut log: ResMut<GameplayLog>,
    names: Query<&Name>,
) {
    let now = time.elapsed_secs();
    for kill in kills.read() {
        let Ok((corruption, health, velocity)) = players.get_mut(kill.player) else {
            continue;
        };
        let Some(penalty) = corruption.ally_kill_penalty_due() else {
            continue;
        };

        if let Some(mut health) = health {
            let outcome = health.force_damage(&Hit::new(penalty).by(kill.ally), now);
            if !outcome.is_applied() {
                debug!("Ally-kill penalty on {:?} absorbed: {:?}", kill.player, outcome);
            }
            signals.resolve(
                &mut commands,
                kill.player,
                &health,
                outcome,
                velocity.map(|v| v.into_inner()),
            );
        }

        log.log(
            GameplayLogEventType::Damage,
            format!(
                "{} is punished for slaying {} ({:.0})",
                describe(kill.player, &names),
                describe(kill.ally, &names),
                penalty
            ),
        );
        penalized.send(AllyKillPenalized {
            player: kill.player,
            ally: kill.ally,
            penalty,
        });
    }
}

/// Teardown: a player losing its corruption component mid-phase gets everything back.
pub fn restore_on_corruption_removed(
    trigger: Trigger<OnRemove, PlayerCorruption>,
    mut players: Query<CorruptionBody>,
    mut behaviors: Query<&mut AuxBehavior>,
    mut phase_events: EventWriter<CorruptionPhaseChanged>,
) {
    let Ok((player, mut corruption, mut health, mut velocity, mut aura)) =
        players.get_mut(trigger.entity())
    else {
        return;
    };
    let was_corrupted = corruption.is_corrupted();
    corruption.cycle.restart();
    if !was_corrupted && corruption.overrides.is_none() {
        return;
    }

    exit_corruption(
        &mut corruption,
        health.as_deref_mut(),
        velocity.as_deref_mut(),
        aura.as_deref_mut(),
        &mut behaviors,
    );
    if was_corrupted {
        phase_events.send(CorruptionPhaseChanged {
            player,
            corrupted: false,
        });
    }
}
