//! Combat systems
//!
//! Resolve damage, heal and kill requests against health ledgers and mirror the
//! ledger's notifications as Bevy events.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::body::{PendingDespawn, Targetable, Velocity};
use super::events::*;
use super::health::{DamageOutcome, Health, Hit};
use super::log::{GameplayLog, GameplayLogEventType};

/// Writers for the health notifications, in delivery order.
#[derive(SystemParam)]
pub struct HealthSignals<'w> {
    hp_changed: EventWriter<'w, HpChangedEvent>,
    killed_by: EventWriter<'w, KilledByEvent>,
    deaths: EventWriter<'w, DeathEvent>,
}

impl HealthSignals<'_> {
    pub fn hp_changed(&mut self, entity: Entity, health: &Health) {
        self.hp_changed.send(HpChangedEvent {
            entity,
            current: health.current(),
            max: health.max(),
        });
    }

    /// Publish the consequences of a damage call: knockback, HP change and, on a lethal
    /// hit, killed-by then death. Returns true if the hit landed.
    pub fn resolve(
        &mut self,
        commands: &mut Commands,
        entity: Entity,
        health: &Health,
        outcome: DamageOutcome,
        velocity: Option<&mut Velocity>,
    ) -> bool {
        let DamageOutcome::Applied {
            knockback, lethal, ..
        } = outcome
        else {
            return false;
        };

        if knockback != Vec2::ZERO {
            if let Some(velocity) = velocity {
                velocity.apply_impulse(knockback);
            }
        }

        self.hp_changed(entity, health);

        if lethal {
            if health.disable_interaction_on_death {
                commands.entity(entity).remove::<Targetable>();
            }
            let killer = health.last_damage_source();
            self.killed_by.send(KilledByEvent {
                victim: entity,
                killer,
            });
            self.deaths.send(DeathEvent {
                victim: entity,
                killer,
            });
            if health.destroy_on_death {
                commands.entity(entity).insert(PendingDespawn);
            }
        }
        true
    }
}

/// Display name for log messages
pub fn describe(entity: Entity, names: &Query<&Name>) -> String {
    names
        .get(entity)
        .map(|n| n.as_str().to_string())
        .unwrap_or_else(|_| format!("{}", entity))
}

/// Apply queued damage requests
pub fn apply_damage_requests(
    mut commands: Commands,
    time: Res<Time>,
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<(&mut Health, Option<&mut Velocity>)>,
    mut signals: HealthSignals,
    mut log: ResMut<GameplayLog>,
    names: Query<&Name>,
) {
    let now = time.elapsed_secs();
    for request in requests.read() {
        let Ok((mut health, velocity)) = targets.get_mut(request.target) else {
            continue;
        };

        let hit = Hit {
            amount: request.amount,
            knockback: request.knockback,
            instigator: request.instigator,
        };
        let outcome = if request.forced {
            health.force_damage(&hit, now)
        } else {
            health.take_damage(&hit, now)
        };

        if let DamageOutcome::Applied { dealt, lethal, .. } = outcome {
            let source = request
                .instigator
                .map(|e| describe(e, &names))
                .unwrap_or_else(|| "Environment".to_string());
            log.log(
                GameplayLogEventType::Damage,
                format!(
                    "{} hits {} for {:.0}",
                    source,
                    describe(request.target, &names),
                    dealt
                ),
            );
            if lethal {
                log.log(
                    GameplayLogEventType::Death,
                    format!("{} has been slain by {}", describe(request.target, &names), source),
                );
            }
        }

        signals.resolve(
            &mut commands,
            request.target,
            &health,
            outcome,
            velocity.map(|v| v.into_inner()),
        );
    }
}

/// Apply queued heal requests
pub fn apply_heal_requests(
    mut requests: EventReader<HealRequest>,
    mut targets: Query<&mut Health>,
    mut signals: HealthSignals,
    mut log: ResMut<GameplayLog>,
    names: Query<&Name>,
) {
    for request in requests.read() {
        let Ok(mut health) = targets.get_mut(request.target) else {
            continue;
        };
        let before = health.current();
        if health.heal(request.amount) {
            signals.hp_changed(request.target, &health);
            log.log(
                GameplayLogEventType::Healing,
                format!(
                    "{} heals for {:.0}",
                    describe(request.target, &names),
                    health.current() - before
                ),
            );
        }
    }
}

/// Apply queued kill requests
pub fn apply_kill_requests(
    mut commands: Commands,
    time: Res<Time>,
    mut requests: EventReader<KillRequest>,
    mut targets: Query<(&mut Health, Option<&mut Velocity>)>,
    mut signals: HealthSignals,
    mut log: ResMut<GameplayLog>,
    names: Query<&Name>,
) {
    let now = time.elapsed_secs();
    for request in requests.read() {
        let Ok((mut health, velocity)) = targets.get_mut(request.target) else {
            continue;
        };
        let outcome = health.kill(now);
        if outcome.is_lethal() {
            log.log(
                GameplayLogEventType::Death,
                format!("{} was killed", describe(request.target, &names)),
            );
        }
        signals.resolve(
            &mut commands,
            request.target,
            &health,
            outcome,
            velocity.map(|v| v.into_inner()),
        );
    }
}
