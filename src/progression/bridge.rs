//! XP-on-kill bridge
//!
//! When something carrying an [`XpDrop`] dies, its killer earns XP on the track matching
//! the killer's corruption phase at that moment.

use bevy::prelude::*;

use super::track::{CorruptXp, LevelUpEvent, LevelsGained, PureXp};
use super::Track;
use crate::combat::events::DeathEvent;
use crate::combat::log::{GameplayLog, GameplayLogEventType};
use crate::combat::systems::describe;
use crate::corruption::{AllyKilledByPlayer, PlayerCorruption};

/// The controlled character. Never drops XP.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Friendly unit. Killing one while corrupted costs HP.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Ally;

/// XP granted to whoever lands the killing blow
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct XpDrop {
    pub pure: f32,
    pub corrupt: f32,
}

impl Default for XpDrop {
    fn default() -> Self {
        Self {
            pure: 5.0,
            corrupt: 5.0,
        }
    }
}

/// Track and amount a kill pays out, given the killer's phase.
pub fn route_kill_xp(drop: &XpDrop, killer_corrupted: bool) -> (Track, f32) {
    if killer_corrupted {
        (Track::Corrupt, drop.corrupt)
    } else {
        (Track::Pure, drop.pure)
    }
}

/// Route kill XP for every death this tick and report ally kills.
#[allow(clippy::too_many_arguments)]
pub fn grant_kill_xp(
    mut deaths: EventReader<DeathEvent>,
    victims: Query<(Option<&XpDrop>, Has<Player>, Has<Ally>)>,
    corruption: Query<&PlayerCorruption>,
    mut pure_tracks: Query<&mut PureXp>,
    mut corrupt_tracks: Query<&mut CorruptXp>,
    mut level_ups: EventWriter<LevelUpEvent>,
    mut ally_kills: EventWriter<AllyKilledByPlayer>,
    mut log: ResMut<GameplayLog>,
    names: Query<&Name>,
) {
    for death in deaths.read() {
        let Some(killer) = death.killer else {
            continue;
        };
        let Ok((drop, is_player, is_ally)) = victims.get(death.victim) else {
            continue;
        };
        if is_player {
            continue;
        }

        let killer_corruption = corruption.get(killer).ok();
        if is_ally && killer_corruption.is_some() {
            ally_kills.send(AllyKilledByPlayer {
                player: killer,
                ally: death.victim,
            });
        }

        let Some(drop) = drop else {
            continue;
        };
        let corrupted = killer_corruption.is_some_and(PlayerCorruption::is_corrupted);
        let (track, amount) = route_kill_xp(drop, corrupted);

        let gained: LevelsGained = match track {
            Track::Pure => match pure_tracks.get_mut(killer) {
                Ok(mut xp) => xp.add_xp(amount),
                Err(_) => continue,
            },
            Track::Corrupt => match corrupt_tracks.get_mut(killer) {
                Ok(mut xp) => xp.add_xp(amount),
                Err(_) => continue,
            },
        };

        log.log(
            GameplayLogEventType::Experience,
            format!(
                "{} gains {:.0} {} XP from {}",
                describe(killer, &names),
                amount,
                track.label(),
                describe(death.victim, &names)
            ),
        );
        for level in gained {
            info!("{:?} reached {} level {}", killer, track.label(), level);
            level_ups.send(LevelUpEvent {
                entity: killer,
                track,
                level,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_by_phase() {
        let drop = XpDrop {
            pure: 3.0,
            corrupt: 7.0,
        };
        assert_eq!(route_kill_xp(&drop, false), (Track::Pure, 3.0));
        assert_eq!(route_kill_xp(&drop, true), (Track::Corrupt, 7.0));
    }
}
