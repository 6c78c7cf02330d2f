//! Gameplay logging
//!
//! Records notable gameplay events with a timestamp for post-run analysis.

use bevy::prelude::*;
use serde::Serialize;

/// A single entry in the gameplay log
#[derive(Debug, Clone, Serialize)]
pub struct GameplayLogEntry {
    /// Scaled game time in seconds since the run started
    pub timestamp: f32,
    pub event_type: GameplayLogEventType,
    pub message: String,
}

/// Types of gameplay log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameplayLogEventType {
    Damage,
    Healing,
    Death,
    /// Corruption phase flips and ally-kill penalties
    Phase,
    Experience,
    Upgrade,
    /// Run start, end, scene requests
    MatchEvent,
}

/// The log resource storing all entries
#[derive(Resource, Default, Debug)]
pub struct GameplayLog {
    pub entries: Vec<GameplayLogEntry>,
    pub match_time: f32,
}

impl GameplayLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.match_time = 0.0;
    }

    pub fn log(&mut self, event_type: GameplayLogEventType, message: String) {
        self.entries.push(GameplayLogEntry {
            timestamp: self.match_time,
            event_type,
            message,
        });
    }

    pub fn filter_by_type(&self, event_type: GameplayLogEventType) -> Vec<&GameplayLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    pub fn count(&self, event_type: GameplayLogEventType) -> usize {
        self.entries.iter().filter(|e| e.event_type == event_type).count()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&GameplayLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }
}

/// Advance the log clock with scaled game time
pub fn advance_log_clock(time: Res<Time>, mut log: ResMut<GameplayLog>) {
    log.match_time += time.delta_secs();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_and_count() {
        let mut log = GameplayLog::default();
        log.log(GameplayLogEventType::Damage, "a".to_string());
        log.match_time = 1.5;
        log.log(GameplayLogEventType::Death, "b".to_string());
        log.log(GameplayLogEventType::Damage, "c".to_string());

        assert_eq!(log.count(GameplayLogEventType::Damage), 2);
        let deaths = log.filter_by_type(GameplayLogEventType::Death);
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0].timestamp, 1.5);
    }

    #[test]
    fn test_recent_keeps_order() {
        let mut log = GameplayLog::default();
        for i in 0..5 {
            log.log(GameplayLogEventType::MatchEvent, format!("{}", i));
        }
        let recent: Vec<&str> = log.recent(2).iter().map(|e| e.message.as_str()).collect();
        assert_eq!(recent, vec!["3", "4"]);
    }

    #[test]
    fn test_clear_resets_clock() {
        let mut log = GameplayLog::default();
        log.match_time = 9.0;
        log.log(GameplayLogEventType::MatchEvent, "x".to_string());
        log.clear();
        assert!(log.entries.is_empty());
        assert_eq!(log.match_time, 0.0);
    }
}
