//! Corruption cycle
//!
//! A two-phase countdown advanced once per tick: Pure for `interval` seconds, then
//! Corrupted for `duration` seconds, forever. The cycle only reports flips; the owner
//! applies the side effects.

use serde::{Deserialize, Serialize};

/// Lower bound for both phase lengths, so a zero config can't flip every tick at 0 s.
pub const MIN_PHASE_SECS: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Pure,
    Corrupted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorruptionCycle {
    interval: f32,
    duration: f32,
    phase: Phase,
    phase_total: f32,
    phase_remaining: f32,
}

impl CorruptionCycle {
    /// Start in a fresh Pure phase.
    pub fn new(interval: f32, duration: f32) -> Self {
        let mut cycle = Self {
            interval,
            duration,
            phase: Phase::Pure,
            phase_total: 0.0,
            phase_remaining: 0.0,
        };
        cycle.restart();
        cycle
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_corrupted(&self) -> bool {
        self.phase == Phase::Corrupted
    }

    pub fn phase_total(&self) -> f32 {
        self.phase_total
    }

    pub fn phase_remaining(&self) -> f32 {
        self.phase_remaining
    }

    /// Fraction of the current phase still to run, in [0, 1]
    pub fn fraction_remaining(&self) -> f32 {
        self.phase_remaining / self.phase_total
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// New Pure length, used from the next Pure phase on.
    pub fn set_interval(&mut self, interval: f32) {
        self.interval = interval;
    }

    /// New Corrupted length, used from the next Corrupted phase on.
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
    }

    /// Consume `dt` seconds. Returns the new phase if the current one ran out.
    /// At most one flip per call.
    pub fn advance(&mut self, dt: f32) -> Option<Phase> {
        self.phase_remaining = (self.phase_remaining - dt.max(0.0)).max(0.0);
        if self.phase_remaining > 0.0 {
            return None;
        }

        let next = match self.phase {
            Phase::Pure => Phase::Corrupted,
            Phase::Corrupted => Phase::Pure,
        };
        self.enter(next);
        Some(next)
    }

    /// Restart the Pure countdown at full length. Refused while corrupted.
    pub fn reset_countdown(&mut self) -> bool {
        if self.is_corrupted() {
            return false;
        }
        self.restart();
        true
    }

    /// Drop whatever phase is running and begin a fresh Pure phase.
    pub fn restart(&mut self) {
        self.enter(Phase::Pure);
    }

    fn enter(&mut self, phase: Phase) {
        let length = match phase {
            Phase::Pure => self.interval,
            Phase::Corrupted => self.duration,
        };
        self.phase = phase;
        self.phase_total = length.max(MIN_PHASE_SECS);
        self.phase_remaining = self.phase_total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_pure_with_full_interval() {
        let cycle = CorruptionCycle::new(20.0, 6.0);
        assert_eq!(cycle.phase(), Phase::Pure);
        assert_eq!(cycle.phase_total(), 20.0);
        assert_eq!(cycle.phase_remaining(), 20.0);
        assert_eq!(cycle.fraction_remaining(), 1.0);
    }

    #[test]
    fn test_flips_after_interval_then_duration() {
        let mut cycle = CorruptionCycle::new(1.0, 0.5);

        for _ in 0..3 {
            assert_eq!(cycle.advance(0.25), None);
        }
        assert_eq!(cycle.advance(0.25), Some(Phase::Corrupted));
        assert_eq!(cycle.phase_remaining(), 0.5);

        assert_eq!(cycle.advance(0.25), None);
        assert_eq!(cycle.advance(0.25), Some(Phase::Pure));
        assert_eq!(cycle.phase_remaining(), 1.0);
    }

    #[test]
    fn test_ten_cycles_alternate() {
        let (interval, duration, dt) = (2.0, 1.0, 0.25);
        let mut cycle = CorruptionCycle::new(interval, duration);
        let ticks_per_cycle = ((interval + duration) / dt) as usize;

        let mut flips = Vec::new();
        for _ in 0..ticks_per_cycle * 10 {
            if let Some(phase) = cycle.advance(dt) {
                flips.push(phase);
            }
        }

        assert_eq!(flips.len(), 20, "Two flips per cycle");
        for pair in flips.windows(2) {
            assert_ne!(pair[0], pair[1], "Phases must strictly alternate");
        }
        assert_eq!(flips[0], Phase::Corrupted);
        assert_eq!(cycle.phase(), Phase::Pure);
    }

    #[test]
    fn test_remaining_stays_in_bounds() {
        let mut cycle = CorruptionCycle::new(1.0, 1.0);
        cycle.advance(0.4);
        assert!(cycle.phase_remaining() >= 0.0 && cycle.phase_remaining() <= cycle.phase_total());
        cycle.advance(-5.0);
        assert!(
            cycle.phase_remaining() <= cycle.phase_total(),
            "Negative dt must not extend the phase"
        );
    }

    #[test]
    fn test_large_step_flips_once() {
        let mut cycle = CorruptionCycle::new(1.0, 1.0);
        assert_eq!(cycle.advance(10.0), Some(Phase::Corrupted));
        assert_eq!(cycle.phase_remaining(), 1.0, "Leftover time is discarded");
    }

    #[test]
    fn test_degenerate_lengths_are_floored() {
        let mut cycle = CorruptionCycle::new(0.0, -3.0);
        assert_eq!(cycle.phase_total(), MIN_PHASE_SECS);
        cycle.advance(MIN_PHASE_SECS);
        assert_eq!(cycle.phase(), Phase::Corrupted);
        assert_eq!(cycle.phase_total(), MIN_PHASE_SECS);
    }

    #[test]
    fn test_reset_countdown_mid_pure() {
        let mut cycle = CorruptionCycle::new(4.0, 1.0);
        cycle.advance(3.0);
        assert_eq!(cycle.phase_remaining(), 1.0);

        assert!(cycle.reset_countdown());
        assert_eq!(cycle.phase(), Phase::Pure);
        assert_eq!(cycle.phase_remaining(), 4.0);
    }

    #[test]
    fn test_reset_countdown_refused_while_corrupted() {
        let mut cycle = CorruptionCycle::new(1.0, 2.0);
        cycle.advance(1.0);
        cycle.advance(0.5);
        assert!(cycle.is_corrupted());

        assert!(!cycle.reset_countdown());
        assert!(cycle.is_corrupted());
        assert_eq!(cycle.phase_remaining(), 1.5);
    }

    #[test]
    fn test_new_lengths_apply_to_next_phase() {
        let mut cycle = CorruptionCycle::new(1.0, 1.0);
        cycle.set_duration(3.0);
        assert_eq!(cycle.phase_total(), 1.0);
        cycle.advance(1.0);
        assert_eq!(cycle.phase_total(), 3.0);
    }
}
