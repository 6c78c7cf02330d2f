//! Random upgrade selection
//!
//! Uniform draw over the pool. With repeat avoidance on, the previous pick is redrawn up
//! to [`MAX_DRAWS`] times; the last draw is accepted even if it repeats.

use bevy::prelude::*;

use crate::rng::GameRng;
use crate::tuning::GameplayTuning;

/// Draw budget when trying to avoid the previous pick.
pub const MAX_DRAWS: usize = 8;

#[derive(Resource, Debug)]
pub struct UpgradePicker {
    pub avoid_repeat: bool,
    last: Option<usize>,
}

impl UpgradePicker {
    pub fn new(avoid_repeat: bool) -> Self {
        Self {
            avoid_repeat,
            last: None,
        }
    }

    /// Index of the previous pick, if any
    pub fn last(&self) -> Option<usize> {
        self.last
    }

    /// Pick an index in `[0, len)` from draws produced by `draw(len)`. None for an empty pool.
    pub fn pick_with(&mut self, len: usize, mut draw: impl FnMut(usize) -> usize) -> Option<usize> {
        if len == 0 {
            return None;
        }

        let pick = match self.last {
            Some(last) if self.avoid_repeat && len > 1 => {
                let mut pick = last;
                let mut draws = 0;
                while draws < MAX_DRAWS && pick == last {
                    pick = draw(len) % len;
                    draws += 1;
                }
                pick
            }
            _ => draw(len) % len,
        };

        self.last = Some(pick);
        Some(pick)
    }

    pub fn pick(&mut self, len: usize, rng: &mut GameRng) -> Option<usize> {
        self.pick_with(len, |n| rng.index(n))
    }
}

impl FromWorld for UpgradePicker {
    fn from_world(world: &mut World) -> Self {
        let avoid_repeat = world
            .get_resource::<GameplayTuning>()
            .map_or(true, |t| t.upgrades.avoid_repeat_back_to_back);
        Self::new(avoid_repeat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pool_picks_nothing() {
        let mut picker = UpgradePicker::new(true);
        assert_eq!(picker.pick_with(0, |_| 0), None);
        assert_eq!(picker.last(), None);
    }

    #[test]
    fn test_redraws_until_different() {
        let mut picker = UpgradePicker::new(true);
        assert_eq!(picker.pick_with(3, |_| 1), Some(1));

        let mut script = [1, 1, 2].into_iter();
        let mut draws = 0;
        let pick = picker.pick_with(3, |_| {
            draws += 1;
            script.next().unwrap_or(0)
        });
        assert_eq!(pick, Some(2));
        assert_eq!(draws, 3);
    }

    #[test]
    fn test_accepts_repeat_after_budget() {
        let mut picker = UpgradePicker::new(true);
        picker.pick_with(4, |_| 0);

        let mut draws = 0;
        let pick = picker.pick_with(4, |_| {
            draws += 1;
            0
        });
        assert_eq!(pick, Some(0));
        assert_eq!(draws, MAX_DRAWS);
    }

    #[test]
    fn test_single_entry_pool_repeats() {
        let mut picker = UpgradePicker::new(true);
        assert_eq!(picker.pick_with(1, |_| 0), Some(0));
        assert_eq!(picker.pick_with(1, |_| 0), Some(0));
    }

    #[test]
    fn test_without_avoidance_one_draw() {
        let mut picker = UpgradePicker::new(false);
        picker.pick_with(3, |_| 2);
        let mut draws = 0;
        picker.pick_with(3, |_| {
            draws += 1;
            2
        });
        assert_eq!(draws, 1);
    }

    #[test]
    fn test_repeats_are_rare_with_rng() {
        let mut rng = GameRng::from_seed(1234);
        let mut picker = UpgradePicker::new(true);
        let mut previous = picker.pick(2, &mut rng);
        let mut repeats = 0;
        for _ in 0..2000 {
            let pick = picker.pick(2, &mut rng);
            if pick == previous {
                repeats += 1;
            }
            previous = pick;
        }
        // 8 draws on a pool of 2 repeat with probability 1/256
        assert!(repeats < 40, "Too many repeats: {}", repeats);
    }
}
