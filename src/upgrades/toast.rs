//! Upgrade notifications
//!
//! Applied upgrades are announced one at a time, in order, for a fixed span of real time.
//! [`ToastQueue`] owns the ordering and timing; anything implementing [`ToastSurface`]
//! does the displaying.

use bevy::prelude::*;
use std::collections::VecDeque;

use super::config::UpgradeDefinition;
use crate::tuning::GameplayTuning;

/// Title shown for upgrades without one.
pub const FALLBACK_TITLE: &str = "Corrupt upgrade";

/// Display collaborator for toasts.
pub trait ToastSurface {
    fn show(&mut self, title: &str, description: &str, icon: Option<&str>);
    fn hide(&mut self);
}

/// A toast as displayed
#[derive(Debug, Clone, PartialEq)]
pub struct ToastCard {
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
}

/// In-crate toast surface: the visible card plus a history of shown titles.
#[derive(Resource, Debug, Default)]
pub struct ToastBoard {
    pub visible: Option<ToastCard>,
    pub shown: Vec<String>,
}

impl ToastSurface for ToastBoard {
    fn show(&mut self, title: &str, description: &str, icon: Option<&str>) {
        self.visible = Some(ToastCard {
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.map(str::to_string),
        });
        self.shown.push(title.to_string());
    }

    fn hide(&mut self) {
        self.visible = None;
    }
}

/// Single-consumer FIFO of pending toasts. Times are real (unscaled) seconds.
#[derive(Resource, Debug)]
pub struct ToastQueue {
    pub display_seconds: f32,
    pending: VecDeque<UpgradeDefinition>,
    hide_at: Option<f32>,
}

impl FromWorld for ToastQueue {
    fn from_world(world: &mut World) -> Self {
        let seconds = world
            .get_resource::<GameplayTuning>()
            .map_or(2.5, |t| t.upgrades.toast_seconds);
        Self::new(seconds)
    }
}

impl ToastQueue {
    pub fn new(display_seconds: f32) -> Self {
        Self {
            display_seconds,
            pending: VecDeque::new(),
            hide_at: None,
        }
    }

    pub fn is_showing(&self) -> bool {
        self.hide_at.is_some()
    }

    /// Toasts waiting behind the one on screen
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Queue a toast. Shows it at once if nothing is on screen.
    pub fn enqueue(&mut self, upgrade: UpgradeDefinition, now: f32, surface: &mut impl ToastSurface) {
        self.pending.push_back(upgrade);
        if !self.is_showing() {
            self.show_next(now, surface);
        }
    }

    /// Hide the current toast once its time is up and move on to the next one.
    pub fn update(&mut self, now: f32, surface: &mut impl ToastSurface) {
        let Some(hide_at) = self.hide_at else {
            return;
        };
        if now < hide_at {
            return;
        }
        surface.hide();
        self.hide_at = None;
        self.show_next(now, surface);
    }

    /// Drop everything, hiding the current toast.
    pub fn clear(&mut self, surface: &mut impl ToastSurface) {
        self.pending.clear();
        if self.hide_at.take().is_some() {
            surface.hide();
        }
    }

    fn show_next(&mut self, now: f32, surface: &mut impl ToastSurface) {
        let Some(upgrade) = self.pending.pop_front() else {
            return;
        };
        let title = if upgrade.title.is_empty() {
            FALLBACK_TITLE
        } else {
            upgrade.title.as_str()
        };
        surface.show(title, &upgrade.description, upgrade.icon.as_deref());
        self.hide_at = Some(now + self.display_seconds.max(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upgrade(title: &str) -> UpgradeDefinition {
        UpgradeDefinition::new(title, Vec::new())
    }

    #[test]
    fn test_idle_enqueue_shows_immediately() {
        let mut queue = ToastQueue::new(2.5);
        let mut board = ToastBoard::default();

        queue.enqueue(upgrade("Fangs"), 0.0, &mut board);
        assert!(queue.is_showing());
        assert_eq!(board.visible.as_ref().map(|c| c.title.as_str()), Some("Fangs"));
    }

    #[test]
    fn test_fifo_one_at_a_time() {
        let mut queue = ToastQueue::new(2.0);
        let mut board = ToastBoard::default();

        queue.enqueue(upgrade("A"), 0.0, &mut board);
        queue.enqueue(upgrade("B"), 0.5, &mut board);
        queue.enqueue(upgrade("C"), 1.0, &mut board);
        assert_eq!(board.shown, vec!["A"], "Enqueue while showing only queues");
        assert_eq!(queue.pending(), 2);

        queue.update(1.9, &mut board);
        assert_eq!(board.shown, vec!["A"]);

        queue.update(2.0, &mut board);
        assert_eq!(board.shown, vec!["A", "B"]);

        queue.update(4.0, &mut board);
        assert_eq!(board.shown, vec!["A", "B", "C"]);

        queue.update(6.0, &mut board);
        assert!(board.visible.is_none());
        assert!(!queue.is_showing());
    }

    #[test]
    fn test_empty_title_falls_back() {
        let mut queue = ToastQueue::new(1.0);
        let mut board = ToastBoard::default();
        queue.enqueue(upgrade(""), 0.0, &mut board);
        assert_eq!(board.shown, vec![FALLBACK_TITLE]);
    }

    #[test]
    fn test_clear_hides_current() {
        let mut queue = ToastQueue::new(1.0);
        let mut board = ToastBoard::default();
        queue.enqueue(upgrade("A"), 0.0, &mut board);
        queue.enqueue(upgrade("B"), 0.0, &mut board);

        queue.clear(&mut board);
        assert!(board.visible.is_none());
        assert_eq!(queue.pending(), 0);
        queue.update(5.0, &mut board);
        assert_eq!(board.shown, vec!["A"]);
    }
}
