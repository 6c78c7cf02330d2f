//! corruptsim - Dual-progression corruption gameplay core
//!
//! A player alternates between a pure phase and a timed, automatic corrupted phase. Each
//! phase feeds its own experience track, and corrupt level-ups unlock random upgrades.
//!
//! This library exposes the gameplay modules for the headless runner and for tests.

pub mod cli;
pub mod combat;
pub mod corruption;
pub mod gameplay;
pub mod headless;
pub mod listeners;
pub mod progression;
pub mod rng;
pub mod tuning;
pub mod upgrades;
pub mod victory;

// Re-export commonly used types
pub use combat::health::{Health, Hit};
pub use combat::log::{GameplayLog, GameplayLogEventType};
pub use corruption::PlayerCorruption;
pub use gameplay::{GameplayPhase, GameplayPlugin};
pub use headless::HeadlessRunConfig;
pub use tuning::GameplayTuning;
