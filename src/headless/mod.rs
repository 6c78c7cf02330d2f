//! Headless mode for automated runs
//!
//! Runs the gameplay simulation without any graphical output, suitable for balance
//! checks and automated testing.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- --headless run_config.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "enemies": 8,
//!   "allies": 2,
//!   "random_seed": 42,
//!   "victory_seconds": 90,
//!   "max_duration_secs": 120
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::HeadlessRunConfig;
pub use runner::{run_headless, simulate, RunEnd, RunSummary};
