//! Command-line interface for corruptsim

use clap::Parser;
use std::path::PathBuf;

/// Corruption cycle gameplay simulator
#[derive(Parser, Debug)]
#[command(name = "corruptsim")]
#[command(about = "Corruption cycle gameplay simulator")]
#[command(version)]
pub struct Args {
    /// Run headless with the specified JSON config file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Output path for the run summary
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum run duration in seconds, overriding the config file
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed, overriding the config file
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
