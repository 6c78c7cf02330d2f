//! corruptsim - dual-progression corruption gameplay simulation
//!
//! Runs a headless simulation from a JSON config and writes a run summary.

use std::process::ExitCode;

use corruptsim::cli;
use corruptsim::headless::{run_headless, HeadlessRunConfig};

fn main() -> ExitCode {
    let args = cli::parse_args();

    let Some(config_path) = args.headless else {
        eprintln!("Nothing to do: pass --headless <CONFIG_FILE> to run a simulation");
        return ExitCode::FAILURE;
    };

    let mut config = match HeadlessRunConfig::load_from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Command-line overrides
    if let Some(output) = args.output {
        config.output_path = Some(output.to_string_lossy().into_owned());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid config: {}", e);
        return ExitCode::FAILURE;
    }

    match run_headless(config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Headless run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
