//! Boid Flock - GPU-accelerated multi-species boids flocking simulation.
//!
//! - GPU-accelerated spatial hashing and flocking using wgpu compute shaders
//! - Nine boundary topologies, from a flat plane to the projective plane
//! - Per-species-pair interaction behaviors layered on Reynolds flocking

use anyhow::Result;
use clap::Parser;

use boid_flock::Simulation;

/// Boid Flock - GPU-accelerated multi-species boids flocking simulation.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Resets application configuration to defaults on startup.
    #[arg(long)]
    reset_config: bool,

    /// Maximum number of boids to simulate.
    #[arg(long)]
    max_boids: Option<u32>,

    /// Enable or disable vsync.
    #[arg(long)]
    vsync: Option<bool>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match Simulation::run(cli.reset_config, cli.max_boids, cli.vsync) {
        Ok(Some(err)) => {
            log::error!("{err}");
            if let Some(code) = err.exit_code() {
                std::process::exit(code);
            }
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => Err(e),
    }
}
