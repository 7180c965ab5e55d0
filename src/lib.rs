//! # Boid Flock
//!
//! A GPU-accelerated multi-species boids flocking simulation.
//!
//! ## Features
//!
//! - **GPU compute**: spatial-hash neighbor binning and Reynolds flocking
//!   rules run entirely on the GPU via wgpu compute shaders.
//! - **Multi-species interactions**: per-species-pair behaviors (avoid,
//!   pursue, attract, mirror, orbit) layered on top of flocking.
//! - **Nine boundary topologies**: plane, cylinders, torus, Möbius strips,
//!   Klein bottles, and the projective plane.
//!
//! ## Example
//!
//! ```no_run
//! use boid_flock::app::Simulation;
//!
//! fn main() -> anyhow::Result<()> {
//!     Simulation::run(false, None, None)?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod renderer;
pub mod sim;
pub mod utils;

pub use app::Simulation;
pub use sim::{BoundaryMode, InteractionMatrix, SimulationConfig, SpeciesTable};
