//! Core data model and CPU-side reference algorithms for the boid simulation.
//!
//! GPU kernels consume the same byte layouts these types describe; the CPU
//! reference implementations here exist so the invariants in the design
//! ledger are testable without a headless GPU.

pub mod boid;
pub mod boundary;
pub mod color;
pub mod config;
pub mod curve;
pub mod error;
pub mod flocking_ref;
pub mod interaction;
pub mod species;
pub mod spatial_hash_ref;
pub mod uniforms;
pub mod wall;

pub use boid::{Boid, MAX_NEIGHBORS_PER_CELL, TRAIL_CAPACITY, TrailBuffer};
pub use boundary::BoundaryMode;
pub use config::SimulationConfig;
pub use curve::{CURVE_SAMPLES, Curve, CurveSet};
pub use error::SimulationError;
pub use interaction::{Behavior, InteractionMatrix, InteractionRule, MAX_SPECIES};
pub use species::{SpeciesParams, SpeciesTable};
pub use spatial_hash_ref::SpatialGrid;
pub use uniforms::{UNIFORM_SIZE, UniformBlock};
pub use wall::{WALL_SCALE, WallMask};

/// Minimum perception radius allowed for any species; also the minimum cell size.
pub const MIN_PERCEPTION: f32 = 10.0;

/// Boid count cap named in the purpose & scope section.
pub const MAX_BOIDS: u32 = 15_000;

/// Frames between rebel phase windows.
pub const REBEL_PERIOD: u32 = 180;

/// Frames a rebel-prone boid spends rebelling once its phase window opens.
pub const REBEL_DURATION: u32 = 60;
