//! GPU rendering using wgpu.
//!
//! This module provides high-performance GPU-accelerated boid simulation
//! and rendering using the wgpu graphics API.
//!
//! # Architecture
//!
//! The GPU renderer consists of:
//! - `GpuContext`: Core wgpu device, queue, and surface management
//! - `BoidBuffers`/`GridBuffers`/`ParamBuffers`: GPU buffers for boid data, the spatial-hash grid, and simulation parameters
//! - `SpatialHashPipelines`/`FlockingPipeline`/`MetricsPipeline`: compute shaders for the spatial-hash builder, flocking update, and per-boid metrics
//! - `RenderPipelines`: render shaders for walls, trails, and boid bodies
//!
//! # Usage
//!
//! ```ignore
//! let context = GpuContext::new(window, /*vsync=*/ true).await?;
//! let boids = BoidBuffers::new(&context.device, &initial_boids, &trails);
//! let grid = GridBuffers::new(&context.device, &spatial_grid, boid_count);
//! let params = ParamBuffers::new(&context.device, &species, &interactions, &curves, &uniforms);
//!
//! // Each frame:
//! spatial.dispatch(&mut encoder, &boids, &grid, &params);
//! flocking.dispatch(&mut encoder, &boids, &grid, &params);
//! render.draw(&mut encoder, &boids, &params);
//! ```

pub mod buffers;
mod context;
pub mod pipelines;

pub use buffers::{BoidBuffers, GridBuffers, MetricsBuffers, ParamBuffers, WallBuffers, build_uniform_block};
pub use context::GpuContext;
pub use pipelines::{CameraUniform, FlockingPipeline, MetricsPipeline, RenderPipelines, SpatialHashPipelines};
