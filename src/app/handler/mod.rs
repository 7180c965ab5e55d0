//! Application handler module for the winit event loop.
//!
//! This module contains the `SimHandler` struct which drives the
//! simulation's lifecycle: GPU initialization, input handling, the
//! per-frame compute/render dispatch, and FPS/metrics reporting.

mod buffer_sync;
mod events;
mod gpu_compute;
mod init;
mod render;
mod update;

use std::time::Instant;

use crate::app::gpu_state::GpuState;
use crate::app::{Preset, Simulation};
use crate::sim::SimulationError;

/// Application handler for the winit event loop.
pub(crate) struct SimHandler {
    /// Host-side simulation state (config, species/interaction/curve tables,
    /// boid array).
    pub(crate) sim: Simulation,
    /// GPU context, pipelines, and buffers (created when the window is
    /// available).
    pub(crate) gpu: Option<GpuState>,
    /// `--max-boids` CLI override applied on startup.
    pub(crate) max_boids_override: Option<u32>,
    /// `--vsync` CLI override applied on startup.
    pub(crate) vsync_override: Option<bool>,
    /// Set if GPU initialization failed; checked after the event loop exits
    /// to compute the process exit code.
    pub(crate) init_error: Option<SimulationError>,
    /// Last frame time, used to compute `dt`.
    pub(crate) last_frame: Instant,
    /// Time the handler was created, for uptime logging.
    pub(crate) start_time: Instant,
    /// Frames observed since the last FPS sample.
    pub(crate) frames_since_fps: u32,
    /// Last time the FPS counter was refreshed.
    pub(crate) last_fps_time: Instant,
    /// Current frames-per-second estimate, refreshed at 1 Hz.
    pub(crate) fps: f32,
    /// Last time periodic metrics were logged.
    pub(crate) last_log_time: Instant,
    /// Names of presets discovered on disk at startup.
    pub(crate) preset_list: Vec<String>,
}

impl SimHandler {
    pub(crate) fn new(reset_config: bool, max_boids: Option<u32>, vsync: Option<bool>) -> Self {
        let mut sim = Simulation::new(reset_config);
        if let Some(max_boids) = max_boids {
            sim.set_boid_count(max_boids);
        }
        if let Some(vsync) = vsync {
            sim.config.vsync = vsync;
        }

        let preset_list = Preset::list_presets().unwrap_or_default();

        log::info!("Startup settings:");
        log::info!("  Boids: {}", sim.sim_config.boid_count);
        log::info!("  Species: {}", sim.species.len());
        log::info!("  World size: {}x{}", sim.sim_config.world.x, sim.sim_config.world.y);
        log::info!("  Vsync: {}", sim.config.vsync);

        let now = Instant::now();
        Self {
            sim,
            gpu: None,
            max_boids_override: max_boids,
            vsync_override: vsync,
            init_error: None,
            last_frame: now,
            start_time: now,
            frames_since_fps: 0,
            last_fps_time: now,
            fps: 0.0,
            last_log_time: now,
            preset_list,
        }
    }
}
