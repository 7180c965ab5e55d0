//! Host-side simulation state: configuration, species/interaction/curve
//! tables, and the CPU-resident boid array that seeds the GPU buffers.

use anyhow::Result;
use glam::Vec2;
use rand::Rng;
use winit::event_loop::{ControlFlow, EventLoop};

use super::{AppConfig, Preset, handler::SimHandler};
use crate::sim::{
    Boid, CurveSet, InteractionMatrix, SimulationConfig, SimulationError, SpeciesTable,
    TrailBuffer, WallMask,
};

/// Margin kept clear around the canvas edge when scattering boids at spawn.
const SPAWN_MARGIN: f32 = 40.0;

/// Host-resident simulation state: everything that needs to exist before a
/// GPU device is available, and that the GPU buffers are built from.
pub struct Simulation {
    pub config: AppConfig,
    pub sim_config: SimulationConfig,
    pub species: SpeciesTable,
    pub interactions: InteractionMatrix,
    pub curves: CurveSet,
    pub boids: Vec<Boid>,
    pub trails: TrailBuffer,
    pub wall: WallMask,
    pub running: bool,
}

impl Simulation {
    /// Create a new simulation with default settings, loading the persisted
    /// [`AppConfig`] unless `reset_config` is set.
    pub fn new(reset_config: bool) -> Self {
        let config = if reset_config { AppConfig::default() } else { AppConfig::load() };

        let mut sim_config = SimulationConfig::default();
        sim_config.boid_count = config.max_boids;

        let species = SpeciesTable::new(vec![Default::default()]).expect("one species is valid");
        let interactions = InteractionMatrix::default();
        let curves = CurveSet::default();

        let boids = Self::spawn_boids(sim_config.boid_count, sim_config.world, species.len());
        let trails = TrailBuffer::new(boids.len());
        let wall = WallMask::empty(sim_config.world.x, sim_config.world.y);

        Self { config, sim_config, species, interactions, curves, boids, trails, wall, running: true }
    }

    /// Run the main application loop.
    ///
    /// Returns `Ok(Some(err))` if GPU initialization failed with an
    /// environmental error that should determine the process exit code
    /// (§6.1); `Ok(None)` on a clean exit.
    pub fn run(
        reset_config: bool,
        max_boids: Option<u32>,
        vsync: Option<bool>,
    ) -> Result<Option<SimulationError>> {
        log::info!("Boid Flock starting...");

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut handler = SimHandler::new(reset_config, max_boids, vsync);
        event_loop.run_app(&mut handler)?;

        Ok(handler.init_error)
    }

    /// Scatter `count` boids uniformly across the inset canvas with random
    /// headings, cycling species assignment round-robin.
    pub fn spawn_boids(count: u32, world: Vec2, species_count: usize) -> Vec<Boid> {
        let mut rng = rand::rng();
        let species_count = species_count.max(1);

        let mut boids = Vec::with_capacity(count as usize);
        for i in 0..count {
            let x = rng.random_range(SPAWN_MARGIN..(world.x - SPAWN_MARGIN).max(SPAWN_MARGIN + 1.0));
            let y = rng.random_range(SPAWN_MARGIN..(world.y - SPAWN_MARGIN).max(SPAWN_MARGIN + 1.0));
            let angle: f32 = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(1.0..2.5);

            let species = (i as usize % species_count) as u32;
            let birth_color = angle.rem_euclid(std::f32::consts::TAU) / std::f32::consts::TAU;
            let (vx, vy) = (angle.cos() * speed, angle.sin() * speed);

            boids.push(Boid::new(x, y, vx, vy, species, birth_color));
        }
        boids
    }

    /// Regenerate boid positions/velocities with the current population and
    /// species count, marking buffers for reset.
    pub fn regenerate(&mut self) {
        self.boids = Self::spawn_boids(self.sim_config.boid_count, self.sim_config.world, self.species.len());
        self.trails = TrailBuffer::new(self.boids.len());
        self.sim_config.dirty.needs_reset = true;
        self.sim_config.dirty.needs_reallocate = true;

        if let Err(e) = self.species.validate_population(&self.boids) {
            log::error!("Species validation failed after regenerate: {e}");
        }
        if let Err(e) = self.interactions.validate(self.species.len()) {
            log::error!("Interaction matrix validation failed after regenerate: {e}");
        }
    }

    /// Resize the population, reallocating boids/trails.
    pub fn set_boid_count(&mut self, count: u32) {
        self.sim_config.set_boid_count(count);
        self.regenerate();
    }

    pub fn toggle_running(&mut self) {
        self.running = !self.running;
    }

    pub fn save_config(&self) -> Result<()> {
        self.config.save()
    }

    /// Bundle the current flocking parameters into a named [`Preset`].
    pub fn to_preset(&self, name: impl Into<String>) -> Preset {
        Preset::new(name, self.sim_config.clone(), self.species.clone(), self.interactions.clone(), self.curves.clone())
    }

    /// Apply a loaded preset, regenerating boids to match its population.
    pub fn apply_preset(&mut self, preset: Preset) {
        self.sim_config = preset.sim_config;
        self.species = preset.species;
        self.interactions = preset.interactions;
        self.curves = preset.curves;
        self.sim_config.mark_all_dirty();
        self.regenerate();
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(false)
    }
}
