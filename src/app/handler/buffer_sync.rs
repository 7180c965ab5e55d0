//! Applies the simulation's dirty-flag bitset against the GPU buffer set,
//! choosing a full reallocation versus a cheap re-upload per flag (§4.6).

use super::SimHandler;
use crate::renderer::gpu::{BoidBuffers, GridBuffers};
use crate::sim::SpatialGrid;

impl SimHandler {
    /// Reconcile GPU buffers with any host-side state changes since the last
    /// frame, then clear the dirty-flag bitset.
    pub(crate) fn sync_dirty_state(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else { return };
        let dirty = self.sim.sim_config.dirty;

        if dirty.needs_reallocate {
            let cell_size = self
                .sim
                .sim_config
                .cell_size_for_perception(self.sim.species.min_perception());
            gpu.grid = SpatialGrid::new(self.sim.sim_config.world, cell_size);
            gpu.boid_buffers = BoidBuffers::new(&gpu.context.device, &self.sim.boids, &self.sim.trails);
            gpu.grid_buffers =
                GridBuffers::new(&gpu.context.device, &gpu.grid, self.sim.boids.len() as u32);
            gpu.trail_head = 0;
            gpu.render_pipelines.update_camera(
                &gpu.context.queue,
                self.sim.sim_config.world.x,
                self.sim.sim_config.world.y,
            );
        } else {
            if dirty.needs_reset {
                gpu.boid_buffers.reset(&gpu.context.queue, &self.sim.boids);
            }
            if dirty.needs_trails_clear {
                gpu.boid_buffers.update_trails(&gpu.context.queue, &self.sim.trails);
                gpu.trail_head = 0;
            }
        }

        if dirty.species_dirty {
            gpu.param_buffers.update_species(&gpu.context.queue, &self.sim.species);
        }
        if dirty.interactions_dirty {
            gpu.param_buffers.update_interactions(&gpu.context.queue, &self.sim.interactions);
        }
        if dirty.curves_dirty {
            gpu.param_buffers.update_curves(&gpu.context.queue, &self.sim.curves);
        }
        if dirty.wall_dirty {
            gpu.wall_buffers.write(&gpu.context.queue, &self.sim.wall);
        }

        self.sim.sim_config.dirty = Default::default();
    }
}
