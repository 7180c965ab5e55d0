//! GPU initialization for the application handler.

use std::sync::Arc;
use winit::window::Window;

use super::SimHandler;
use crate::app::gpu_state::GpuState;
use crate::renderer::gpu::{
    BoidBuffers, FlockingPipeline, GpuContext, GridBuffers, MetricsBuffers, MetricsPipeline,
    ParamBuffers, RenderPipelines, SpatialHashPipelines, WallBuffers, build_uniform_block,
};
use crate::sim::{MAX_BOIDS, SpatialGrid};

impl SimHandler {
    pub(crate) fn init_gpu(&mut self, window: Arc<Window>) {
        let vsync = self.sim.config.vsync;
        let context = match pollster::block_on(GpuContext::new(window, vsync)) {
            Ok(context) => context,
            Err(e) => {
                log::error!("Failed to create GPU context: {e}");
                self.init_error = Some(e);
                return;
            }
        };

        let spatial_pipelines = SpatialHashPipelines::new(&context.device);
        let flocking_pipeline = FlockingPipeline::new(&context.device);
        let metrics_pipeline = MetricsPipeline::new(&context.device);
        let render_pipelines = RenderPipelines::new(&context.device, context.surface_format());

        let cell_size = self
            .sim
            .sim_config
            .cell_size_for_perception(self.sim.species.min_perception());
        let grid = SpatialGrid::new(self.sim.sim_config.world, cell_size);

        let boid_buffers = BoidBuffers::new(&context.device, &self.sim.boids, &self.sim.trails);
        let grid_buffers = GridBuffers::new(&context.device, &grid, self.sim.boids.len() as u32);

        let uniform_block = build_uniform_block(
            &self.sim.sim_config,
            &self.sim.species,
            &grid,
            0,
            0.0,
            0.0,
            0,
        );
        let param_buffers = ParamBuffers::new(
            &context.device,
            &self.sim.species,
            &self.sim.interactions,
            &self.sim.curves,
            &uniform_block,
        );
        let wall_buffers = WallBuffers::new(&context.device, &context.queue, &self.sim.wall);
        let metrics_buffers = MetricsBuffers::new(&context.device, MAX_BOIDS);

        render_pipelines.update_camera(&context.queue, self.sim.sim_config.world.x, self.sim.sim_config.world.y);

        log::info!(
            "Initialized with {} boids ({} species), world {}x{}",
            self.sim.boids.len(),
            self.sim.species.len(),
            self.sim.sim_config.world.x,
            self.sim.sim_config.world.y,
        );

        self.gpu = Some(GpuState {
            context,
            spatial_pipelines,
            flocking_pipeline,
            metrics_pipeline,
            render_pipelines,
            boid_buffers,
            grid_buffers,
            param_buffers,
            wall_buffers,
            metrics_buffers,
            grid,
            frame_count: 0,
            trail_head: 0,
            time: 0.0,
        });
    }
}
