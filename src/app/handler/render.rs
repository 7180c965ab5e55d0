//! Render-pass half of a frame: walls/background, trails, then boid
//! bodies (with ghost instancing for wrap topologies). Recorded into the
//! same command encoder as the compute passes so the frame submits as a
//! single command buffer.

use wgpu::{CommandEncoder, TextureView};

use super::SimHandler;

const GHOST_COUNT: u32 = 4;

impl SimHandler {
    pub(crate) fn encode_render(&self, encoder: &mut CommandEncoder, view: &TextureView) {
        let Some(gpu) = self.gpu.as_ref() else { return };
        let boid_count = self.sim.boids.len() as u32;

        let walls_bg = gpu.render_pipelines.walls_bind_group(
            &gpu.context.device,
            &gpu.param_buffers,
            &gpu.wall_buffers,
        );
        let trails_bg = gpu.render_pipelines.trails_bind_group(
            &gpu.context.device,
            &gpu.boid_buffers,
            &gpu.param_buffers,
        );
        let boids_bg = gpu.render_pipelines.boids_bind_group(
            &gpu.context.device,
            &gpu.boid_buffers,
            &gpu.param_buffers,
            &gpu.metrics_buffers,
        );

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&gpu.render_pipelines.walls_pipeline);
        pass.set_bind_group(0, &walls_bg, &[]);
        pass.draw(0..6, 0..1);

        let segments_per_boid = gpu.boid_buffers.trail_capacity.saturating_sub(1);
        pass.set_pipeline(&gpu.render_pipelines.trails_pipeline);
        pass.set_bind_group(0, &trails_bg, &[]);
        pass.draw(0..6, 0..(boid_count * segments_per_boid));

        pass.set_pipeline(&gpu.render_pipelines.boids_pipeline);
        pass.set_bind_group(0, &boids_bg, &[]);
        pass.draw(0..3, 0..(boid_count * GHOST_COUNT));
    }
}
