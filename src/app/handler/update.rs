//! Per-frame orchestration: advance the trail ring, pack and upload the
//! uniform block, dispatch compute and render passes in a single command
//! buffer, then advance frame bookkeeping and report FPS/metrics.

use std::time::Instant;

use super::SimHandler;
use crate::renderer::gpu::build_uniform_block;

const MAX_DT: f32 = 1.0 / 30.0;
const METRICS_LOG_INTERVAL_SECS: f32 = 10.0;

impl SimHandler {
    pub(crate) fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32().min(MAX_DT);
        self.last_frame = now;

        self.sync_dirty_state();

        let Some(gpu) = self.gpu.as_mut() else { return };

        if self.sim.running {
            gpu.time += dt;
        }

        let uniform_block = build_uniform_block(
            &self.sim.sim_config,
            &self.sim.species,
            &gpu.grid,
            gpu.trail_head,
            dt,
            gpu.time,
            gpu.frame_count,
        );
        gpu.param_buffers.update_uniforms(&gpu.context.queue, &uniform_block);

        let Some(frame) = gpu.context.get_current_texture() else { return };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu.context.create_encoder("Frame Encoder");
        if self.sim.running {
            self.encode_compute(&mut encoder);
        }

        let gpu = self.gpu.as_mut().unwrap();
        if self.sim.running {
            gpu.boid_buffers.swap();
        }

        self.encode_render(&mut encoder, &view);
        let gpu = self.gpu.as_mut().unwrap();
        gpu.context.submit(encoder.finish());
        frame.present();

        if self.sim.running {
            gpu.trail_head = (gpu.trail_head + 1) % crate::sim::TRAIL_CAPACITY as u32;
            gpu.frame_count += 1;
        }

        self.frames_since_fps += 1;
        let fps_elapsed = now.duration_since(self.last_fps_time).as_secs_f32();
        if fps_elapsed >= 1.0 {
            self.fps = self.frames_since_fps as f32 / fps_elapsed;
            self.frames_since_fps = 0;
            self.last_fps_time = now;
        }

        if now.duration_since(self.last_log_time).as_secs_f32() >= METRICS_LOG_INTERVAL_SECS {
            log::info!(
                "Metrics: FPS={:.1}, boids={}, frame={}, uptime={:.0}s",
                self.fps,
                self.sim.boids.len(),
                self.gpu.as_ref().map(|g| g.frame_count).unwrap_or(0),
                now.duration_since(self.start_time).as_secs_f32(),
            );
            self.last_log_time = now;
        }
    }
}
