//! Encodes the compute half of a frame: the spatial-hash build (clear,
//! count, block-scan, scatter), the flocking kernel, and the metrics
//! kernel, in the pass order required by the per-frame sequence.

use wgpu::{CommandEncoder, ComputePassDescriptor};

use super::SimHandler;

impl SimHandler {
    pub(crate) fn encode_compute(&self, encoder: &mut CommandEncoder) {
        let Some(gpu) = self.gpu.as_ref() else { return };
        let device = &gpu.context.device;

        let boid_count = self.sim.boids.len() as u32;
        let boid_workgroups = boid_count.div_ceil(256).max(1);
        let slot_workgroups = gpu.grid_buffers.total_slots.div_ceil(256).max(1);

        // Pass 1: clear cell counts and cell offsets together.
        let clear_bg = gpu.spatial_pipelines.clear_bind_group(
            device,
            &gpu.grid_buffers,
            &gpu.grid_buffers.total_slots_uniform,
        );
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("Bin Clear"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&gpu.spatial_pipelines.clear_pipeline);
            pass.set_bind_group(0, &clear_bg, &[]);
            pass.dispatch_workgroups(slot_workgroups, 1, 1);
        }

        // Pass 2: count boids per cell.
        let count_bg = gpu.spatial_pipelines.count_bind_group(
            device,
            gpu.boid_buffers.current(),
            &gpu.grid_buffers,
            &gpu.param_buffers.uniforms,
        );
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("Bin Count"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&gpu.spatial_pipelines.count_pipeline);
            pass.set_bind_group(0, &count_bg, &[]);
            pass.dispatch_workgroups(boid_workgroups, 1, 1);
        }

        // Pass 3a: per-block local exclusive scan, plus block sums.
        let scan_local_bg = gpu.spatial_pipelines.scan_local_bind_group(
            device,
            &gpu.grid_buffers,
            &gpu.grid_buffers.total_slots_uniform,
        );
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("Bin Scan Local"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&gpu.spatial_pipelines.scan_local_pipeline);
            pass.set_bind_group(0, &scan_local_bg, &[]);
            pass.dispatch_workgroups(slot_workgroups, 1, 1);
        }

        // Pass 3b: scan the block-sums array itself (single workgroup).
        let scan_blocksums_bg = gpu.spatial_pipelines.scan_blocksums_bind_group(
            device,
            &gpu.grid_buffers,
            &gpu.grid_buffers.block_count_uniform,
        );
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("Bin Scan Block Sums"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&gpu.spatial_pipelines.scan_blocksums_pipeline);
            pass.set_bind_group(0, &scan_blocksums_bg, &[]);
            pass.dispatch_workgroups(1, 1, 1);
        }

        // Pass 3c: add scanned block sums back into each block's local scan.
        let scan_add_bg = gpu.spatial_pipelines.scan_add_bind_group(
            device,
            &gpu.grid_buffers,
            &gpu.grid_buffers.total_slots_uniform,
        );
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("Bin Scan Add"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&gpu.spatial_pipelines.scan_add_pipeline);
            pass.set_bind_group(0, &scan_add_bg, &[]);
            pass.dispatch_workgroups(slot_workgroups, 1, 1);
        }

        // Pass 4: scatter boid indices into sorted order, using cell_offsets
        // as the per-cell write cursor (left untouched by Pass 1 onward).
        let scatter_bg = gpu.spatial_pipelines.scatter_bind_group(
            device,
            gpu.boid_buffers.current(),
            &gpu.grid_buffers,
            &gpu.param_buffers.uniforms,
        );
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("Bin Scatter"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&gpu.spatial_pipelines.scatter_pipeline);
            pass.set_bind_group(0, &scatter_bg, &[]);
            pass.dispatch_workgroups(boid_workgroups, 1, 1);
        }

        // Pass 5: flocking update, writing the next boid buffer. density,
        // anisotropy and turning are written as side effects of this pass.
        let flocking_bg = gpu.flocking_pipeline.bind_group(
            device,
            &gpu.boid_buffers,
            &gpu.grid_buffers,
            &gpu.param_buffers,
            &gpu.wall_buffers,
            &gpu.metrics_buffers,
        );
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("Flocking"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&gpu.flocking_pipeline.pipeline);
            pass.set_bind_group(0, &flocking_bg, &[]);
            pass.dispatch_workgroups(boid_workgroups, 1, 1);
        }

        // Pass 6: spectral/flow channel. Static modes (angular/radial/
        // asymmetry) need only the seed pass; flow modes relax the seed
        // across the grid over 4 iterations before the final write.
        let spectral_mode = self.sim.sim_config.spectral_mode;
        let iterations = if spectral_mode >= 3 { 4 } else { 0 };

        // Ping-pong purely within this frame: `reading` names which of the
        // two rank buffers holds the current seed/relaxed values.
        let mut reading = 0usize;

        let init_bg = gpu.metrics_pipeline.bind_group(
            device,
            gpu.boid_buffers.current(),
            &gpu.grid_buffers,
            &gpu.metrics_buffers,
            &gpu.metrics_buffers.rank[reading],
            &gpu.metrics_buffers.rank[1 - reading],
            &gpu.param_buffers,
        );
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("Metrics Init Rank"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&gpu.metrics_pipeline.init_rank_pipeline);
            pass.set_bind_group(0, &init_bg, &[]);
            pass.dispatch_workgroups(boid_workgroups, 1, 1);
        }
        reading = 1 - reading;

        for _ in 0..iterations {
            let iter_bg = gpu.metrics_pipeline.bind_group(
                device,
                gpu.boid_buffers.current(),
                &gpu.grid_buffers,
                &gpu.metrics_buffers,
                &gpu.metrics_buffers.rank[reading],
                &gpu.metrics_buffers.rank[1 - reading],
                &gpu.param_buffers,
            );
            {
                let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                    label: Some("Metrics Iter Rank"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&gpu.metrics_pipeline.iter_rank_pipeline);
                pass.set_bind_group(0, &iter_bg, &[]);
                pass.dispatch_workgroups(boid_workgroups, 1, 1);
            }
            reading = 1 - reading;
        }

        let write_bg = gpu.metrics_pipeline.bind_group(
            device,
            gpu.boid_buffers.current(),
            &gpu.grid_buffers,
            &gpu.metrics_buffers,
            &gpu.metrics_buffers.rank[reading],
            &gpu.metrics_buffers.rank[1 - reading],
            &gpu.param_buffers,
        );
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("Metrics Write"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&gpu.metrics_pipeline.write_metrics_pipeline);
            pass.set_bind_group(0, &write_bg, &[]);
            pass.dispatch_workgroups(boid_workgroups, 1, 1);
        }
    }
}
