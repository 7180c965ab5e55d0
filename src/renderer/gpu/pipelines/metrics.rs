//! Pass 7: the spectral/flow channel, computed by an iterative rank
//! relaxation (`init_rank` / `iter_rank` / `write_metrics`) over the same
//! sorted grid the flocking pass built. density/anisotropy/turning are
//! written directly by the flocking kernel (Pass 5) instead of here.

use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, BufferBindingType, ComputePipeline, ComputePipelineDescriptor,
    Device, PipelineCompilationOptions, PipelineLayoutDescriptor, ShaderStages,
};

use super::load_shader;
use crate::renderer::gpu::buffers::{GridBuffers, MetricsBuffers, ParamBuffers};

fn entry(binding: u32, ty: BindingType) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry { binding, visibility: ShaderStages::COMPUTE, ty, count: None }
}

fn storage(binding: u32, read_only: bool) -> BindGroupLayoutEntry {
    entry(
        binding,
        BindingType::Buffer {
            ty: BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
    )
}

fn uniform(binding: u32) -> BindGroupLayoutEntry {
    entry(
        binding,
        BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
    )
}

/// Boids bound to this kernel never rotate with the flocking ping-pong
/// buffer mid-frame, so metrics reads the already-updated `boids_curr`
/// buffer set by Pass 5.
pub struct MetricsPipeline {
    pub init_rank_pipeline: ComputePipeline,
    pub iter_rank_pipeline: ComputePipeline,
    pub write_metrics_pipeline: ComputePipeline,
    layout: BindGroupLayout,
}

impl MetricsPipeline {
    pub fn new(device: &Device) -> Self {
        let shader =
            load_shader(device, "Metrics Shader", include_str!("../../../../shaders/metrics.wgsl"));

        let layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Metrics Bind Group Layout"),
            entries: &[
                storage(0, true),  // boids_curr
                storage(1, true),  // sorted_indices
                storage(2, true),  // prefix_sums
                storage(3, true),  // cell_counts
                storage(4, true),  // rank_in
                storage(5, false), // rank_out
                storage(6, false), // metrics
                uniform(7),        // uniforms
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Metrics Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, entry_point: &'static str| {
            device.create_compute_pipeline(&ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry_point),
                compilation_options: PipelineCompilationOptions::default(),
                cache: None,
            })
        };

        Self {
            init_rank_pipeline: make_pipeline("Init Rank Pipeline", "init_rank"),
            iter_rank_pipeline: make_pipeline("Iter Rank Pipeline", "iter_rank"),
            write_metrics_pipeline: make_pipeline("Write Metrics Pipeline", "write_metrics"),
            layout,
        }
    }

    /// `rank_in`/`rank_out` select which of [`MetricsBuffers::rank`] is read
    /// vs written this dispatch; the caller alternates them across
    /// `iter_rank` calls and must swap `metrics.current_rank` to match.
    pub fn bind_group(
        &self,
        device: &Device,
        boids_curr: &wgpu::Buffer,
        grid: &GridBuffers,
        metrics: &MetricsBuffers,
        rank_in: &wgpu::Buffer,
        rank_out: &wgpu::Buffer,
        params: &ParamBuffers,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("Metrics Bind Group"),
            layout: &self.layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: boids_curr.as_entire_binding() },
                BindGroupEntry { binding: 1, resource: grid.sorted_indices.as_entire_binding() },
                BindGroupEntry { binding: 2, resource: grid.current_prefix().as_entire_binding() },
                BindGroupEntry { binding: 3, resource: grid.cell_counts.as_entire_binding() },
                BindGroupEntry { binding: 4, resource: rank_in.as_entire_binding() },
                BindGroupEntry { binding: 5, resource: rank_out.as_entire_binding() },
                BindGroupEntry { binding: 6, resource: metrics.metrics.as_entire_binding() },
                BindGroupEntry { binding: 7, resource: params.uniforms.as_entire_binding() },
            ],
        })
    }
}
