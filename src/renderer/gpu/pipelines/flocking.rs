//! Pass 5: the per-boid flocking update compute pipeline.

use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType, ComputePipeline,
    ComputePipelineDescriptor, Device, PipelineCompilationOptions, PipelineLayoutDescriptor,
    SamplerBindingType, ShaderStages, TextureSampleType, TextureViewDimension,
};

use super::load_shader;
use crate::renderer::gpu::buffers::{BoidBuffers, GridBuffers, MetricsBuffers, ParamBuffers, WallBuffers};

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

fn texture2d(binding: u32) -> BindGroupLayoutEntry {
    entry(
        binding,
        BindingType::Texture {
            sample_type: TextureSampleType::Float { filterable: true },
            view_dimension: TextureViewDimension::D2,
            multisampled: false,
        },
    )
}

fn sampler(binding: u32) -> BindGroupLayoutEntry {
    entry(binding, BindingType::Sampler(SamplerBindingType::Filtering))
}

pub struct FlockingPipeline {
    pub pipeline: ComputePipeline,
    layout: BindGroupLayout,
}

impl FlockingPipeline {
    pub fn new(device: &Device) -> Self {
        let shader = load_shader(
            device,
            "Flocking Shader",
            include_str!("../../../../shaders/flocking.wgsl"),
        );

        let layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Flocking Bind Group Layout"),
            entries: &[
                storage(0, true),  // boids_in
                storage(1, false), // boids_out
                storage(2, true),  // sorted_indices
                storage(3, true),  // prefix_sums
                storage(4, true),  // cell_counts
                storage(5, true),  // species
                storage(6, true),  // interactions
                storage(7, false), // trails
                uniform(8),        // uniforms
                texture2d(9),      // wall mask
                sampler(10),       // wall mask sampler
                storage(11, false), // metrics
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Flocking Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&ComputePipelineDescriptor {
            label: Some("Flocking Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: PipelineCompilationOptions::default(),
            cache: None,
        });

        Self { pipeline, layout }
    }

    pub fn bind_group(
        &self,
        device: &Device,
        boids: &BoidBuffers,
        grid: &GridBuffers,
        params: &ParamBuffers,
        wall: &WallBuffers,
        metrics: &MetricsBuffers,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("Flocking Bind Group"),
            layout: &self.layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: boids.current().as_entire_binding() },
                BindGroupEntry { binding: 1, resource: boids.next().as_entire_binding() },
                BindGroupEntry { binding: 2, resource: grid.sorted_indices.as_entire_binding() },
                BindGroupEntry { binding: 3, resource: grid.current_prefix().as_entire_binding() },
                BindGroupEntry { binding: 4, resource: grid.cell_counts.as_entire_binding() },
                BindGroupEntry { binding: 5, resource: params.species.as_entire_binding() },
                BindGroupEntry { binding: 6, resource: params.interactions.as_entire_binding() },
                BindGroupEntry { binding: 7, resource: boids.trails.as_entire_binding() },
                BindGroupEntry { binding: 8, resource: params.uniforms.as_entire_binding() },
                BindGroupEntry { binding: 9, resource: wgpu::BindingResource::TextureView(&wall.view) },
                BindGroupEntry { binding: 10, resource: wgpu::BindingResource::Sampler(&wall.sampler) },
                BindGroupEntry { binding: 11, resource: metrics.metrics.as_entire_binding() },
            ],
        })
    }
}

#[allow(dead_code)]
fn _unused_buffer_reference(_b: &Buffer) {}
