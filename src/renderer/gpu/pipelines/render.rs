//! Render pipelines for boid visualization: a background/wall pass, a
//! trail pass, and a boid-body pass with ghost instancing for wrap
//! topologies.

use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, BlendState, Buffer, BufferBindingType, ColorTargetState,
    ColorWrites, Device, FragmentState, FrontFace, MultisampleState, PipelineCompilationOptions,
    PipelineLayoutDescriptor, PolygonMode, PrimitiveState, PrimitiveTopology, Queue,
    RenderPipeline, RenderPipelineDescriptor, SamplerBindingType, ShaderStages, TextureFormat,
    TextureSampleType, TextureViewDimension, VertexState,
};

use super::{CameraUniform, load_shader};
use crate::renderer::gpu::buffers::{BoidBuffers, MetricsBuffers, ParamBuffers, WallBuffers};

fn storage_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Texture {
            sample_type: TextureSampleType::Float { filterable: true },
            view_dimension: TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Sampler(SamplerBindingType::Filtering),
        count: None,
    }
}

/// The three render passes: background/walls, trails, boid bodies. Each is
/// a single triangle-list draw (walls: one fullscreen quad; trails/boids:
/// instanced per boid), following the donor's one-pipeline-per-effect
/// layout.
pub struct RenderPipelines {
    pub walls_pipeline: RenderPipeline,
    pub trails_pipeline: RenderPipeline,
    pub boids_pipeline: RenderPipeline,

    walls_bind_group_layout: BindGroupLayout,
    trails_bind_group_layout: BindGroupLayout,
    boids_bind_group_layout: BindGroupLayout,

    pub camera_buffer: Buffer,
}

impl RenderPipelines {
    pub fn new(device: &Device, surface_format: TextureFormat) -> Self {
        let walls_shader = load_shader(
            device,
            "Wall Render Shader",
            include_str!("../../../../shaders/render_walls.wgsl"),
        );
        let trails_shader = load_shader(
            device,
            "Trail Render Shader",
            include_str!("../../../../shaders/render_trails.wgsl"),
        );
        let boids_shader = load_shader(
            device,
            "Boid Render Shader",
            include_str!("../../../../shaders/render_boids.wgsl"),
        );

        let walls_bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Wall Bind Group Layout"),
            entries: &[
                uniform_entry(0, ShaderStages::FRAGMENT),
                texture_entry(1, ShaderStages::FRAGMENT),
                sampler_entry(2, ShaderStages::FRAGMENT),
            ],
        });

        let trails_bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Trail Bind Group Layout"),
            entries: &[
                storage_entry(0, ShaderStages::VERTEX),
                storage_entry(1, ShaderStages::VERTEX),
                storage_entry(2, ShaderStages::VERTEX),
                uniform_entry(3, ShaderStages::VERTEX),
                uniform_entry(4, ShaderStages::VERTEX),
            ],
        });

        let boids_bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Boid Bind Group Layout"),
            entries: &[
                storage_entry(0, ShaderStages::VERTEX),
                storage_entry(1, ShaderStages::VERTEX),
                uniform_entry(2, ShaderStages::VERTEX),
                uniform_entry(3, ShaderStages::VERTEX),
                storage_entry(4, ShaderStages::VERTEX | ShaderStages::FRAGMENT),
                storage_entry(5, ShaderStages::VERTEX),
            ],
        });

        let walls_pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Wall Pipeline Layout"),
            bind_group_layouts: &[&walls_bind_group_layout],
            push_constant_ranges: &[],
        });
        let trails_pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Trail Pipeline Layout"),
            bind_group_layouts: &[&trails_bind_group_layout],
            push_constant_ranges: &[],
        });
        let boids_pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Boid Pipeline Layout"),
            bind_group_layouts: &[&boids_bind_group_layout],
            push_constant_ranges: &[],
        });

        let walls_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Wall Render Pipeline"),
            layout: Some(&walls_pipeline_layout),
            vertex: VertexState {
                module: &walls_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &walls_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let trails_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Trail Render Pipeline"),
            layout: Some(&trails_pipeline_layout),
            vertex: VertexState {
                module: &trails_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &trails_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let boids_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Boid Render Pipeline"),
            layout: Some(&boids_pipeline_layout),
            vertex: VertexState {
                module: &boids_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &boids_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let camera = CameraUniform::new(1280.0, 720.0);
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&camera),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            walls_pipeline,
            trails_pipeline,
            boids_pipeline,
            walls_bind_group_layout,
            trails_bind_group_layout,
            boids_bind_group_layout,
            camera_buffer,
        }
    }

    pub fn update_camera(&self, queue: &Queue, world_width: f32, world_height: f32) {
        let camera = CameraUniform::new(world_width, world_height);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera));
    }

    pub fn walls_bind_group(&self, device: &Device, params: &ParamBuffers, wall: &WallBuffers) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("Wall Bind Group"),
            layout: &self.walls_bind_group_layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: params.uniforms.as_entire_binding() },
                BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&wall.view) },
                BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(&wall.sampler) },
            ],
        })
    }

    pub fn trails_bind_group(
        &self,
        device: &Device,
        boids: &BoidBuffers,
        params: &ParamBuffers,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("Trail Bind Group"),
            layout: &self.trails_bind_group_layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: boids.current().as_entire_binding() },
                BindGroupEntry { binding: 1, resource: boids.trails.as_entire_binding() },
                BindGroupEntry { binding: 2, resource: params.species.as_entire_binding() },
                BindGroupEntry { binding: 3, resource: params.uniforms.as_entire_binding() },
                BindGroupEntry { binding: 4, resource: self.camera_buffer.as_entire_binding() },
            ],
        })
    }

    pub fn boids_bind_group(
        &self,
        device: &Device,
        boids: &BoidBuffers,
        params: &ParamBuffers,
        metrics: &MetricsBuffers,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("Boid Bind Group"),
            layout: &self.boids_bind_group_layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: boids.current().as_entire_binding() },
                BindGroupEntry { binding: 1, resource: params.species.as_entire_binding() },
                BindGroupEntry { binding: 2, resource: params.uniforms.as_entire_binding() },
                BindGroupEntry { binding: 3, resource: self.camera_buffer.as_entire_binding() },
                BindGroupEntry { binding: 4, resource: metrics.metrics.as_entire_binding() },
                BindGroupEntry { binding: 5, resource: params.curves.as_entire_binding() },
            ],
        })
    }
}
