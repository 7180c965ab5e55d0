//! Compute pipelines for the spatial-hash builder (Pass 1-4): clear, count,
//! a block-aggregated Blelloch exclusive scan, and scatter. Mirrors the
//! donor's `SpatialHashPipelines` shape (one pipeline + bind group layout
//! per pass) but replaces its iterative-doubling prefix sum with the
//! two-level block scan described in the design document.

use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType, ComputePipeline,
    ComputePipelineDescriptor, Device, PipelineCompilationOptions, PipelineLayoutDescriptor,
    ShaderStages,
};

use super::load_shader;
use crate::renderer::gpu::buffers::{GridBuffers, ParamBuffers};

fn storage_entry(binding: u32, read_only: bool) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::COMPUTE,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::COMPUTE,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub struct SpatialHashPipelines {
    pub clear_pipeline: ComputePipeline,
    pub count_pipeline: ComputePipeline,
    pub scan_local_pipeline: ComputePipeline,
    pub scan_blocksums_pipeline: ComputePipeline,
    pub scan_add_pipeline: ComputePipeline,
    pub scatter_pipeline: ComputePipeline,

    clear_layout: BindGroupLayout,
    count_layout: BindGroupLayout,
    scan_local_layout: BindGroupLayout,
    scan_blocksums_layout: BindGroupLayout,
    scan_add_layout: BindGroupLayout,
    scatter_layout: BindGroupLayout,
}

impl SpatialHashPipelines {
    pub fn new(device: &Device) -> Self {
        let clear_shader = load_shader(
            device,
            "Bin Clear Shader",
            include_str!("../../../../shaders/bin_clear.wgsl"),
        );
        let count_shader = load_shader(
            device,
            "Bin Count Shader",
            include_str!("../../../../shaders/bin_count.wgsl"),
        );
        let scan_local_shader = load_shader(
            device,
            "Bin Scan Local Shader",
            include_str!("../../../../shaders/bin_scan_local.wgsl"),
        );
        let scan_blocksums_shader = load_shader(
            device,
            "Bin Scan Block Sums Shader",
            include_str!("../../../../shaders/bin_scan_blocksums.wgsl"),
        );
        let scan_add_shader = load_shader(
            device,
            "Bin Scan Add Shader",
            include_str!("../../../../shaders/bin_scan_add.wgsl"),
        );
        let scatter_shader = load_shader(
            device,
            "Bin Scatter Shader",
            include_str!("../../../../shaders/bin_scatter.wgsl"),
        );

        let clear_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Bin Clear Layout"),
            entries: &[storage_entry(0, false), storage_entry(1, false), uniform_entry(2)],
        });

        let count_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Bin Count Layout"),
            entries: &[storage_entry(0, false), storage_entry(1, false), uniform_entry(2)],
        });

        let scan_local_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Bin Scan Local Layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, false),
                storage_entry(2, false),
                uniform_entry(3),
            ],
        });

        let scan_blocksums_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Bin Scan Block Sums Layout"),
            entries: &[storage_entry(0, false), uniform_entry(1)],
        });

        let scan_add_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Bin Scan Add Layout"),
            entries: &[storage_entry(0, false), storage_entry(1, true), uniform_entry(2)],
        });

        let scatter_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Bin Scatter Layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, false),
                storage_entry(3, false),
                uniform_entry(4),
            ],
        });

        let make_pipeline = |label: &str, layout: &BindGroupLayout, module: &wgpu::ShaderModule| {
            let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &[layout],
                push_constant_ranges: &[],
            });
            device.create_compute_pipeline(&ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module,
                entry_point: Some("main"),
                compilation_options: PipelineCompilationOptions::default(),
                cache: None,
            })
        };

        Self {
            clear_pipeline: make_pipeline("Bin Clear Pipeline", &clear_layout, &clear_shader),
            count_pipeline: make_pipeline("Bin Count Pipeline", &count_layout, &count_shader),
            scan_local_pipeline: make_pipeline(
                "Bin Scan Local Pipeline",
                &scan_local_layout,
                &scan_local_shader,
            ),
            scan_blocksums_pipeline: make_pipeline(
                "Bin Scan Block Sums Pipeline",
                &scan_blocksums_layout,
                &scan_blocksums_shader,
            ),
            scan_add_pipeline: make_pipeline(
                "Bin Scan Add Pipeline",
                &scan_add_layout,
                &scan_add_shader,
            ),
            scatter_pipeline: make_pipeline(
                "Bin Scatter Pipeline",
                &scatter_layout,
                &scatter_shader,
            ),
            clear_layout,
            count_layout,
            scan_local_layout,
            scan_blocksums_layout,
            scan_add_layout,
            scatter_layout,
        }
    }

    pub fn clear_bind_group(&self, device: &Device, grid: &GridBuffers, total_slots: &Buffer) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("Bin Clear Bind Group"),
            layout: &self.clear_layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: grid.cell_counts.as_entire_binding() },
                BindGroupEntry { binding: 1, resource: grid.cell_offsets.as_entire_binding() },
                BindGroupEntry { binding: 2, resource: total_slots.as_entire_binding() },
            ],
        })
    }

    pub fn count_bind_group(
        &self,
        device: &Device,
        boids: &Buffer,
        grid: &GridBuffers,
        uniforms: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("Bin Count Bind Group"),
            layout: &self.count_layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: boids.as_entire_binding() },
                BindGroupEntry { binding: 1, resource: grid.cell_counts.as_entire_binding() },
                BindGroupEntry { binding: 2, resource: uniforms.as_entire_binding() },
            ],
        })
    }

    pub fn scan_local_bind_group(
        &self,
        device: &Device,
        grid: &GridBuffers,
        total_slots: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("Bin Scan Local Bind Group"),
            layout: &self.scan_local_layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: grid.cell_counts.as_entire_binding() },
                BindGroupEntry { binding: 1, resource: grid.current_prefix().as_entire_binding() },
                BindGroupEntry { binding: 2, resource: grid.block_sums.as_entire_binding() },
                BindGroupEntry { binding: 3, resource: total_slots.as_entire_binding() },
            ],
        })
    }

    pub fn scan_blocksums_bind_group(
        &self,
        device: &Device,
        grid: &GridBuffers,
        block_count: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("Bin Scan Block Sums Bind Group"),
            layout: &self.scan_blocksums_layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: grid.block_sums.as_entire_binding() },
                BindGroupEntry { binding: 1, resource: block_count.as_entire_binding() },
            ],
        })
    }

    pub fn scan_add_bind_group(
        &self,
        device: &Device,
        grid: &GridBuffers,
        total_slots: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("Bin Scan Add Bind Group"),
            layout: &self.scan_add_layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: grid.current_prefix().as_entire_binding() },
                BindGroupEntry { binding: 1, resource: grid.block_sums.as_entire_binding() },
                BindGroupEntry { binding: 2, resource: total_slots.as_entire_binding() },
            ],
        })
    }

    pub fn scatter_bind_group(
        &self,
        device: &Device,
        boids: &Buffer,
        grid: &GridBuffers,
        uniforms: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("Bin Scatter Bind Group"),
            layout: &self.scatter_layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: boids.as_entire_binding() },
                BindGroupEntry { binding: 1, resource: grid.current_prefix().as_entire_binding() },
                BindGroupEntry { binding: 2, resource: grid.cell_offsets.as_entire_binding() },
                BindGroupEntry { binding: 3, resource: grid.sorted_indices.as_entire_binding() },
                BindGroupEntry { binding: 4, resource: uniforms.as_entire_binding() },
            ],
        })
    }

    /// Avoid unused-field warnings for layouts only read through their
    /// pipelines' bind_group_layout accessor when a caller needs to rebuild
    /// a pipeline layout elsewhere (kept for symmetry with the donor).
    pub fn count_bind_group_layout(&self) -> &BindGroupLayout {
        &self.count_layout
    }
}

#[allow(dead_code)]
fn _unused_param_buffers_reference(_p: &ParamBuffers) {}
