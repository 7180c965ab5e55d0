//! GPU buffer management for the boid simulation.
//!
//! Mirrors the donor's SoA ping-pong layout (`renderer::gpu::buffers` in the
//! donor): one buffer manager per concern, each exposing typed
//! `update_*`/`current_*` accessors instead of raw `wgpu::Buffer` handles.

use wgpu::{Buffer, BufferUsages, Device, Queue, util::DeviceExt};

use crate::sim::boid::{Boid, TrailBuffer};
use crate::sim::config::SimulationConfig;
use crate::sim::curve::CurveSet;
use crate::sim::interaction::InteractionMatrix;
use crate::sim::species::SpeciesTable;
use crate::sim::spatial_hash_ref::SpatialGrid;
use crate::sim::uniforms::{ActiveSpeciesDefaults, UniformBlock};
use crate::sim::wall::WallMask;

/// Double-buffered boid storage (SoA Pod layout) plus the per-boid trail ring.
pub struct BoidBuffers {
    pub boids: [Buffer; 2],
    pub trails: Buffer,
    pub current_buffer: usize,
    pub count: u32,
    pub trail_capacity: u32,
}

impl BoidBuffers {
    pub fn new(device: &Device, boids: &[Boid], trails: &TrailBuffer) -> Self {
        let count = boids.len() as u32;

        let b0 = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Boid Buffer 0"),
            contents: bytemuck::cast_slice(boids),
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
        });
        let b1 = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Boid Buffer 1"),
            contents: bytemuck::cast_slice(boids),
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
        });

        let trails_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Trail Ring Buffer"),
            contents: bytemuck::cast_slice(trails.raw()),
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
        });

        Self {
            boids: [b0, b1],
            trails: trails_buffer,
            current_buffer: 0,
            count,
            trail_capacity: crate::sim::boid::TRAIL_CAPACITY as u32,
        }
    }

    pub fn current(&self) -> &Buffer {
        &self.boids[self.current_buffer]
    }

    pub fn next(&self) -> &Buffer {
        &self.boids[1 - self.current_buffer]
    }

    pub fn swap(&mut self) {
        self.current_buffer = 1 - self.current_buffer;
    }

    pub fn update_trails(&self, queue: &Queue, trails: &TrailBuffer) {
        queue.write_buffer(&self.trails, 0, bytemuck::cast_slice(trails.raw()));
    }

    pub fn reset(&self, queue: &Queue, boids: &[Boid]) {
        queue.write_buffer(&self.boids[0], 0, bytemuck::cast_slice(boids));
        queue.write_buffer(&self.boids[1], 0, bytemuck::cast_slice(boids));
    }

    /// Read back the current boid buffer (used by the test harness and the
    /// optional headless readback path; blocks until the GPU is done).
    pub fn read_boids(&self, device: &Device, queue: &Queue) -> Vec<Boid> {
        let size = self.count as usize * std::mem::size_of::<Boid>();

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Boid Readback Staging Buffer"),
            size: size as u64,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Boid Readback Encoder"),
        });
        encoder.copy_buffer_to_buffer(self.current(), 0, &staging, 0, size as u64);
        queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::PollType::wait_indefinitely()).unwrap();
        rx.recv().unwrap().unwrap();

        let data = slice.get_mapped_range();
        let out: Vec<Boid> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();
        out
    }
}

/// Buffers for the spatial-hash binning pipeline: per-cell counts, the
/// exclusive prefix sum (ping-ponged across Blelloch up-sweep/down-sweep
/// passes), block sums for the scan, and the scattered sorted-index array.
pub struct GridBuffers {
    pub cell_counts: Buffer,
    /// Scatter-cursor buffer, distinct from `cell_counts` so Pass 1 clears
    /// both in a single dispatch rather than re-clearing `cell_counts` a
    /// second time to repurpose it mid-frame.
    pub cell_offsets: Buffer,
    pub prefix_sums: [Buffer; 2],
    pub block_sums: Buffer,
    pub sorted_indices: Buffer,
    pub current_prefix_buffer: usize,
    pub total_slots: u32,
    pub total_slots_uniform: Buffer,
    pub block_count_uniform: Buffer,
    pub block_count: u32,
}

impl GridBuffers {
    pub fn new(device: &Device, grid: &SpatialGrid, boid_count: u32) -> Self {
        let total_slots = grid.total_slots();
        let slot_buffer_size = (total_slots as usize * std::mem::size_of::<u32>()) as u64;

        let cell_counts = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Counts Buffer"),
            size: slot_buffer_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let cell_offsets = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Offsets Buffer"),
            size: slot_buffer_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let prefix_a = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Prefix Sum Buffer A"),
            size: slot_buffer_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let prefix_b = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Prefix Sum Buffer B"),
            size: slot_buffer_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let block_count = total_slots.div_ceil(256).max(1);
        let block_sums = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Block Sums Buffer"),
            size: (block_count as usize * std::mem::size_of::<u32>()) as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sorted_indices = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sorted Indices Buffer"),
            size: (boid_count.max(1) as usize * std::mem::size_of::<u32>()) as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let total_slots_uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Total Slots Uniform Buffer"),
            contents: bytemuck::bytes_of(&total_slots),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let block_count_uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Block Count Uniform Buffer"),
            contents: bytemuck::bytes_of(&block_count),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        Self {
            cell_counts,
            cell_offsets,
            prefix_sums: [prefix_a, prefix_b],
            block_sums,
            sorted_indices,
            current_prefix_buffer: 0,
            total_slots,
            total_slots_uniform,
            block_count_uniform,
            block_count,
        }
    }

    pub fn current_prefix(&self) -> &Buffer {
        &self.prefix_sums[self.current_prefix_buffer]
    }

    pub fn next_prefix(&self) -> &Buffer {
        &self.prefix_sums[1 - self.current_prefix_buffer]
    }

    pub fn swap_prefix(&mut self) {
        self.current_prefix_buffer = 1 - self.current_prefix_buffer;
    }

    /// Number of up-sweep/down-sweep pass pairs for the Blelloch scan over
    /// `total_slots` elements.
    pub fn scan_passes(&self) -> u32 {
        32 - self.total_slots.max(1).leading_zeros()
    }
}

/// Species table, interaction-rule matrix, and curve LUTs: rarely-changing
/// parameter buffers uploaded whole whenever their dirty flag is set.
pub struct ParamBuffers {
    pub species: Buffer,
    pub interactions: Buffer,
    pub curves: Buffer,
    pub uniforms: Buffer,
}

impl ParamBuffers {
    pub fn new(
        device: &Device,
        species: &SpeciesTable,
        interactions: &InteractionMatrix,
        curves: &CurveSet,
        uniform_block: &UniformBlock,
    ) -> Self {
        let species_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Species Table Buffer"),
            contents: bytemuck::cast_slice(&species.to_gpu_buffer()),
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
        });

        let interactions_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Interaction Matrix Buffer"),
            contents: bytemuck::cast_slice(&interactions.to_gpu_buffer()),
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
        });

        // Storage, not uniform: the host packs `CurveBufferGpu` as three
        // tightly-packed `[f32; 64]` arrays, which only satisfies WGSL's
        // array-stride rules in the storage address space (uniform arrays
        // require a 16-byte element stride).
        let curves_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Curve LUT Buffer"),
            contents: bytemuck::bytes_of(&curves.to_gpu_buffer()),
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Simulation Uniform Buffer"),
            contents: bytemuck::bytes_of(uniform_block),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        Self {
            species: species_buffer,
            interactions: interactions_buffer,
            curves: curves_buffer,
            uniforms: uniform_buffer,
        }
    }

    pub fn update_species(&self, queue: &Queue, species: &SpeciesTable) {
        queue.write_buffer(&self.species, 0, bytemuck::cast_slice(&species.to_gpu_buffer()));
    }

    pub fn update_interactions(&self, queue: &Queue, interactions: &InteractionMatrix) {
        queue.write_buffer(
            &self.interactions,
            0,
            bytemuck::cast_slice(&interactions.to_gpu_buffer()),
        );
    }

    pub fn update_curves(&self, queue: &Queue, curves: &CurveSet) {
        queue.write_buffer(&self.curves, 0, bytemuck::bytes_of(&curves.to_gpu_buffer()));
    }

    pub fn update_uniforms(&self, queue: &Queue, block: &UniformBlock) {
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(block));
    }
}

/// Per-boid metrics buffer plus the ping-ponged rank-relaxation scratch
/// buffers consumed by the `init_rank`/`iter_rank`/`write_metrics` passes.
pub struct MetricsBuffers {
    pub metrics: Buffer,
    pub rank: [Buffer; 2],
    pub current_rank: usize,
}

impl MetricsBuffers {
    pub fn new(device: &Device, max_boids: u32) -> Self {
        let metrics_size = (max_boids.max(1) as usize * 4 * std::mem::size_of::<f32>()) as u64;
        let metrics = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Boid Metrics Buffer"),
            size: metrics_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let rank_size = (max_boids.max(1) as usize * std::mem::size_of::<f32>()) as u64;
        let rank_a = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Rank Buffer A"),
            size: rank_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let rank_b = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Rank Buffer B"),
            size: rank_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self { metrics, rank: [rank_a, rank_b], current_rank: 0 }
    }

    pub fn current_rank(&self) -> &Buffer {
        &self.rank[self.current_rank]
    }

    pub fn next_rank(&self) -> &Buffer {
        &self.rank[1 - self.current_rank]
    }

    pub fn swap_rank(&mut self) {
        self.current_rank = 1 - self.current_rank;
    }
}

/// The painted-wall obstacle mask, uploaded as a single-channel texture so
/// the flocking kernel and the wall render pass can both sample it.
pub struct WallBuffers {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl WallBuffers {
    pub fn new(device: &Device, queue: &Queue, mask: &WallMask) -> Self {
        let size = wgpu::Extent3d { width: mask.width, height: mask.height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Wall Mask Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Wall Mask Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let result = Self { texture, view, sampler };
        result.write(queue, mask);
        result
    }

    pub fn write(&self, queue: &Queue, mask: &WallMask) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &mask.data,
            wgpu::TexelCopyBufferLayout { offset: 0, bytes_per_row: Some(mask.width), rows_per_image: Some(mask.height) },
            wgpu::Extent3d { width: mask.width, height: mask.height, depth_or_array_layers: 1 },
        );
    }
}

/// Build the per-frame [`UniformBlock`] from current config + derived grid
/// geometry. Kept free-standing (rather than a method on `ParamBuffers`)
/// since the orchestrator needs the block before buffers exist on the first
/// frame.
pub fn build_uniform_block(
    cfg: &SimulationConfig,
    species: &SpeciesTable,
    grid: &SpatialGrid,
    trail_head: u32,
    delta_time: f32,
    time: f32,
    frame_count: u32,
) -> UniformBlock {
    let primary = species.get(0).copied().unwrap_or_default();
    let defaults = ActiveSpeciesDefaults {
        alignment: primary.alignment,
        cohesion: primary.cohesion,
        separation: primary.separation,
        perception: primary.perception,
        max_speed: primary.max_speed,
        max_force: primary.max_force,
        rebels: primary.rebels,
    };
    UniformBlock::from_state(
        cfg,
        defaults,
        grid.grid_w,
        grid.grid_h,
        grid.reduced_width,
        grid.total_slots(),
        trail_head,
        delta_time,
        time,
        frame_count,
    )
}
