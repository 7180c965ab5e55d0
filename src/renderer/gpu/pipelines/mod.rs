//! GPU compute and render pipelines for the boid simulation.
//!
//! # Submodules
//!
//! - [`spatial`]: spatial-hash clear/count/scan/scatter pipelines (Pass 1-4)
//! - [`flocking`]: per-boid flocking update (Pass 5)
//! - [`metrics`]: per-boid density/anisotropy/turning/spectral metrics (Pass 6-7)
//! - [`render`]: wall, trail, and boid-body render pipelines

mod flocking;
mod metrics;
mod render;
mod spatial;

pub use flocking::FlockingPipeline;
pub use metrics::MetricsPipeline;
pub use render::RenderPipelines;
pub use spatial::SpatialHashPipelines;

use bytemuck::{Pod, Zeroable};
use wgpu::{Device, ShaderModuleDescriptor, ShaderSource};

/// Camera uniform for the render pipelines: maps world coordinates to clip
/// space given a pan/zoom state, following the donor's `CameraUniform`.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct CameraUniform {
    pub center_x: f32,
    pub center_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl CameraUniform {
    pub fn new(world_width: f32, world_height: f32) -> Self {
        Self {
            center_x: world_width / 2.0,
            center_y: world_height / 2.0,
            scale_x: 2.0 / world_width,
            scale_y: 2.0 / world_height,
        }
    }
}

const COMMON_WGSL: &str = include_str!("../../../../shaders/common.wgsl");

/// Load a WGSL shader, splicing in `common.wgsl` wherever `__COMMON__`
/// appears. The donor's `load_shader` does textual FP16 substitution; this
/// crate's shaders don't need a float-width swap, so the only substitution
/// left is the shared-struct include.
pub(crate) fn load_shader(device: &Device, label: &str, source: &str) -> wgpu::ShaderModule {
    let code = source.replace("__COMMON__", COMMON_WGSL);
    device.create_shader_module(ShaderModuleDescriptor {
        label: Some(label),
        source: ShaderSource::Wgsl(std::borrow::Cow::Owned(code)),
    })
}
