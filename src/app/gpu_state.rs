//! GPU state: device/surface context, compute/render pipelines, and the
//! buffer sets they operate on.

use crate::renderer::gpu::{
    BoidBuffers, FlockingPipeline, GpuContext, GridBuffers, MetricsBuffers, MetricsPipeline,
    ParamBuffers, RenderPipelines, SpatialHashPipelines, WallBuffers,
};
use crate::sim::SpatialGrid;

/// GPU rendering and compute state, created once a window is available.
pub(crate) struct GpuState {
    pub(crate) context: GpuContext,

    pub(crate) spatial_pipelines: SpatialHashPipelines,
    pub(crate) flocking_pipeline: FlockingPipeline,
    pub(crate) metrics_pipeline: MetricsPipeline,
    pub(crate) render_pipelines: RenderPipelines,

    pub(crate) boid_buffers: BoidBuffers,
    pub(crate) grid_buffers: GridBuffers,
    pub(crate) param_buffers: ParamBuffers,
    pub(crate) wall_buffers: WallBuffers,
    pub(crate) metrics_buffers: MetricsBuffers,

    /// Host mirror of the grid geometry the GPU buffers were sized for.
    pub(crate) grid: SpatialGrid,

    pub(crate) frame_count: u32,
    pub(crate) trail_head: u32,
    pub(crate) time: f32,
}
