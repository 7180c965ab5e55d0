//! GPU context management using wgpu.
//!
//! This module handles the creation and management of the wgpu instance,
//! adapter, device, queue, and surface for GPU rendering.

use std::sync::Arc;

use wgpu::{
    Adapter, Device, Features, Instance, InstanceDescriptor, Limits, PresentMode, Queue, Surface,
    SurfaceConfiguration, TextureFormat, TextureUsages,
};
use winit::window::Window;

use crate::sim::SimulationError;

type Result<T> = std::result::Result<T, SimulationError>;

/// GPU context containing all wgpu resources.
///
/// This struct owns the core wgpu objects needed for rendering:
/// - Instance: Entry point to wgpu
/// - Adapter: Physical GPU device
/// - Device: Logical GPU device for creating resources
/// - Queue: Command submission queue
/// - Surface: Window surface for presenting frames
pub struct GpuContext {
    /// wgpu instance (entry point).
    pub instance: Instance,
    /// Physical GPU adapter.
    pub adapter: Adapter,
    /// Logical GPU device.
    pub device: Device,
    /// Command submission queue.
    pub queue: Queue,
    /// Window surface for rendering.
    pub surface: Surface<'static>,
    /// Surface configuration.
    pub surface_config: SurfaceConfiguration,
    /// Window reference.
    pub window: Arc<Window>,
}

impl GpuContext {
    /// Create a new GPU context for the given window.
    ///
    /// This will:
    /// 1. Create a wgpu instance
    /// 2. Create a surface from the window
    /// 3. Request a high-performance adapter
    /// 4. Request a device with appropriate features and limits
    /// 5. Configure the surface for presentation
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        // Create wgpu instance with all available backends
        let instance = Instance::new(&InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            ..Default::default()
        });

        // Create surface from window
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| SimulationError::ResourceAllocationFailed(e.to_string()))?;

        // Request high-performance GPU adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(SimulationError::NoAdapter)?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);
        log::info!("Backend: {:?}", adapter.get_info().backend);

        // Request device
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: Self::required_features(&adapter),
                required_limits: Self::required_limits(&adapter),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await
            .map_err(|e| SimulationError::DeviceCreationFailed(e.to_string()))?;

        // Configure the surface
        let window_size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);

        // Prefer sRGB format for correct color rendering
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Surface format: {:?}", surface_format);

        let present_mode = Self::select_present_mode(&adapter, &surface, vsync);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC,
            format: surface_format,
            width: window_size.width.max(1),
            height: window_size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            window,
        })
    }

    /// Select the best present mode for the vsync flag.
    fn select_present_mode(adapter: &Adapter, surface: &Surface, vsync: bool) -> PresentMode {
        let caps = surface.get_capabilities(adapter);

        if vsync {
            return caps
                .present_modes
                .iter()
                .find(|m| **m == PresentMode::Fifo)
                .copied()
                .unwrap_or(caps.present_modes[0]);
        }

        // Uncapped preference: Mailbox > Immediate > FifoRelaxed > fallback
        caps.present_modes
            .iter()
            .find(|m| **m == PresentMode::Mailbox)
            .or_else(|| {
                caps.present_modes
                    .iter()
                    .find(|m| **m == PresentMode::Immediate)
            })
            .or_else(|| {
                caps.present_modes
                    .iter()
                    .find(|m| **m == PresentMode::FifoRelaxed)
            })
            .copied()
            .unwrap_or(caps.present_modes[0])
    }

    /// Get required GPU features for boid simulation.
    fn required_features(adapter: &Adapter) -> Features {
        let available = adapter.features();
        let mut features = Features::empty();

        // Enable GPU timestamps when fully supported so we can profile passes.
        if available.contains(Features::TIMESTAMP_QUERY)
            && available.contains(Features::TIMESTAMP_QUERY_INSIDE_PASSES)
        {
            features |= Features::TIMESTAMP_QUERY | Features::TIMESTAMP_QUERY_INSIDE_PASSES;
        }

        // Enable SHADER_F16 if available for bandwidth optimization.
        if available.contains(Features::SHADER_F16) {
            log::info!("Enabling SHADER_F16 feature");
            features |= Features::SHADER_F16;
        }

        // Keep other optional features off for maximum compatibility.
        features
    }

    /// Get required GPU limits for boid simulation.
    fn required_limits(adapter: &Adapter) -> Limits {
        // Start with adapter's supported limits and ensure minimum requirements
        let limits = adapter.limits();

        Limits {
            // Need enough storage buffer size for particles
            // 1M particles * 32 bytes = 32MB
            max_storage_buffer_binding_size: limits.max_storage_buffer_binding_size.max(128 << 20),
            // Need at least 4 storage buffers (particles, forces, interaction matrix, radius)
            max_storage_buffers_per_shader_stage: limits
                .max_storage_buffers_per_shader_stage
                .max(8),
            // Keep other limits at adapter defaults
            ..limits
        }
    }

    /// Resize the surface for a new window size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface.configure(&self.device, &self.surface_config);
            log::debug!("Resized surface to {}x{}", width, height);
        }
    }

    /// Get the current surface texture format.
    pub fn surface_format(&self) -> TextureFormat {
        self.surface_config.format
    }

    /// Get the current surface dimensions.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Get the current frame surface texture for rendering.
    ///
    /// Returns `None` if the surface is not ready (e.g., minimized).
    pub fn get_current_texture(&self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout");
                None
            }
            Err(wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                None
            }
            Err(wgpu::SurfaceError::Lost) => {
                log::warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                None
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                None
            }
            Err(wgpu::SurfaceError::Other) => {
                log::error!("Surface error: unknown");
                None
            }
        }
    }

    /// Submit a command buffer to the GPU.
    pub fn submit(&self, command_buffer: wgpu::CommandBuffer) {
        self.queue.submit(std::iter::once(command_buffer));
    }

    /// Update present mode to match the vsync flag and reconfigure the surface if needed.
    pub fn set_vsync(&mut self, vsync: bool) {
        let desired = Self::select_present_mode(&self.adapter, &self.surface, vsync);
        if desired != self.surface_config.present_mode {
            self.surface_config.present_mode = desired;
            self.surface.configure(&self.device, &self.surface_config);
            log::info!("Present mode updated to {:?} (vsync={})", desired, vsync);
        }
    }

    /// Submit multiple command buffers to the GPU.
    pub fn submit_multiple(&self, command_buffers: impl IntoIterator<Item = wgpu::CommandBuffer>) {
        self.queue.submit(command_buffers);
    }

    /// Create a command encoder for recording GPU commands.
    pub fn create_encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

}

#[cfg(test)]
mod tests {
    // GPU context tests require a window which is hard to create in unit tests.
    // Integration tests would be more appropriate for GPU context testing.
}
