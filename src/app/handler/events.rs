//! Winit `ApplicationHandler` implementation: window lifecycle, input, and
//! the redraw-driven render loop.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{WindowAttributes, WindowId},
};

use super::SimHandler;

impl ApplicationHandler for SimHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_none() && self.init_error.is_none() {
            let window_attrs = WindowAttributes::default()
                .with_title(&self.sim.config.title)
                .with_inner_size(LogicalSize::new(
                    self.sim.config.window_width,
                    self.sim.config.window_height,
                ));

            let window = match event_loop.create_window(window_attrs) {
                Ok(window) => Arc::new(window),
                Err(e) => {
                    log::error!("Failed to create window: {e}");
                    event_loop.exit();
                    return;
                }
            };

            self.init_gpu(window);
            if self.init_error.is_some() {
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                if let Err(e) = self.sim.save_config() {
                    log::error!("Failed to save app config: {e}");
                }
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.context.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.update();
                if let Some(gpu) = &self.gpu {
                    gpu.context.window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    use winit::keyboard::{KeyCode, PhysicalKey};
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Space) => self.sim.toggle_running(),
                        PhysicalKey::Code(KeyCode::KeyR) => self.sim.regenerate(),
                        PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.context.window.request_redraw();
        }
    }
}
