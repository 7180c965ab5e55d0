//! The 256-byte fixed-layout uniform block shared by every kernel. Defined
//! once here; every pipeline module binds the same struct so offsets never
//! drift between kernels (§9: "Dynamic `number` in uniforms" re-architected
//! into a single packed layout written via typed views).

use bytemuck::{Pod, Zeroable};

use crate::sim::boundary::BoundaryMode;
use crate::sim::config::{CursorMode, CursorShape, SimulationConfig};

/// Fixed byte size of [`UniformBlock`], matching §6's "Uniform block (256
/// bytes, fixed layout)".
pub const UNIFORM_SIZE: usize = 256;

/// The canonical uniform block, `#[repr(C)]` and `Pod` so it can be written
/// directly with `queue.write_buffer`. Field order follows §6's listing;
/// trailing `reserved` padding brings the struct to exactly
/// [`UNIFORM_SIZE`] bytes.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct UniformBlock {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub cell_size: f32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub boid_count: u32,
    pub trail_length: u32,
    pub trail_head: u32,

    pub alignment: f32,
    pub cohesion: f32,
    pub separation: f32,
    pub perception: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub noise: f32,
    pub rebels: f32,

    pub boundary_mode: u32,
    pub cursor_mode: u32,
    pub cursor_shape: u32,
    pub cursor_vortex: f32,

    pub cursor_force: f32,
    pub cursor_radius: f32,
    pub cursor_x: f32,
    pub cursor_y: f32,

    pub cursor_pressed: u32,
    pub cursor_active: u32,
    pub boid_size: f32,
    pub color_mode: u32,

    pub color_spectrum: u32,
    pub sensitivity: f32,
    pub delta_time: f32,
    pub time: f32,

    pub frame_count: u32,
    pub time_scale: f32,
    pub saturation_source: u32,
    pub brightness_source: u32,

    pub spectral_mode: u32,
    pub reduced_width: u32,
    pub total_slots: u32,
    pub global_collision: u32,

    /// Bitset: bit 0 = hue curve enabled, bit 1 = saturation, bit 2 = brightness.
    pub curves_enabled: u32,
    /// Opt-in quality setting from the cellSize Open Question decision:
    /// 0 = perception / 3x3 window, 1 = perception/2 / 5x5 window.
    pub wide_neighbor_window: u32,

    pub reserved: [u32; 22],
}

const _: () = assert!(std::mem::size_of::<UniformBlock>() == UNIFORM_SIZE);

impl UniformBlock {
    pub fn from_state(
        cfg: &SimulationConfig,
        species_defaults: ActiveSpeciesDefaults,
        grid_width: u32,
        grid_height: u32,
        reduced_width: u32,
        total_slots: u32,
        trail_head: u32,
        delta_time: f32,
        time: f32,
        frame_count: u32,
    ) -> Self {
        Self {
            canvas_width: cfg.world.x,
            canvas_height: cfg.world.y,
            cell_size: cfg.cell_size(),
            grid_width,
            grid_height,
            boid_count: cfg.boid_count,
            trail_length: crate::sim::boid::TRAIL_CAPACITY as u32,
            trail_head,

            alignment: species_defaults.alignment,
            cohesion: species_defaults.cohesion,
            separation: species_defaults.separation,
            perception: species_defaults.perception,
            max_speed: species_defaults.max_speed,
            max_force: species_defaults.max_force,
            noise: cfg.noise,
            rebels: species_defaults.rebels,

            boundary_mode: cfg.boundary_mode.code(),
            cursor_mode: cfg.cursor.mode.code(),
            cursor_shape: cfg.cursor.shape.code(),
            cursor_vortex: cfg.cursor.vortex,

            cursor_force: cfg.cursor.force,
            cursor_radius: cfg.cursor.radius,
            cursor_x: cfg.cursor.x,
            cursor_y: cfg.cursor.y,

            cursor_pressed: cfg.cursor.pressed as u32,
            cursor_active: cfg.cursor.active as u32,
            boid_size: cfg.boid_size,
            color_mode: cfg.color_mode,

            color_spectrum: cfg.color_spectrum,
            sensitivity: cfg.sensitivity,
            delta_time,
            time,

            frame_count,
            time_scale: cfg.time_scale,
            saturation_source: cfg.saturation_source,
            brightness_source: cfg.brightness_source,

            spectral_mode: cfg.spectral_mode,
            reduced_width,
            total_slots,
            global_collision: cfg.global_collision as u32,

            curves_enabled: cfg.curves_enabled_bits(),
            wide_neighbor_window: cfg.wide_neighbor_window as u32,

            reserved: [0; 22],
        }
    }
}

/// The "active species" defaults §6 names for the uniform block — when
/// multiple species are configured, these are the first species' flocking
/// weights, used by legacy single-species-shaped consumers; per-species
/// overrides come from the species parameter block.
pub struct ActiveSpeciesDefaults {
    pub alignment: f32,
    pub cohesion: f32,
    pub separation: f32,
    pub perception: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub rebels: f32,
}

#[allow(dead_code)]
fn boundary_mode_round_trip(mode: BoundaryMode) -> u32 {
    mode.code()
}

#[allow(dead_code)]
fn cursor_mode_round_trip(mode: CursorMode) -> u32 {
    mode.code()
}

#[allow(dead_code)]
fn cursor_shape_round_trip(shape: CursorShape) -> u32 {
    shape.code()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_is_exactly_256_bytes() {
        assert_eq!(std::mem::size_of::<UniformBlock>(), UNIFORM_SIZE);
    }
}
