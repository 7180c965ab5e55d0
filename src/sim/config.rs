//! Runtime simulation configuration and the dirty-flag bitset that drives
//! when buffers get rebuilt versus just re-uploaded, per §4.6.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::boundary::BoundaryMode;
use crate::sim::MIN_PERCEPTION;

/// Cursor interaction mode, mirroring the donor's brush/cursor concept but
/// generalized to the flocking force field in §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CursorMode {
    #[default]
    Off,
    Attract,
    Repel,
    Vortex,
}

impl CursorMode {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Cursor falloff shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CursorShape {
    #[default]
    Disc,
    Ring,
    Gaussian,
}

impl CursorShape {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Pointer-driven force field state, uploaded into the uniform block each frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CursorState {
    pub mode: CursorMode,
    pub shape: CursorShape,
    pub force: f32,
    pub radius: f32,
    pub vortex: f32,
    pub x: f32,
    pub y: f32,
    pub pressed: bool,
    pub active: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            mode: CursorMode::Off,
            shape: CursorShape::Disc,
            force: 0.0,
            radius: 80.0,
            vortex: 0.0,
            x: 0.0,
            y: 0.0,
            pressed: false,
            active: false,
        }
    }
}

/// Dirty-flag bitset from §4.6: each flag gates a distinct re-upload or
/// rebuild path so a single changed slider doesn't force a full buffer
/// reallocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirtyFlags {
    pub params_dirty: bool,
    pub species_dirty: bool,
    pub interactions_dirty: bool,
    pub curves_dirty: bool,
    pub wall_dirty: bool,
    pub needs_reallocate: bool,
    pub needs_trails_clear: bool,
    pub needs_reset: bool,
}

/// Top-level simulation configuration: world geometry, boundary topology,
/// global flocking knobs, and the dirty-flag bitset that tells the
/// orchestrator what to re-sync before the next frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub world: Vec2,
    pub boid_count: u32,
    pub boundary_mode: BoundaryMode,
    pub noise: f32,
    pub boid_size: f32,
    pub color_mode: u32,
    pub color_spectrum: u32,
    pub sensitivity: f32,
    pub time_scale: f32,
    pub saturation_source: u32,
    pub brightness_source: u32,
    pub spectral_mode: u32,
    pub global_collision: bool,
    /// Opt-in wider neighbor window: see the cell-size Open Question
    /// decision — `false` uses `perception / 3` cells with a 3x3 window,
    /// `true` uses `perception / 2` cells with a 5x5 window.
    pub wide_neighbor_window: bool,
    pub hue_curve_enabled: bool,
    pub saturation_curve_enabled: bool,
    pub brightness_curve_enabled: bool,
    pub cursor: CursorState,

    #[serde(skip)]
    pub dirty: DirtyFlags,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: Vec2::new(1280.0, 720.0),
            boid_count: 2_000,
            boundary_mode: BoundaryMode::default(),
            noise: 0.05,
            boid_size: 3.0,
            color_mode: 0,
            color_spectrum: 0,
            sensitivity: 1.0,
            time_scale: 1.0,
            saturation_source: 0,
            brightness_source: 0,
            spectral_mode: 0,
            global_collision: false,
            wide_neighbor_window: false,
            hue_curve_enabled: false,
            saturation_curve_enabled: false,
            brightness_curve_enabled: false,
            cursor: CursorState::default(),
            dirty: DirtyFlags::default(),
        }
    }
}

impl SimulationConfig {
    /// Base spatial-hash cell size for the minimum configured perception
    /// radius, per the cell-size Open Question decision. Callers that need
    /// a per-species cell size should use the minimum perception across the
    /// active `SpeciesTable` instead of a config-wide constant.
    pub fn cell_size_for_perception(&self, min_perception: f32) -> f32 {
        let perception = min_perception.max(MIN_PERCEPTION);
        if self.wide_neighbor_window {
            perception / 2.0
        } else {
            perception / 3.0
        }
    }

    /// Convenience accessor using a reasonable default perception when no
    /// species table is on hand (tests, CLI bring-up before species load).
    pub fn cell_size(&self) -> f32 {
        self.cell_size_for_perception(MIN_PERCEPTION * 3.0)
    }

    pub fn curves_enabled_bits(&self) -> u32 {
        (self.hue_curve_enabled as u32)
            | ((self.saturation_curve_enabled as u32) << 1)
            | ((self.brightness_curve_enabled as u32) << 2)
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty = DirtyFlags {
            params_dirty: true,
            species_dirty: true,
            interactions_dirty: true,
            curves_dirty: true,
            wall_dirty: true,
            needs_reallocate: true,
            needs_trails_clear: true,
            needs_reset: true,
        };
    }

    pub fn set_boundary_mode(&mut self, mode: BoundaryMode) {
        if mode != self.boundary_mode {
            self.boundary_mode = mode;
            self.dirty.wall_dirty = true;
            self.dirty.params_dirty = true;
        }
    }

    pub fn set_boid_count(&mut self, count: u32) {
        if count != self.boid_count {
            self.boid_count = count;
            self.dirty.needs_reallocate = true;
            self.dirty.needs_reset = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_neighbor_window_doubles_cell_radius() {
        let mut cfg = SimulationConfig::default();
        let narrow = cfg.cell_size_for_perception(90.0);
        cfg.wide_neighbor_window = true;
        let wide = cfg.cell_size_for_perception(90.0);
        assert!(wide > narrow);
    }

    #[test]
    fn changing_boundary_mode_marks_wall_dirty() {
        let mut cfg = SimulationConfig::default();
        cfg.set_boundary_mode(BoundaryMode::Torus);
        assert!(cfg.dirty.wall_dirty);
        assert!(cfg.dirty.params_dirty);
    }

    #[test]
    fn curves_enabled_bits_pack_independently() {
        let mut cfg = SimulationConfig::default();
        cfg.hue_curve_enabled = true;
        cfg.brightness_curve_enabled = true;
        assert_eq!(cfg.curves_enabled_bits(), 0b101);
    }
}
