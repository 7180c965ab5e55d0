//! Species parameter records.

use bytemuck::{Pod, Zeroable};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sim::interaction::MAX_SPECIES;

/// Per-species cursor interaction weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorWeights {
    pub force: f32,
    pub response: f32,
    pub vortex: f32,
}

impl Default for CursorWeights {
    fn default() -> Self {
        Self {
            force: 1.0,
            response: 1.0,
            vortex: 0.0,
        }
    }
}

/// One species' flocking weights, appearance, and cursor-response settings.
///
/// The GPU-facing packed form is [`SpeciesParamsGpu`]; this is the
/// host-editable record the orchestrator stores and mutates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    pub alignment: f32,
    pub cohesion: f32,
    pub separation: f32,
    pub perception: f32,
    pub max_speed: f32,
    pub max_force: f32,
    /// Fraction (roughly [0, 0.2]) of this species that is rebel-prone.
    pub rebels: f32,

    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub head_shape: u32,
    pub size: f32,
    pub trail_length: u32,
    pub alpha_mode: u32,

    pub cursor: CursorWeights,
}

impl Default for SpeciesParams {
    fn default() -> Self {
        Self {
            alignment: 1.3,
            cohesion: 0.6,
            separation: 1.5,
            perception: 80.0,
            max_speed: 4.0,
            max_force: 0.12,
            rebels: 0.0,
            hue: 0.5,
            saturation: 0.8,
            lightness: 0.55,
            head_shape: 0,
            size: 4.0,
            trail_length: super::boid::TRAIL_CAPACITY as u32,
            alpha_mode: 0,
            cursor: CursorWeights::default(),
        }
    }
}

/// GPU-packed species parameter block: 5 four-float vectors per species, as
/// described in §3/§6 of the design document. Zero-padded for unused
/// species slots beyond the active count.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct SpeciesParamsGpu {
    // vec4: alignment, cohesion, separation, perception
    pub v0: [f32; 4],
    // vec4: maxSpeed, maxForce, noise-unused(rebels lives here), reserved
    pub v1: [f32; 4],
    // vec4: hue, saturation, lightness, size
    pub v2: [f32; 4],
    // vec4: headShape, trailLength, alphaMode, reserved
    pub v3: [f32; 4],
    // vec4: cursorForce, cursorResponse, cursorVortex, reserved
    pub v4: [f32; 4],
}

impl From<&SpeciesParams> for SpeciesParamsGpu {
    fn from(s: &SpeciesParams) -> Self {
        Self {
            v0: [s.alignment, s.cohesion, s.separation, s.perception],
            v1: [s.max_speed, s.max_force, s.rebels, 0.0],
            v2: [s.hue, s.saturation, s.lightness, s.size],
            v3: [
                s.head_shape as f32,
                s.trail_length as f32,
                s.alpha_mode as f32,
                0.0,
            ],
            v4: [s.cursor.force, s.cursor.response, s.cursor.vortex, 0.0],
        }
    }
}

/// Fixed-capacity table of up to [`MAX_SPECIES`] species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesTable {
    species: Vec<SpeciesParams>,
}

impl Default for SpeciesTable {
    fn default() -> Self {
        Self {
            species: vec![SpeciesParams::default()],
        }
    }
}

impl SpeciesTable {
    pub fn new(species: Vec<SpeciesParams>) -> Result<Self, String> {
        if species.is_empty() {
            return Err("species table must have at least one species".to_string());
        }
        if species.len() > MAX_SPECIES {
            return Err(format!(
                "species count {} exceeds MAX_SPECIES {}",
                species.len(),
                MAX_SPECIES
            ));
        }
        Ok(Self { species })
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&SpeciesParams> {
        self.species.get(id as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesParams> {
        self.species.iter()
    }

    /// Pack the full [`MAX_SPECIES`]-length GPU buffer, zero-padding unused slots.
    pub fn to_gpu_buffer(&self) -> [SpeciesParamsGpu; MAX_SPECIES] {
        let mut out = [SpeciesParamsGpu {
            v0: [0.0; 4],
            v1: [0.0; 4],
            v2: [0.0; 4],
            v3: [0.0; 4],
            v4: [0.0; 4],
        }; MAX_SPECIES];
        for (i, s) in self.species.iter().enumerate() {
            out[i] = s.into();
        }
        out
    }

    pub fn min_perception(&self) -> f32 {
        self.species
            .iter()
            .map(|s| s.perception)
            .fold(f32::INFINITY, f32::min)
    }

    /// Check that every boid's species id falls within this table, in
    /// parallel across the population. Run whenever the boid count or
    /// species count changes, since a stale species id left over from a
    /// shrunk table would index out of bounds on the GPU.
    pub fn validate_population(&self, boids: &[crate::sim::Boid]) -> Result<(), String> {
        let species_count = self.species.len() as u32;
        match boids.par_iter().find_any(|b| b.species >= species_count) {
            Some(boid) => Err(format!(
                "boid has species id {} but only {species_count} species are configured",
                boid.species
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_too_many_species() {
        let many = vec![SpeciesParams::default(); MAX_SPECIES + 1];
        assert!(SpeciesTable::new(many).is_err());
    }

    #[test]
    fn gpu_buffer_zero_pads_unused_slots() {
        let table = SpeciesTable::new(vec![SpeciesParams::default(); 2]).unwrap();
        let gpu = table.to_gpu_buffer();
        assert_eq!(gpu.len(), MAX_SPECIES);
        for slot in &gpu[2..] {
            assert_eq!(slot.v0, [0.0; 4]);
        }
    }
}
