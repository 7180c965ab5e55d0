//! Per-boid state: the ping-pong position/velocity pair, species id, birth
//! color, trail ring, metrics, and cached cell index.

use bytemuck::{Pod, Zeroable};

/// Capacity of each boid's trail ring buffer.
pub const TRAIL_CAPACITY: usize = 16;

/// Cap on indices walked per candidate cell during neighbor enumeration.
pub const MAX_NEIGHBORS_PER_CELL: usize = 64;

/// One simulated agent, mirroring the GPU's per-boid storage-buffer layout.
///
/// On the GPU these fields live in separate SoA arrays (positions A/B,
/// velocities A/B, species ids, ...); this AoS struct is the CPU-side mirror
/// used by the reference algorithms and property tests in [`crate::sim`].
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Boid {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub species: u32,
    /// Set once at spawn from the angle to canvas center; never mutated.
    pub birth_color: f32,
    /// Cached locally-perfect hash slot, recomputed every frame in Pass 2.
    pub cell_index: u32,
    pub _padding: u32,
}

impl Boid {
    pub fn new(x: f32, y: f32, vx: f32, vy: f32, species: u32, birth_color: f32) -> Self {
        Self {
            x,
            y,
            vx,
            vy,
            species,
            birth_color,
            cell_index: 0,
            _padding: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> glam::Vec2 {
        glam::Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn set_position(&mut self, pos: glam::Vec2) {
        self.x = pos.x;
        self.y = pos.y;
    }

    #[inline]
    pub fn velocity(&self) -> glam::Vec2 {
        glam::Vec2::new(self.vx, self.vy)
    }

    #[inline]
    pub fn set_velocity(&mut self, vel: glam::Vec2) {
        self.vx = vel.x;
        self.vy = vel.y;
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity().length()
    }

    /// True when the velocity carries a NaN or infinite component, the
    /// trigger condition for the numerical-error recovery path in the
    /// integration step (see [`crate::sim::flocking_ref`]).
    #[inline]
    pub fn has_invalid_velocity(&self) -> bool {
        !self.vx.is_finite() || !self.vy.is_finite()
    }
}

/// Per-boid metrics record: density, anisotropy, true turning, spectral/flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BoidMetrics {
    pub density: f32,
    pub anisotropy: f32,
    pub turning: f32,
    pub spectral: f32,
}

/// Global trail ring storage: `TRAIL_CAPACITY` positions per boid, plus one
/// shared `head` advanced once per frame by the orchestrator before dispatch.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    positions: Vec<[f32; 2]>,
    boid_count: usize,
    pub head: usize,
}

impl TrailBuffer {
    pub fn new(boid_count: usize) -> Self {
        Self {
            positions: vec![[0.0, 0.0]; boid_count * TRAIL_CAPACITY],
            boid_count,
            head: 0,
        }
    }

    /// Advance the shared ring head by one slot, wrapping at `TRAIL_CAPACITY`.
    pub fn advance(&mut self) {
        self.head = (self.head + 1) % TRAIL_CAPACITY;
    }

    /// Store `pos` for `boid` at the current head slot.
    pub fn write(&mut self, boid: usize, pos: glam::Vec2) {
        self.positions[boid * TRAIL_CAPACITY + self.head] = [pos.x, pos.y];
    }

    /// Read the slot `offset` steps behind the current head (0 = newest).
    pub fn read(&self, boid: usize, offset_back: usize) -> glam::Vec2 {
        let slot = (self.head + TRAIL_CAPACITY - (offset_back % TRAIL_CAPACITY)) % TRAIL_CAPACITY;
        let [x, y] = self.positions[boid * TRAIL_CAPACITY + slot];
        glam::Vec2::new(x, y)
    }

    pub fn boid_count(&self) -> usize {
        self.boid_count
    }

    /// Flat view of the backing storage, in the layout the GPU trail buffer
    /// expects: `boid_count * TRAIL_CAPACITY` `[f32; 2]` positions.
    pub fn raw(&self) -> &[[f32; 2]] {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boid_round_trips_position_and_velocity() {
        let mut b = Boid::new(1.0, 2.0, 0.0, 0.0, 3, 0.5);
        b.set_position(glam::Vec2::new(10.0, 20.0));
        b.set_velocity(glam::Vec2::new(3.0, 4.0));
        assert_eq!(b.position(), glam::Vec2::new(10.0, 20.0));
        assert!((b.speed() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_velocity_is_detected() {
        let mut b = Boid::new(0.0, 0.0, 0.0, 0.0, 0, 0.0);
        b.vx = f32::NAN;
        assert!(b.has_invalid_velocity());
        b.vx = 0.0;
        assert!(!b.has_invalid_velocity());
    }

    // Testable property 7: ring correctness.
    #[test]
    fn trail_ring_correctness() {
        let mut trails = TrailBuffer::new(2);
        trails.advance();
        trails.write(0, glam::Vec2::new(5.0, 6.0));
        assert_eq!(trails.read(0, 0), glam::Vec2::new(5.0, 6.0));

        trails.advance();
        trails.write(0, glam::Vec2::new(7.0, 8.0));
        // Reading the slot just written after the latest advance.
        assert_eq!(trails.read(0, 0), glam::Vec2::new(7.0, 8.0));
        // The previously written slot is still reachable one step back.
        assert_eq!(trails.read(0, 1), glam::Vec2::new(5.0, 6.0));
    }
}
