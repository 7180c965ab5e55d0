//! CPU reference mirror of the spatial-hash builder (Passes 1-4): the
//! locally-perfect hash, an exclusive prefix sum equivalent in effect to the
//! GPU's Blelloch scan, and the scatter pass. Used by property tests for
//! invariants 1-4 and 9; the GPU kernels in
//! [`crate::renderer::gpu::pipelines::spatial`] implement the same contract
//! with a block-aggregated parallel scan.

use crate::sim::boid::Boid;

/// A uniform grid over the canvas, addressed with the locally-perfect hash
/// described in §3 of the design document.
#[derive(Debug, Clone, Copy)]
pub struct SpatialGrid {
    pub cell_size: f32,
    pub grid_w: u32,
    pub grid_h: u32,
    /// Width of the grid once cut into 3x3 super-cells.
    pub reduced_width: u32,
    pub reduced_height: u32,
}

impl SpatialGrid {
    pub fn new(world: glam::Vec2, cell_size: f32) -> Self {
        let cell_size = cell_size.max(super::MIN_PERCEPTION);
        let grid_w = (world.x / cell_size).ceil().max(1.0) as u32;
        let grid_h = (world.y / cell_size).ceil().max(1.0) as u32;
        let reduced_width = grid_w.div_ceil(3);
        let reduced_height = grid_h.div_ceil(3);
        Self {
            cell_size,
            grid_w,
            grid_h,
            reduced_width,
            reduced_height,
        }
    }

    pub fn total_slots(&self) -> u32 {
        9 * self.reduced_width * self.reduced_height
    }

    pub fn cell_coords(&self, pos: glam::Vec2) -> (i32, i32) {
        let cx = (pos.x / self.cell_size).floor() as i32;
        let cy = (pos.y / self.cell_size).floor() as i32;
        (
            cx.clamp(0, self.grid_w as i32 - 1),
            cy.clamp(0, self.grid_h as i32 - 1),
        )
    }

    /// The locally-perfect hash: `κ = 3·(cx mod 3) + (cy mod 3)`,
    /// `β = ⌊cy/3⌋·reducedWidth + ⌊cx/3⌋`, `slot = 9·β + κ`.
    pub fn hash(&self, cx: i32, cy: i32) -> u32 {
        let kappa = 3 * cx.rem_euclid(3) + cy.rem_euclid(3);
        let beta = (cy.div_euclid(3)) as u32 * self.reduced_width + (cx.div_euclid(3)) as u32;
        9 * beta + kappa as u32
    }

    /// Flip-aware hash used when a 3x3/5x5 neighbor window crosses a flip
    /// boundary: the orthogonal axis is mirrored before hashing so the
    /// mirrored cell is reached, per §4.3.
    pub fn hash_flip_aware(&self, cx: i32, cy: i32, mirror_x: bool, mirror_y: bool) -> u32 {
        let cx = if mirror_x {
            self.grid_w as i32 - 1 - cx.rem_euclid(self.grid_w as i32)
        } else {
            cx.rem_euclid(self.grid_w as i32)
        };
        let cy = if mirror_y {
            self.grid_h as i32 - 1 - cy.rem_euclid(self.grid_h as i32)
        } else {
            cy.rem_euclid(self.grid_h as i32)
        };
        self.hash(cx, cy)
    }
}

/// Result of running the full CPU reference Pass 1-4 pipeline.
pub struct SortedGrid {
    pub cell_counts: Vec<u32>,
    pub prefix_sums: Vec<u32>,
    pub sorted_indices: Vec<u32>,
    pub boid_cell_index: Vec<u32>,
}

/// Run the reference clear/count/scan/scatter pipeline over `boids`.
pub fn build_sorted_grid(boids: &[Boid], grid: &SpatialGrid) -> SortedGrid {
    let slots = grid.total_slots() as usize;

    // Pass 1: clear.
    let mut cell_counts = vec![0u32; slots];
    let mut cell_offsets = vec![0u32; slots];

    // Pass 2: count.
    let mut boid_cell_index = vec![0u32; boids.len()];
    for (i, b) in boids.iter().enumerate() {
        let (cx, cy) = grid.cell_coords(b.position());
        let slot = grid.hash(cx, cy);
        boid_cell_index[i] = slot;
        cell_counts[slot as usize] += 1;
    }

    // Pass 3/3a/3b: exclusive prefix sum. The GPU does this as a
    // Blelloch up-sweep/down-sweep with a block-sum stage; the CPU mirror
    // only needs the same output contract (invariant 3), so a plain
    // sequential scan is equivalent in effect.
    let mut prefix_sums = vec![0u32; slots];
    let mut running = 0u32;
    for i in 0..slots {
        prefix_sums[i] = running;
        running += cell_counts[i];
    }

    // Pass 4: scatter.
    let mut sorted_indices = vec![0u32; boids.len()];
    for (i, &slot) in boid_cell_index.iter().enumerate() {
        let offset = cell_offsets[slot as usize];
        cell_offsets[slot as usize] += 1;
        sorted_indices[(prefix_sums[slot as usize] + offset) as usize] = i as u32;
    }

    SortedGrid {
        cell_counts,
        prefix_sums,
        sorted_indices,
        boid_cell_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_boids(positions: &[(f32, f32)]) -> Vec<Boid> {
        positions
            .iter()
            .map(|&(x, y)| Boid::new(x, y, 0.0, 0.0, 0, 0.0))
            .collect()
    }

    // Invariant 9: locally-perfect hash collision-freeness.
    #[test]
    fn hash_is_collision_free_within_3x3_window() {
        let grid = SpatialGrid::new(glam::Vec2::new(800.0, 600.0), 80.0);
        for cx in 0..grid.grid_w as i32 {
            for cy in 0..grid.grid_h as i32 {
                let base = grid.hash(cx, cy);
                for dx in -1..=1i32 {
                    for dy in -1..=1i32 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let (nx, ny) = (cx + dx, cy + dy);
                        if nx < 0 || ny < 0 || nx >= grid.grid_w as i32 || ny >= grid.grid_h as i32 {
                            continue;
                        }
                        assert_ne!(base, grid.hash(nx, ny), "collision at ({cx},{cy}) + ({dx},{dy})");
                    }
                }
            }
        }
    }

    // Invariant 1/4: sum preservation.
    #[test]
    fn cell_counts_sum_to_boid_count() {
        let boids = make_boids(&[(1.0, 1.0), (50.0, 50.0), (799.0, 599.0), (400.0, 300.0)]);
        let grid = SpatialGrid::new(glam::Vec2::new(800.0, 600.0), 80.0);
        let result = build_sorted_grid(&boids, &grid);
        let total: u32 = result.cell_counts.iter().sum();
        assert_eq!(total, boids.len() as u32);
    }

    // Invariant 3: prefix-sum exclusivity.
    #[test]
    fn prefix_sum_is_exclusive() {
        let boids = make_boids(&[(1.0, 1.0), (1.0, 1.0), (400.0, 300.0)]);
        let grid = SpatialGrid::new(glam::Vec2::new(800.0, 600.0), 80.0);
        let result = build_sorted_grid(&boids, &grid);
        assert_eq!(result.prefix_sums[0], 0);
        for c in 0..result.cell_counts.len() - 1 {
            assert_eq!(
                result.prefix_sums[c + 1] - result.prefix_sums[c],
                result.cell_counts[c]
            );
        }
    }

    // Invariant 2 / scenario E5: scatter correctness by full enumeration.
    #[test]
    fn scatter_matches_cached_cell_index() {
        let boids = make_boids(&[
            (5.0, 5.0),
            (5.0, 5.0),
            (300.0, 300.0),
            (799.0, 599.0),
            (120.0, 400.0),
        ]);
        let grid = SpatialGrid::new(glam::Vec2::new(800.0, 600.0), 80.0);
        let result = build_sorted_grid(&boids, &grid);
        for (cell, &count) in result.cell_counts.iter().enumerate() {
            let start = result.prefix_sums[cell] as usize;
            for k in 0..count as usize {
                let boid_idx = result.sorted_indices[start + k] as usize;
                assert_eq!(result.boid_cell_index[boid_idx], cell as u32);
            }
        }
    }
}
