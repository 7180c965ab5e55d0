//! CPU reference mirror of the flocking kernel (Pass 5): rebel selection,
//! neighbor enumeration via the spatial grid, alignment/cohesion/separation
//! with smooth kernels, interaction-rule steering, integration, boundary
//! application. The GPU kernel in
//! [`crate::renderer::gpu::pipelines::flocking`] implements the same
//! contract per-lane; this mirror is what the §8 property/scenario tests
//! exercise since the crate does not run the GPU toolchain under test.

use crate::sim::boid::{Boid, MAX_NEIGHBORS_PER_CELL};
use crate::sim::boundary::{self, BoundaryMode};
use crate::sim::interaction::{Behavior, InteractionMatrix};
use crate::sim::spatial_hash_ref::{SortedGrid, SpatialGrid};
use crate::sim::species::SpeciesTable;

/// `W_align(d, r) = (1 - d/r)^3`
fn w_align(d: f32, r: f32) -> f32 {
    if d >= r {
        0.0
    } else {
        let t = 1.0 - d / r;
        t * t * t
    }
}

/// `W_sep(d, r) = (1 - d/r)^2 * 2 / (d/r + 0.5)`
fn w_sep(d: f32, r: f32) -> f32 {
    if d >= r {
        0.0
    } else {
        let ratio = d / r;
        let t = 1.0 - ratio;
        t * t * 2.0 / (ratio + 0.5)
    }
}

fn limit(v: glam::Vec2, max_len: f32) -> glam::Vec2 {
    let len_sq = v.length_squared();
    if len_sq > max_len * max_len && len_sq > 0.0 {
        v * (max_len / len_sq.sqrt())
    } else {
        v
    }
}

/// Whether boid `i` is rebel-prone, derived from a hash of its index,
/// and whether it is currently inside its rebel window at `frame`.
fn is_rebelling(i: u32, rebels_fraction: f32, frame: u32) -> bool {
    let h = hash_u32(i.wrapping_mul(7919));
    let hash01 = (h % 1000) as f32 / 1000.0;
    if hash01 >= rebels_fraction * 5.0 {
        return false;
    }
    let phase = h % super::REBEL_PERIOD;
    let window = frame % super::REBEL_PERIOD;
    let since_phase = (window + super::REBEL_PERIOD - phase) % super::REBEL_PERIOD;
    since_phase < super::REBEL_DURATION
}

fn hash_u32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

fn random_unit(seed: u32) -> glam::Vec2 {
    let angle = (hash_u32(seed) % 6_283) as f32 / 1000.0;
    glam::Vec2::new(angle.cos(), angle.sin())
}

/// Parameters held constant across one reference-kernel invocation.
pub struct FlockingParams {
    pub world: glam::Vec2,
    pub boundary_mode: BoundaryMode,
    pub dt: f32,
    pub frame: u32,
    pub wide_neighbor_window: bool,
}

/// Advance every boid by one frame using the reference flocking algorithm.
/// Mirrors Pass 5's read-A/write-B contract by taking `boids` as the
/// authoritative "in" state and returning the "out" state.
pub fn step(
    boids: &[Boid],
    species: &SpeciesTable,
    matrix: &InteractionMatrix,
    grid: &SpatialGrid,
    sorted: &SortedGrid,
    params: &FlockingParams,
) -> Vec<Boid> {
    boids
        .iter()
        .enumerate()
        .map(|(i, b)| step_one(i as u32, b, boids, species, matrix, grid, sorted, params))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn step_one(
    i: u32,
    b: &Boid,
    boids: &[Boid],
    species: &SpeciesTable,
    matrix: &InteractionMatrix,
    grid: &SpatialGrid,
    sorted: &SortedGrid,
    params: &FlockingParams,
) -> Boid {
    let sp = species.get(b.species).copied().unwrap_or_default();
    let rebel_factor = if is_rebelling(i, sp.rebels, params.frame) {
        0.2
    } else {
        1.0
    };

    let mut align_sum = glam::Vec2::ZERO;
    let mut cohesion_sum = glam::Vec2::ZERO;
    let mut separation_sum = glam::Vec2::ZERO;
    let mut neighbor_count = 0u32;
    let mut interaction_force = glam::Vec2::ZERO;

    let (cx, cy) = grid.cell_coords(b.position());
    let window = if params.wide_neighbor_window { 2 } else { 1 };

    for dy in -window..=window {
        for dx in -window..=window {
            let ncx = cx + dx;
            let ncy = cy + dy;
            let rules = params.boundary_mode.rules();
            let out_of_bounds_x = ncx < 0 || ncx >= grid.grid_w as i32;
            let out_of_bounds_y = ncy < 0 || ncy >= grid.grid_h as i32;
            if (out_of_bounds_x && !rules.wrap_x) || (out_of_bounds_y && !rules.wrap_y) {
                continue;
            }

            let mirror_x = out_of_bounds_x && rules.flip_on_wrap_x;
            let mirror_y = out_of_bounds_y && rules.flip_on_wrap_y;
            let slot = grid.hash_flip_aware(ncx, ncy, mirror_x, mirror_y);
            if slot as usize >= sorted.cell_counts.len() {
                continue;
            }

            let count = sorted.cell_counts[slot as usize].min(MAX_NEIGHBORS_PER_CELL as u32);
            let start = sorted.prefix_sums[slot as usize] as usize;
            for k in 0..count as usize {
                let j = sorted.sorted_indices[start + k];
                if j == i {
                    continue;
                }
                let other = &boids[j as usize];
                let mut delta =
                    boundary::wrapped_delta(b.position(), other.position(), params.world, params.boundary_mode);
                let dist_sq = delta.length_squared();
                if dist_sq >= sp.perception * sp.perception {
                    continue;
                }
                if dist_sq < 1e-2 {
                    delta = random_unit(i ^ j) * 0.1;
                }
                let dist = delta.length().max(1e-4);

                if other.species == b.species {
                    let aw = w_align(dist, sp.perception);
                    if aw > 0.0 {
                        align_sum += other.velocity() * aw;
                        cohesion_sum += delta * aw;
                        neighbor_count += 1;
                    }
                    let sw = w_sep(dist, sp.perception * 0.5);
                    if sw > 0.0 {
                        separation_sum -= delta.normalize_or_zero() * sw;
                    }
                } else {
                    let rule = matrix.get(b.species, other.species);
                    if rule.behavior != Behavior::Ignore && dist < rule.range {
                        interaction_force += interaction_steer(rule.behavior, delta, other.velocity())
                            * rule.strength;
                    }
                }
            }
        }
    }

    let mut accel = glam::Vec2::ZERO;
    if neighbor_count > 0 {
        let inv_n = 1.0 / neighbor_count as f32;
        let align = limit((align_sum * inv_n) - b.velocity(), sp.max_force) * rebel_factor;
        let cohesion = limit(cohesion_sum * inv_n, sp.max_force) * rebel_factor;
        accel += align * sp.alignment + cohesion * sp.cohesion;
    }
    accel += limit(separation_sum, sp.max_force * 3.0) * sp.separation;
    accel += limit(interaction_force, sp.max_force * 3.0);

    let mut vel = b.velocity() + accel;
    if !vel.is_finite() {
        // Numerical error recovery (§7): resample a random unit velocity
        // scaled to 0.3 * max_speed rather than propagating NaN.
        vel = random_unit(i.wrapping_add(params.frame)) * (0.3 * sp.max_speed);
    }
    vel = limit(vel, sp.max_speed);
    let min_speed = 0.3 * sp.max_speed;
    if vel.length() < min_speed {
        vel = if vel.length_squared() > 1e-8 {
            vel.normalize() * min_speed
        } else {
            random_unit(i.wrapping_add(1)) * min_speed
        };
    }

    let dt = params.dt.clamp(0.0, 0.1);
    let mut pos = b.position() + vel * dt * 60.0;
    apply_boundary_out(&mut pos, &mut vel, params);

    let mut out = *b;
    out.set_position(pos);
    out.set_velocity(vel);
    out
}

fn apply_boundary_out(pos: &mut glam::Vec2, vel: &mut glam::Vec2, params: &FlockingParams) {
    boundary::apply_boundary(pos, vel, params.boundary_mode, params.world);
}

fn interaction_steer(behavior: Behavior, delta_to_other: glam::Vec2, other_vel: glam::Vec2) -> glam::Vec2 {
    let dir = delta_to_other.normalize_or_zero();
    match behavior {
        Behavior::Ignore => glam::Vec2::ZERO,
        Behavior::Avoid => -dir,
        Behavior::Pursue => dir,
        Behavior::Attract => dir,
        Behavior::Mirror => other_vel.normalize_or_zero(),
        Behavior::Orbit => glam::Vec2::new(-dir.y, dir.x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::interaction::{InteractionEntry, InteractionRule};
    use crate::sim::species::SpeciesParams;
    use rand::Rng;
    use rand::SeedableRng;

    fn spawn_random(n: usize, world: glam::Vec2, speed: f32, seed: u64) -> Vec<Boid> {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                let x = rng.random_range(0.0..world.x);
                let y = rng.random_range(0.0..world.y);
                let angle: f32 = rng.random_range(0.0..std::f32::consts::TAU);
                Boid::new(x, y, angle.cos() * speed, angle.sin() * speed, 0, 0.0)
            })
            .collect()
    }

    fn run(
        mut boids: Vec<Boid>,
        species: &SpeciesTable,
        matrix: &InteractionMatrix,
        world: glam::Vec2,
        frames: u32,
        mode: BoundaryMode,
    ) -> Vec<Boid> {
        for frame in 0..frames {
            let cell_size = species.min_perception();
            let grid = SpatialGrid::new(world, cell_size);
            let sorted = crate::sim::spatial_hash_ref::build_sorted_grid(&boids, &grid);
            let params = FlockingParams {
                world,
                boundary_mode: mode,
                dt: 1.0 / 60.0,
                frame,
                wide_neighbor_window: false,
            };
            boids = step(&boids, species, matrix, &grid, &sorted, &params);
        }
        boids
    }

    // E1: single-species coherence.
    #[test]
    fn single_species_converges_toward_aligned_velocity() {
        let world = glam::Vec2::new(800.0, 600.0);
        let species = SpeciesTable::new(vec![SpeciesParams {
            alignment: 1.3,
            cohesion: 0.6,
            separation: 1.5,
            perception: 80.0,
            max_speed: 4.0,
            ..Default::default()
        }])
        .unwrap();
        let matrix = InteractionMatrix::default();
        let boids = spawn_random(1000, world, 2.0, 42);
        let result = run(boids, &species, &matrix, world, 600, BoundaryMode::Torus);

        let mean = result
            .iter()
            .fold(glam::Vec2::ZERO, |acc, b| acc + b.velocity().normalize_or_zero())
            / result.len() as f32;
        let mean_alignment: f32 = result
            .iter()
            .map(|b| b.velocity().normalize_or_zero().dot(mean.normalize_or_zero()))
            .sum::<f32>()
            / result.len() as f32;
        assert!(mean_alignment > 0.5, "mean alignment was {mean_alignment}");
    }

    // E2: separation under crowding.
    #[test]
    fn crowded_boids_spread_out_under_separation() {
        let world = glam::Vec2::new(800.0, 600.0);
        let species = SpeciesTable::new(vec![SpeciesParams {
            separation: 2.0,
            perception: 60.0,
            max_speed: 4.0,
            ..Default::default()
        }])
        .unwrap();
        let matrix = InteractionMatrix::default();

        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let boids: Vec<Boid> = (0..2000)
            .map(|_| {
                let x = 350.0 + rng.random_range(0.0..100.0);
                let y = 250.0 + rng.random_range(0.0..100.0);
                Boid::new(x, y, 0.0, 0.0, 0, 0.0)
            })
            .collect();

        fn p95_pairwise(boids: &[Boid], sample: usize, seed: u64) -> f32 {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
            let mut dists = Vec::with_capacity(sample);
            for _ in 0..sample {
                let a = rng.random_range(0..boids.len());
                let b = rng.random_range(0..boids.len());
                dists.push(boids[a].position().distance(boids[b].position()));
            }
            dists.sort_by(|a, b| a.partial_cmp(b).unwrap());
            dists[(dists.len() as f32 * 0.95) as usize]
        }

        let p95_start = p95_pairwise(&boids, 2000, 1);
        let result = run(boids, &species, &matrix, world, 200, BoundaryMode::Torus);
        let p95_end = p95_pairwise(&result, 2000, 1);

        assert!(p95_end > p95_start * 2.0, "{p95_end} vs start {p95_start}");
    }

    // E6: predator-prey species separation under Pursue/Avoid.
    #[test]
    fn predator_prey_distance_trends_downward() {
        let world = glam::Vec2::new(800.0, 600.0);
        let species = SpeciesTable::new(vec![
            SpeciesParams {
                perception: 80.0,
                max_speed: 4.0,
                ..Default::default()
            },
            SpeciesParams {
                perception: 80.0,
                max_speed: 4.0,
                ..Default::default()
            },
        ])
        .unwrap();
        let entries = vec![
            InteractionEntry {
                source: 0,
                target: Some(1),
                rule: InteractionRule {
                    behavior: Behavior::Pursue,
                    strength: 0.8,
                    range: 300.0,
                },
            },
            InteractionEntry {
                source: 1,
                target: Some(0),
                rule: InteractionRule {
                    behavior: Behavior::Avoid,
                    strength: 0.8,
                    range: 300.0,
                },
            },
        ];
        let matrix = InteractionMatrix::expand_all_others(&entries, 2);

        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(99);
        let mut boids = Vec::new();
        for species_id in 0..2u32 {
            for _ in 0..1000 {
                let x = rng.random_range(0.0..world.x);
                let y = rng.random_range(0.0..world.y);
                boids.push(Boid::new(x, y, 0.0, 0.0, species_id, 0.0));
            }
        }

        fn centroid_distance(boids: &[Boid]) -> f32 {
            let (mut c0, mut c1, mut n0, mut n1) = (glam::Vec2::ZERO, glam::Vec2::ZERO, 0u32, 0u32);
            for b in boids {
                if b.species == 0 {
                    c0 += b.position();
                    n0 += 1;
                } else {
                    c1 += b.position();
                    n1 += 1;
                }
            }
            (c0 / n0.max(1) as f32).distance(c1 / n1.max(1) as f32)
        }

        let mut distances = vec![centroid_distance(&boids)];
        let mut state = boids;
        for frame in 0..300 {
            let cell_size = species.min_perception();
            let grid = SpatialGrid::new(world, cell_size);
            let sorted = crate::sim::spatial_hash_ref::build_sorted_grid(&state, &grid);
            let params = FlockingParams {
                world,
                boundary_mode: BoundaryMode::Torus,
                dt: 1.0 / 60.0,
                frame,
                wide_neighbor_window: false,
            };
            state = step(&state, &species, &matrix, &grid, &sorted, &params);
            distances.push(centroid_distance(&state));
        }

        let windows: Vec<f32> = distances.windows(31).map(|w| w[30] - w[0]).collect();
        let decreasing = windows.iter().filter(|&&d| d < 0.0).count();
        let ratio = decreasing as f32 / windows.len() as f32;
        assert!(ratio >= 0.8, "only {ratio} of windows decreased");
    }
}
