//! Spatial hash benchmarks.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use boid_flock::sim::boid::Boid;
use boid_flock::sim::spatial_hash_ref::{SpatialGrid, build_sorted_grid};

fn make_boids(n: usize, world: glam::Vec2) -> Vec<Boid> {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..n)
        .map(|_| {
            Boid::new(
                rng.random::<f32>() * world.x,
                rng.random::<f32>() * world.y,
                0.0,
                0.0,
                0,
                0.0,
            )
        })
        .collect()
}

fn benchmark_build_sorted_grid(c: &mut Criterion) {
    let world = glam::Vec2::new(2000.0, 1500.0);
    let boids = make_boids(5_000, world);
    let grid = SpatialGrid::new(world, 50.0);

    c.bench_function("build_sorted_grid_5000", |b| {
        b.iter(|| build_sorted_grid(black_box(&boids), black_box(&grid)))
    });
}

criterion_group!(benches, benchmark_build_sorted_grid);
criterion_main!(benches);
