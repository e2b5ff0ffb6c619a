//! Benchmarks for the flock kernel and animation baking.
//!
//! Run with: `cargo bench`

use arflock::affector::{Affector, AffectorAxis};
use arflock::animation::{AnimationSource, AnimationTable, KeyframeClip};
use arflock::kernel::{run_tick, TickContext};
use arflock::store::{seed_boids, BoidStore, SeedSettings};
use arflock::{FlockParams, Quat, Vec3};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn store(count: usize) -> BoidStore {
    let settings = SeedSettings {
        count,
        seed: Some(42),
        ..Default::default()
    };
    BoidStore::new(seed_boids(&settings, Vec3::ZERO, Quat::IDENTITY))
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    let affectors = [Affector::tracking(Vec3::new(1.0, 1.6, 0.0), Vec3::ZERO, 0.2, 0.5)];

    for count in [256, 1024, 4096] {
        group.bench_with_input(BenchmarkId::new("stride_1", count), &count, |b, &count| {
            let mut boids = store(count);
            let mut tick = 0;
            b.iter(|| {
                let ctx = TickContext {
                    params: FlockParams::default(),
                    affectors: &affectors,
                    flock_position: Vec3::ZERO,
                    dt: 1.0 / 60.0,
                    time: tick as f32 / 60.0,
                    tick,
                    total_frames: 16,
                };
                run_tick(black_box(&mut boids), &ctx);
                tick += 1;
            })
        });
    }

    for stride in [2u32, 4, 8] {
        group.bench_with_input(BenchmarkId::new("4096_stride", stride), &stride, |b, &stride| {
            let mut boids = store(4096);
            let params = FlockParams {
                step_boid_check_neighbours: stride,
                ..Default::default()
            };
            let mut tick = 0;
            b.iter(|| {
                let ctx = TickContext {
                    params,
                    affectors: &affectors,
                    flock_position: Vec3::ZERO,
                    dt: 1.0 / 60.0,
                    time: tick as f32 / 60.0,
                    tick,
                    total_frames: 16,
                };
                run_tick(black_box(&mut boids), &ctx);
                tick += 1;
            })
        });
    }

    group.finish();
}

fn bench_affectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("affectors");
    let boids = store(1);
    let position = boids.boids()[0].position;

    for count in [1usize, 16, 128] {
        let points: Vec<Vec3> = (0..count)
            .map(|i| Vec3::new((i as f32 * 0.37).sin(), 0.0, (i as f32 * 0.37).cos()) * 0.3)
            .collect();
        let affectors = arflock::affectors_from_points(&points, 0.5, 0.4, AffectorAxis::Point);
        group.bench_with_input(BenchmarkId::new("influence", count), &affectors, |b, affectors| {
            b.iter(|| {
                black_box(arflock::kernel::affector_influence(
                    black_box(position),
                    affectors,
                    Vec3::ZERO,
                    2.0,
                ))
            })
        });
    }

    group.finish();
}

fn bench_animation_bake(c: &mut Criterion) {
    let vertices = 2048;
    let keyframes: Vec<Vec<Vec3>> = (0..30)
        .map(|f| {
            (0..vertices)
                .map(|v| Vec3::new(v as f32, f as f32, 0.0))
                .collect()
        })
        .collect();

    c.bench_function("bake_30fps_1s_2048_vertices", |b| {
        b.iter(|| {
            let mut clip = KeyframeClip::new(keyframes.clone(), 30.0);
            black_box(AnimationTable::build(AnimationSource::Clip(&mut clip)).unwrap())
        })
    });
}

criterion_group!(benches, bench_tick, bench_affectors, bench_animation_bake);
criterion_main!(benches);
