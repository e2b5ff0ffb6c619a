//! The per-tick boid update.
//!
//! Every boid is updated from the state at tick start and writes only its
//! own slot, so the update is a parallel map over the population. Per boid,
//! in order:
//!
//! 1. **Neighbors** - scan every `stride`-th other boid within
//!    `neighbour_distance` and accumulate separation, alignment and cohesion.
//!    The flock position is always part of the cohesion average, so boids
//!    keep heading home even when alone.
//! 2. **Affectors** - sum each affector's pull or push, then clamp every axis
//!    to `max_affector_full_axis_size`.
//! 3. **Integration** - turn the heading toward the combined direction at a
//!    rate set by `rotation_speed`, then move along it at the noisy speed.
//! 4. **Animation** - advance the phase and derive the frame pair to blend.
//!
//! [`shader::FLOCK_COMPUTE_WGSL`](crate::shader::FLOCK_COMPUTE_WGSL) runs the
//! same rule on the GPU.

use crate::affector::{Affector, MIN_DISTANCE};
use crate::boid::Boid;
use crate::params::FlockParams;
use crate::store::BoidStore;
use glam::Vec3;
use rayon::prelude::*;

/// Below this many boids the tick runs on the calling thread.
const PARALLEL_THRESHOLD: usize = 512;

/// Everything a tick reads besides the boids themselves. Fixed for the
/// duration of the tick.
#[derive(Clone, Copy, Debug)]
pub struct TickContext<'a> {
    pub params: FlockParams,
    pub affectors: &'a [Affector],
    /// Reference point every boid is drawn toward.
    pub flock_position: Vec3,
    pub dt: f32,
    /// Simulated time at tick start, drives speed noise.
    pub time: f32,
    /// Tick counter, rotates the neighbor stride.
    pub tick: u64,
    /// Frames in the animation table (at least 1).
    pub total_frames: u32,
}

/// Advance every boid in `store` by one tick.
pub fn run_tick(store: &mut BoidStore, ctx: &TickContext<'_>) {
    if store.is_empty() {
        return;
    }

    let (front, back) = store.buffers();
    if front.len() >= PARALLEL_THRESHOLD {
        back.par_iter_mut()
            .enumerate()
            .for_each(|(i, out)| *out = step_boid(i, front, ctx));
    } else {
        for (i, out) in back.iter_mut().enumerate() {
            *out = step_boid(i, front, ctx);
        }
    }
    store.swap();
}

/// Compute the next state of `boids[index]` without mutating anything.
pub fn step_boid(index: usize, boids: &[Boid], ctx: &TickContext<'_>) -> Boid {
    let params = &ctx.params;
    let mut boid = boids[index];

    let neighbours = Neighbourhood::scan(index, boids, ctx);
    let (affector_pull, proximity) = affector_influence(
        boid.position,
        ctx.affectors,
        ctx.flock_position,
        params.max_affector_full_axis_size,
    );
    let desired = neighbours.direction(boid.position) + affector_pull;

    boid.heading = steer(boid.heading, desired, params.rotation_speed * ctx.dt);

    let jitter = value_noise(ctx.time / 100.0 + boid.noise_offset);
    boid.speed = params.boid_speed
        * (1.0 + jitter * params.boid_speed_variation * (1.0 - proximity));
    boid.position += boid.heading * boid.speed * ctx.dt;

    let frames = advance_frames(
        boid.phase,
        params.boid_frame_speed * ctx.dt,
        ctx.total_frames,
        params.frame_interpolation,
    );
    boid.phase = frames.phase;
    boid.frame = frames.frame;
    boid.next_frame = frames.next_frame;
    boid.frame_interpolation = frames.interpolation;

    boid
}

// ========== Neighbors ==========

/// Accumulated neighbor terms for one boid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbourhood {
    pub separation: Vec3,
    pub alignment: Vec3,
    /// Sum of neighbor positions plus the flock position.
    pub cohesion: Vec3,
    /// Neighbors found plus one for the flock position.
    pub count: u32,
}

impl Neighbourhood {
    /// Scan the population with the tick's stride.
    pub fn scan(index: usize, boids: &[Boid], ctx: &TickContext<'_>) -> Self {
        let mut hood = Self {
            separation: Vec3::ZERO,
            alignment: Vec3::ZERO,
            cohesion: ctx.flock_position,
            count: 1,
        };

        let radius = ctx.params.neighbour_distance;
        if !(radius > 0.0) {
            return hood;
        }

        let stride = ctx.params.neighbour_stride();
        let start = (ctx.tick % stride as u64) as usize;
        let position = boids[index].position;

        for (j, other) in boids.iter().enumerate().skip(start).step_by(stride) {
            if j == index {
                continue;
            }
            let offset = position - other.position;
            let dist = offset.length();
            if dist >= radius {
                continue;
            }

            // Unit push away, fading to nothing at the rim.
            let dist = dist.max(MIN_DISTANCE);
            hood.separation += offset / dist * (1.0 - dist / radius);
            hood.alignment += other.heading;
            hood.cohesion += other.position;
            hood.count += 1;
        }

        hood
    }

    /// Combined steering direction (not normalized).
    pub fn direction(&self, position: Vec3) -> Vec3 {
        let avg = 1.0 / self.count as f32;
        let alignment = self.alignment * avg;
        let cohesion = (self.cohesion * avg - position).normalize_or_zero();
        alignment + self.separation + cohesion
    }
}

// ========== Affectors ==========

/// Summed, axis-clamped affector displacement at `position`, plus the
/// strongest proximity weight among the affectors in range.
pub fn affector_influence(
    position: Vec3,
    affectors: &[Affector],
    flock_position: Vec3,
    max_axis: f32,
) -> (Vec3, f32) {
    let mut total = Vec3::ZERO;
    let mut proximity: f32 = 0.0;
    for affector in affectors {
        let (pull, weight) = affector.influence(position, flock_position);
        total += pull;
        proximity = proximity.max(weight);
    }
    (clamp_axes(total, max_axis), proximity)
}

/// Clamp each component into `[-limit, limit]`. NaN limits clamp to zero.
fn clamp_axes(v: Vec3, limit: f32) -> Vec3 {
    let limit = if limit.is_nan() { 0.0 } else { limit.abs() };
    let clamp = |x: f32| x.max(-limit).min(limit);
    Vec3::new(clamp(v.x), clamp(v.y), clamp(v.z))
}

// ========== Integration ==========

/// Turn `heading` toward `desired` by `1 - e^(-rate)` of the way.
fn steer(heading: Vec3, desired: Vec3, rate: f32) -> Vec3 {
    let current = heading.normalize_or(Vec3::Z);
    let target = desired.normalize_or_zero();
    if target == Vec3::ZERO {
        return current;
    }

    let blend = 1.0 - (-rate).exp();
    let blend = if blend.is_nan() { 0.0 } else { blend.clamp(0.0, 1.0) };
    current.lerp(target, blend).normalize_or(current)
}

/// Smooth 1D value noise in `[-1, 1]`.
pub fn value_noise(x: f32) -> f32 {
    let i = x.floor();
    let f = x - i;
    let u = f * f * (3.0 - 2.0 * f);
    let a = hash(i);
    let b = hash(i + 1.0);
    ((a + (b - a) * u) * 2.0 - 1.0).clamp(-1.0, 1.0)
}

#[inline]
fn hash(n: f32) -> f32 {
    let h = n.sin() * 43_758.545;
    h - h.floor()
}

// ========== Animation ==========

/// Frame selection after a phase advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStep {
    pub phase: f32,
    pub frame: u32,
    pub next_frame: u32,
    pub interpolation: f32,
}

/// Advance `phase` by `delta` frames and pick the frames to blend.
///
/// Indices are always within `[0, total_frames)`, even for non-finite input.
pub fn advance_frames(phase: f32, delta: f32, total_frames: u32, interpolate: bool) -> FrameStep {
    let total = total_frames.max(1);
    let mut phase = (phase + delta).rem_euclid(total as f32);
    if !phase.is_finite() {
        phase = 0.0;
    }

    let frame = phase.floor() as u32;
    debug_assert!(frame <= total, "frame {} escaped table of {}", frame, total);
    let frame = frame.min(total - 1);

    if interpolate {
        FrameStep {
            phase,
            frame,
            next_frame: (frame + 1) % total,
            interpolation: (phase - frame as f32).clamp(0.0, 0.999_999),
        }
    } else {
        FrameStep {
            phase,
            frame,
            next_frame: frame,
            interpolation: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affector::AffectorAxis;

    fn ctx(params: FlockParams, affectors: &[Affector]) -> TickContext<'_> {
        TickContext {
            params,
            affectors,
            flock_position: Vec3::ZERO,
            dt: 1.0 / 60.0,
            time: 0.0,
            tick: 0,
            total_frames: 8,
        }
    }

    fn boid_at(position: Vec3, heading: Vec3) -> Boid {
        Boid {
            position,
            heading,
            ..Default::default()
        }
    }

    #[test]
    fn test_value_noise_range() {
        for i in 0..2000 {
            let n = value_noise(i as f32 * 0.37 - 100.0);
            assert!((-1.0..=1.0).contains(&n));
        }
    }

    #[test]
    fn test_frames_wrap_and_pair() {
        let step = advance_frames(7.5, 1.0, 8, true);
        assert_eq!(step.frame, 0);
        assert_eq!(step.next_frame, 1);
        assert!((step.interpolation - 0.5).abs() < 1e-5);

        let step = advance_frames(6.2, 1.0, 8, true);
        assert_eq!(step.frame, 7);
        assert_eq!(step.next_frame, 0);
    }

    #[test]
    fn test_frames_without_interpolation() {
        let step = advance_frames(2.0, 1.7, 8, false);
        assert_eq!(step.frame, 3);
        assert_eq!(step.next_frame, 3);
        assert_eq!(step.interpolation, 0.0);
    }

    #[test]
    fn test_frames_survive_garbage() {
        for (phase, delta, total) in [
            (0.0, f32::NAN, 4),
            (0.0, f32::INFINITY, 4),
            (0.0, -1e-9, 4),
            (3.0, -100.25, 4),
            (0.0, 5.0, 0),
        ] {
            let step = advance_frames(phase, delta, total, true);
            let total = total.max(1);
            assert!(step.frame < total);
            assert_eq!(step.next_frame, (step.frame + 1) % total);
            assert!((0.0..1.0).contains(&step.interpolation));
        }
    }

    #[test]
    fn test_neighbours_disabled() {
        let boids = vec![
            boid_at(Vec3::ZERO, Vec3::X),
            boid_at(Vec3::new(0.01, 0.0, 0.0), Vec3::Y),
        ];
        let params = FlockParams {
            neighbour_distance: 0.0,
            ..Default::default()
        };
        let hood = Neighbourhood::scan(0, &boids, &ctx(params, &[]));
        assert_eq!(hood.count, 1);
        assert_eq!(hood.separation, Vec3::ZERO);
        assert_eq!(hood.alignment, Vec3::ZERO);
    }

    #[test]
    fn test_close_neighbour_repels_and_aligns() {
        let boids = vec![
            boid_at(Vec3::ZERO, Vec3::X),
            boid_at(Vec3::new(0.05, 0.0, 0.0), Vec3::Y),
            boid_at(Vec3::new(5.0, 0.0, 0.0), Vec3::Z),
        ];
        let hood = Neighbourhood::scan(0, &boids, &ctx(FlockParams::default(), &[]));
        assert_eq!(hood.count, 2);
        assert!(hood.separation.x < 0.0);
        assert_eq!(hood.alignment, Vec3::Y);
    }

    #[test]
    fn test_stride_rotates_with_tick() {
        let boids: Vec<Boid> = (0..4)
            .map(|i| boid_at(Vec3::new(i as f32 * 0.01, 0.0, 0.0), Vec3::X))
            .collect();
        let params = FlockParams {
            step_boid_check_neighbours: 2,
            ..Default::default()
        };
        let mut c = ctx(params, &[]);

        // Tick 0 visits indices 0 and 2, tick 1 visits 1 and 3.
        let even = Neighbourhood::scan(0, &boids, &c);
        c.tick = 1;
        let odd = Neighbourhood::scan(0, &boids, &c);
        assert_eq!(even.count, 2);
        assert_eq!(odd.count, 3);
    }

    #[test]
    fn test_affector_clamp_per_axis() {
        let affectors = [Affector {
            position: Vec3::ZERO,
            force: 1000.0,
            distance: 1.0,
            axis: AffectorAxis::Point,
        }];
        let (pull, proximity) =
            affector_influence(Vec3::new(0.01, 0.01, 0.0), &affectors, Vec3::ZERO, 0.5);
        assert_eq!(pull.x, -0.5);
        assert_eq!(pull.y, -0.5);
        assert!(proximity > 0.9);

        let (nan_limited, _) =
            affector_influence(Vec3::new(0.01, 0.0, 0.0), &affectors, Vec3::ZERO, f32::NAN);
        assert_eq!(nan_limited, Vec3::ZERO);
    }

    #[test]
    fn test_step_moves_toward_flock_position() {
        let params = FlockParams {
            neighbour_distance: 0.0,
            boid_speed_variation: 0.0,
            rotation_speed: 1000.0,
            ..Default::default()
        };
        let boids = vec![boid_at(Vec3::new(1.0, 0.0, 0.0), Vec3::Z)];
        let c = ctx(params, &[]);
        let next = step_boid(0, &boids, &c);

        assert!(next.position.x < 1.0);
        assert!((next.speed - params.boid_speed).abs() < 1e-6);
        assert!((next.heading - Vec3::NEG_X).length() < 1e-3);
    }

    #[test]
    fn test_run_tick_reads_tick_start_state() {
        let boids: Vec<Boid> = (0..600)
            .map(|i| boid_at(Vec3::new((i % 30) as f32 * 0.02, (i / 30) as f32 * 0.02, 0.0), Vec3::X))
            .collect();
        let params = FlockParams::default();
        let c = ctx(params, &[]);

        let expected: Vec<Boid> = (0..boids.len()).map(|i| step_boid(i, &boids, &c)).collect();
        let mut store = BoidStore::new(boids);
        run_tick(&mut store, &c);
        assert_eq!(store.boids(), expected.as_slice());
    }

    #[test]
    fn test_run_tick_empty_is_noop() {
        let mut store = BoidStore::default();
        run_tick(&mut store, &ctx(FlockParams::default(), &[]));
        assert!(store.is_empty());
    }
}
