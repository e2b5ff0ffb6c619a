//! Double-buffered boid storage.
//!
//! The kernel reads the front buffer (state at tick start) and writes the
//! back buffer, then the two are swapped. Readers outside a tick only ever
//! see the front buffer.

use crate::boid::Boid;
use crate::spawn::SpawnContext;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Parameters for seeding a population around a reference transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSettings {
    pub count: usize,
    /// Boids spawn uniformly inside a sphere of this radius.
    pub spawn_radius: f32,
    /// Initial speed range, used until the first tick computes a real one.
    pub speed_range: (f32, f32),
    pub size_range: (f32, f32),
    /// Weight of the random rotation blended into the reference rotation.
    pub heading_randomness: f32,
    /// Fixed seed for reproducible populations.
    pub seed: Option<u64>,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            count: 1024,
            spawn_radius: 0.5,
            speed_range: (0.3, 0.6),
            size_range: (0.05, 0.15),
            heading_randomness: 0.3,
            seed: None,
        }
    }
}

impl SeedSettings {
    /// Settings for the `pass`-th seeding of a flock.
    ///
    /// A fixed seed is offset by `pass`, so every respawn draws a fresh
    /// population while a session stays reproducible.
    pub fn for_pass(&self, pass: u64) -> Self {
        Self {
            seed: self.seed.map(|seed| seed.wrapping_add(pass)),
            ..*self
        }
    }
}

/// Upper bound on a boid's noise offset.
const NOISE_OFFSET_RANGE: f32 = 1000.0;

/// Create a fresh population around `origin`.
pub fn seed_boids(settings: &SeedSettings, origin: Vec3, rotation: Quat) -> Vec<Boid> {
    let mut ctx = SpawnContext::new(settings.seed);
    let (speed_lo, speed_hi) = settings.speed_range;
    let (size_lo, size_hi) = settings.size_range;

    (0..settings.count)
        .map(|_| {
            let position = origin + ctx.random_in_sphere(settings.spawn_radius);
            let random = ctx.random_rotation();
            let heading = rotation.slerp(random, settings.heading_randomness) * Vec3::Z;

            Boid {
                position,
                heading: heading.normalize_or(Vec3::Z),
                noise_offset: ctx.random() * NOISE_OFFSET_RANGE,
                speed: ctx.random_range(speed_lo, speed_hi),
                size: ctx.random_range(size_lo, size_hi),
                tint: ctx.random(),
                ..Default::default()
            }
        })
        .collect()
}

/// Front/back boid buffers owned by a flock.
#[derive(Clone, Debug, Default)]
pub struct BoidStore {
    front: Vec<Boid>,
    back: Vec<Boid>,
}

impl BoidStore {
    pub fn new(boids: Vec<Boid>) -> Self {
        Self {
            back: boids.clone(),
            front: boids,
        }
    }

    /// Discard every boid and adopt `boids`. Nothing survives.
    pub fn replace_all(&mut self, boids: Vec<Boid>) {
        self.back.clear();
        self.back.extend_from_slice(&boids);
        self.front = boids;
    }

    /// State as of the last completed tick.
    #[inline]
    pub fn boids(&self) -> &[Boid] {
        &self.front
    }

    pub fn len(&self) -> usize {
        self.front.len()
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_empty()
    }

    /// Split into the read-only front and the writable back buffer.
    pub(crate) fn buffers(&mut self) -> (&[Boid], &mut [Boid]) {
        if self.back.len() != self.front.len() {
            self.back.clone_from(&self.front);
        }
        (&self.front, &mut self.back)
    }

    /// Publish the back buffer as the new front.
    pub(crate) fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(count: usize) -> SeedSettings {
        SeedSettings {
            count,
            seed: Some(11),
            ..Default::default()
        }
    }

    #[test]
    fn test_seed_within_radius() {
        let origin = Vec3::new(1.0, 0.5, -2.0);
        let boids = seed_boids(&settings(200), origin, Quat::IDENTITY);
        assert_eq!(boids.len(), 200);
        for boid in &boids {
            assert!(boid.position.distance(origin) <= 0.5 + 1e-4);
            assert!((boid.heading.length() - 1.0).abs() < 1e-4);
            assert!((0.05..0.15).contains(&boid.size));
            assert!((0.0..NOISE_OFFSET_RANGE).contains(&boid.noise_offset));
            assert_eq!(boid.frame, 0);
        }
    }

    #[test]
    fn test_headings_lean_toward_reference_rotation() {
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let forward = rotation * Vec3::Z;
        let boids = seed_boids(&settings(300), Vec3::ZERO, rotation);
        let mean: Vec3 = boids.iter().map(|b| b.heading).sum::<Vec3>() / boids.len() as f32;
        assert!(mean.dot(forward) > 0.5);
    }

    #[test]
    fn test_zero_radius_and_zero_count() {
        let s = SeedSettings {
            spawn_radius: 0.0,
            ..settings(5)
        };
        for boid in seed_boids(&s, Vec3::ONE, Quat::IDENTITY) {
            assert_eq!(boid.position, Vec3::ONE);
        }
        assert!(seed_boids(&settings(0), Vec3::ZERO, Quat::IDENTITY).is_empty());
    }

    #[test]
    fn test_replace_all_discards_previous() {
        let mut store = BoidStore::new(seed_boids(&settings(10), Vec3::ZERO, Quat::IDENTITY));
        let fresh = seed_boids(
            &SeedSettings { seed: Some(12), ..settings(10) },
            Vec3::splat(5.0),
            Quat::IDENTITY,
        );
        store.replace_all(fresh.clone());
        assert_eq!(store.boids(), fresh.as_slice());

        let (front, back) = store.buffers();
        assert_eq!(front.len(), back.len());
    }

    #[test]
    fn test_swap_publishes_back_buffer() {
        let mut store = BoidStore::new(vec![Boid::default(); 3]);
        {
            let (_, back) = store.buffers();
            back[1].position = Vec3::X;
        }
        assert_eq!(store.boids()[1].position, Vec3::ZERO);
        store.swap();
        assert_eq!(store.boids()[1].position, Vec3::X);
    }

    #[test]
    fn test_passes_draw_distinct_populations() {
        let settings = settings(16);
        let first = seed_boids(&settings.for_pass(0), Vec3::ZERO, Quat::IDENTITY);
        let again = seed_boids(&settings.for_pass(0), Vec3::ZERO, Quat::IDENTITY);
        let second = seed_boids(&settings.for_pass(1), Vec3::ZERO, Quat::IDENTITY);
        assert_eq!(first, again);
        assert_ne!(first, second);
        assert_eq!(settings.for_pass(u64::MAX).count, 16);
    }
}
