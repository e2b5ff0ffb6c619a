//! Random helpers for seeding boids.
//!
//! A single [`SpawnContext`] is created per seeding pass, so a fixed seed
//! reproduces the whole population.

use glam::{Quat, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Seeded random source with spawn-shaped helpers.
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context from an explicit seed, or from the clock when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });

        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for empty or inverted ranges.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random point inside a sphere of given radius, centered at origin.
    ///
    /// Non-positive radii collapse to the origin.
    pub fn random_in_sphere(&mut self, radius: f32) -> Vec3 {
        if !(radius > 0.0) {
            return Vec3::ZERO;
        }
        let theta = self.rng.gen_range(0.0..TAU);
        let cos_phi: f32 = self.rng.gen_range(-1.0..1.0);
        let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
        // Cube root for uniform volume distribution
        let r = radius * self.rng.gen::<f32>().cbrt();

        Vec3::new(
            r * sin_phi * theta.cos(),
            r * sin_phi * theta.sin(),
            r * cos_phi,
        )
    }

    /// Uniformly distributed random rotation.
    pub fn random_rotation(&mut self) -> Quat {
        let u1: f32 = self.rng.gen();
        let u2 = self.rng.gen_range(0.0..TAU);
        let u3 = self.rng.gen_range(0.0..TAU);
        let a = (1.0 - u1).sqrt();
        let b = u1.sqrt();

        Quat::from_xyzw(a * u2.sin(), a * u2.cos(), b * u3.sin(), b * u3.cos()).normalize()
    }
}
