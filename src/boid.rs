//! The boid record and its GPU twin.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};

/// One simulated agent.
///
/// Everything a renderer needs for an instance lives here: position,
/// heading (as orientation), size, tint and the pair of animation frames
/// to blend between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boid {
    pub position: Vec3,
    /// Unit direction of travel.
    pub heading: Vec3,
    /// Phase offset into the speed noise; fixed at creation.
    pub noise_offset: f32,
    /// Speed used by the last tick (seeded value before the first tick).
    pub speed: f32,
    /// Visual scale; fixed at creation.
    pub size: f32,
    /// Color variation in `[0, 1)`; fixed at creation.
    pub tint: f32,
    /// Running animation phase in `[0, total_frames)`.
    pub phase: f32,
    pub frame: u32,
    pub next_frame: u32,
    /// Blend factor between `frame` and `next_frame`, in `[0, 1)`.
    pub frame_interpolation: f32,
}

impl Default for Boid {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: Vec3::Z,
            noise_offset: 0.0,
            speed: 0.0,
            size: 0.1,
            tint: 0.0,
            phase: 0.0,
            frame: 0,
            next_frame: 0,
            frame_interpolation: 0.0,
        }
    }
}

impl Boid {
    /// Orientation that turns the mesh's forward axis (+Z) onto the heading.
    pub fn orientation(&self) -> Quat {
        let heading = self.heading.normalize_or_zero();
        if heading == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::Z, heading)
        }
    }

    pub fn to_gpu(&self) -> BoidGpu {
        BoidGpu {
            position: self.position.to_array(),
            noise_offset: self.noise_offset,
            heading: self.heading.to_array(),
            speed: self.speed,
            phase: self.phase,
            frame: self.frame,
            next_frame: self.next_frame,
            frame_interpolation: self.frame_interpolation,
            size: self.size,
            tint: self.tint,
            _pad: [0.0; 2],
        }
    }

    pub fn from_gpu(gpu: &BoidGpu) -> Self {
        Self {
            position: Vec3::from_array(gpu.position),
            heading: Vec3::from_array(gpu.heading),
            noise_offset: gpu.noise_offset,
            speed: gpu.speed,
            size: gpu.size,
            tint: gpu.tint,
            phase: gpu.phase,
            frame: gpu.frame,
            next_frame: gpu.next_frame,
            frame_interpolation: gpu.frame_interpolation,
        }
    }
}

/// GPU layout of a boid (64 bytes). Matches `Boid` in the WGSL kernel.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BoidGpu {
    pub position: [f32; 3],
    pub noise_offset: f32,
    pub heading: [f32; 3],
    pub speed: f32,
    pub phase: f32,
    pub frame: u32,
    pub next_frame: u32,
    pub frame_interpolation: f32,
    pub size: f32,
    pub tint: f32,
    pub _pad: [f32; 2],
}
