//! GPU port of the kernel and the buffer layouts it binds.
//!
//! Bindings (group 0):
//!
//! | Binding | Contents | Rust type |
//! |---------|----------|-----------|
//! | 0 | boids at tick start (read) | `[BoidGpu]` |
//! | 1 | boids after the tick (write) | `[BoidGpu]` |
//! | 2 | affectors | `[AffectorGpu]` |
//! | 3 | uniforms | [`FlockUniforms`] |
//!
//! Dispatch `boids_count / 256 + 1` workgroups and swap bindings 0 and 1
//! between ticks.

use crate::kernel::TickContext;
use bytemuck::{Pod, Zeroable};

pub const FLOCK_COMPUTE_WGSL: &str = include_str!("flock.wgsl");

/// Threads per workgroup in [`FLOCK_COMPUTE_WGSL`].
pub const WORKGROUP_SIZE: u32 = 256;

/// Uniform block consumed by the compute kernel (80 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FlockUniforms {
    pub flock_position: [f32; 3],
    pub delta_time: f32,
    pub rotation_speed: f32,
    pub boid_speed: f32,
    pub boid_speed_variation: f32,
    pub neighbour_distance: f32,
    pub boid_frame_speed: f32,
    pub max_affector_full_axis_size: f32,
    pub time: f32,
    pub boids_count: u32,
    pub total_frames: u32,
    pub affector_count: u32,
    pub neighbour_stride: u32,
    pub frame_interpolation: u32,
    pub stride_offset: u32,
    pub _pad: [u32; 3],
}

impl FlockUniforms {
    pub fn from_tick(ctx: &TickContext<'_>, boids_count: usize) -> Self {
        let params = &ctx.params;
        let stride = params.neighbour_stride() as u64;
        Self {
            flock_position: ctx.flock_position.to_array(),
            delta_time: ctx.dt,
            rotation_speed: params.rotation_speed,
            boid_speed: params.boid_speed,
            boid_speed_variation: params.boid_speed_variation,
            neighbour_distance: params.neighbour_distance,
            boid_frame_speed: params.boid_frame_speed,
            max_affector_full_axis_size: params.max_affector_full_axis_size,
            time: ctx.time,
            boids_count: boids_count as u32,
            total_frames: ctx.total_frames.max(1),
            affector_count: ctx.affectors.len() as u32,
            neighbour_stride: stride as u32,
            frame_interpolation: params.frame_interpolation as u32,
            stride_offset: (ctx.tick % stride) as u32,
            _pad: [0; 3],
        }
    }
}

/// Workgroups needed to cover `boids_count` boids.
pub fn dispatch_size(boids_count: usize) -> u32 {
    boids_count as u32 / WORKGROUP_SIZE + 1
}
