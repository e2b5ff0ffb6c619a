//! Baked vertex animation.
//!
//! The clip is sampled once at initialization into an [`AnimationTable`]:
//! one vertex position per `(vertex, frame)` pair, stored vertex-major so a
//! vertex shader reads `table[vertex * frame_count + frame]`. The kernel
//! never touches vertex data, it only picks the two frames to blend.
//!
//! # Example
//!
//! ```
//! use arflock::{AnimationSource, AnimationTable, Vec3};
//!
//! let rest = [Vec3::ZERO, Vec3::X, Vec3::Y];
//! let table = AnimationTable::build(AnimationSource::RestPose(&rest)).unwrap();
//! assert_eq!(table.frame_count(), 1);
//! assert_eq!(table.vertex(1, 0), Vec3::X);
//! ```

use crate::error::FlockError;
use glam::Vec3;

/// Upper bound on authored frames (`frame_rate * length`) a clip may bake.
pub const MAX_BAKED_FRAMES: u32 = 4096;

/// A skinned mesh that can be posed at an arbitrary clip time.
pub trait PoseSampler {
    /// Number of vertices written by [`sample`](Self::sample).
    fn vertex_count(&self) -> usize;

    /// Authored frames per second of the clip.
    fn frame_rate(&self) -> f32;

    /// Clip duration in seconds.
    fn length(&self) -> f32;

    /// Write the posed vertices at `time` seconds into `vertices`.
    fn sample(&mut self, time: f32, vertices: &mut [Vec3]) -> Result<(), String>;
}

/// Where the animation table comes from.
pub enum AnimationSource<'a> {
    /// Bake a clip at power-of-two frame resolution.
    Clip(&'a mut dyn PoseSampler),
    /// A single static frame equal to the mesh's rest pose.
    RestPose(&'a [Vec3]),
}

/// Precomputed per-vertex, per-frame positions. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationTable {
    frame_count: usize,
    vertex_count: usize,
    vertices: Vec<Vec3>,
}

impl AnimationTable {
    /// Build the table, failing on empty meshes or unusable clips.
    pub fn build(source: AnimationSource<'_>) -> Result<Self, FlockError> {
        match source {
            AnimationSource::RestPose(vertices) => Self::from_rest_pose(vertices),
            AnimationSource::Clip(sampler) => Self::bake(sampler),
        }
    }

    fn from_rest_pose(vertices: &[Vec3]) -> Result<Self, FlockError> {
        if vertices.is_empty() {
            return Err(FlockError::EmptyMesh);
        }
        Ok(Self {
            frame_count: 1,
            vertex_count: vertices.len(),
            vertices: vertices.to_vec(),
        })
    }

    fn bake(sampler: &mut dyn PoseSampler) -> Result<Self, FlockError> {
        let vertex_count = sampler.vertex_count();
        if vertex_count == 0 {
            return Err(FlockError::EmptyMesh);
        }

        let frame_rate = sampler.frame_rate();
        let length = sampler.length();
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(FlockError::InvalidClip(format!("frame rate {}", frame_rate)));
        }
        if !(length.is_finite() && length > 0.0) {
            return Err(FlockError::InvalidClip(format!("length {}", length)));
        }

        let authored = frame_rate * length;
        if authored > MAX_BAKED_FRAMES as f32 {
            return Err(FlockError::InvalidClip(format!(
                "{} frames exceeds the bake limit of {}",
                authored, MAX_BAKED_FRAMES
            )));
        }
        let frame_count = nearest_power_of_two(authored as u32) as usize;
        let per_frame = length / frame_count as f32;

        let mut vertices = vec![Vec3::ZERO; vertex_count * frame_count];
        let mut pose = vec![Vec3::ZERO; vertex_count];
        for frame in 0..frame_count {
            sampler
                .sample(frame as f32 * per_frame, &mut pose)
                .map_err(|reason| FlockError::ClipSampling { frame, reason })?;

            for (vertex, position) in pose.iter().enumerate() {
                vertices[vertex * frame_count + frame] = *position;
            }
        }

        tracing::debug!(frame_count, vertex_count, "baked animation table");

        Ok(Self {
            frame_count,
            vertex_count,
            vertices,
        })
    }

    /// Number of baked frames; always at least 1.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Position of `vertex` at `frame`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn vertex(&self, vertex: usize, frame: usize) -> Vec3 {
        assert!(frame < self.frame_count, "frame {} out of range", frame);
        self.vertices[vertex * self.frame_count + frame]
    }

    /// Write the blended pose for one boid into `out`.
    ///
    /// Frame indices are clamped into the table, mirroring what the vertex
    /// shader does.
    pub fn blend_pose(&self, frame: u32, next_frame: u32, t: f32, out: &mut [Vec3]) {
        let last = self.frame_count - 1;
        let a = (frame as usize).min(last);
        let b = (next_frame as usize).min(last);
        for (vertex, slot) in out.iter_mut().enumerate().take(self.vertex_count) {
            *slot = self.vertex(vertex, a).lerp(self.vertex(vertex, b), t);
        }
    }

    /// Vertex-major `vec4` buffer ready for upload (`w` is 1).
    pub fn to_gpu(&self) -> Vec<[f32; 4]> {
        self.vertices.iter().map(|v| v.extend(1.0).to_array()).collect()
    }
}

/// Closest power of two to `value`, at least 1. Ties round up.
pub fn nearest_power_of_two(value: u32) -> u32 {
    if value <= 1 {
        return 1;
    }
    if value.is_power_of_two() {
        return value;
    }
    let Some(upper) = value.checked_next_power_of_two() else {
        return 1 << 31;
    };
    let lower = upper >> 1;
    if upper - value <= value - lower {
        upper
    } else {
        lower
    }
}

/// A clip made of evenly spaced vertex snapshots, looped linearly.
///
/// Handy for meshes whose animation was exported as a vertex cache rather
/// than a skeleton.
#[derive(Clone, Debug)]
pub struct KeyframeClip {
    keyframes: Vec<Vec<Vec3>>,
    frame_rate: f32,
}

impl KeyframeClip {
    /// `keyframes` are spaced `1 / frame_rate` seconds apart.
    pub fn new(keyframes: Vec<Vec<Vec3>>, frame_rate: f32) -> Self {
        Self {
            keyframes,
            frame_rate,
        }
    }
}

impl PoseSampler for KeyframeClip {
    fn vertex_count(&self) -> usize {
        self.keyframes.first().map_or(0, Vec::len)
    }

    fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    fn length(&self) -> f32 {
        self.keyframes.len() as f32 / self.frame_rate
    }

    fn sample(&mut self, time: f32, vertices: &mut [Vec3]) -> Result<(), String> {
        let count = self.keyframes.len();
        if count == 0 {
            return Err("clip has no keyframes".into());
        }

        let position = (time * self.frame_rate).max(0.0);
        let i = (position.floor() as usize) % count;
        let j = (i + 1) % count;
        let t = position.fract();

        let (a, b) = (&self.keyframes[i], &self.keyframes[j]);
        if a.len() != vertices.len() || b.len() != vertices.len() {
            return Err(format!(
                "keyframe {} has {} vertices, expected {}",
                i,
                a.len(),
                vertices.len()
            ));
        }
        for (slot, (pa, pb)) in vertices.iter_mut().zip(a.iter().zip(b.iter())) {
            *slot = pa.lerp(*pb, t);
        }
        Ok(())
    }
}
