//! Affectors: spatial sources that attract or repel boids.
//!
//! An affector is stored as an *offset* from the flock's reference point.
//! The kernel evaluates it at the effective world position
//! `flock_position - affector.position`, which is why the tracking affector
//! stores `reference - anchor`.
//!
//! # Example
//!
//! ```
//! use arflock::{Affector, AffectorAxis, Vec3};
//!
//! // Keep the flock orbiting a viewer standing at (1, 1.7, 0).
//! let flock_center = Vec3::new(0.0, 0.5, 0.0);
//! let tracking = Affector::tracking(Vec3::new(1.0, 1.7, 0.0), flock_center, 0.2, 0.5);
//! assert_eq!(tracking.axis, AffectorAxis::VerticalCylinder);
//! assert_eq!(tracking.effective_position(flock_center), Vec3::new(1.0, 1.7, 0.0));
//! ```

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Geometry of an affector's field of influence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AffectorAxis {
    /// Isotropic sphere of influence.
    #[default]
    Point,
    /// Disk in the horizontal plane, extruded along the up axis. The vertical
    /// component of the separation is ignored.
    VerticalCylinder,
}

impl AffectorAxis {
    /// Integer tag used in GPU buffers.
    pub fn as_u32(self) -> u32 {
        match self {
            AffectorAxis::Point => 0,
            AffectorAxis::VerticalCylinder => 1,
        }
    }
}

/// A single attract/repel source.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affector {
    /// Offset from the flock reference point (see module docs).
    pub position: Vec3,
    /// Positive attracts, negative repels, zero is inert.
    pub force: f32,
    /// Influence radius. Agents further away are unaffected.
    pub distance: f32,
    pub axis: AffectorAxis,
}

impl Affector {
    /// Build the vertical-cylinder affector that follows a live anchor.
    pub fn tracking(anchor: Vec3, reference: Vec3, force: f32, distance: f32) -> Self {
        Self {
            position: reference - anchor,
            force,
            distance,
            axis: AffectorAxis::VerticalCylinder,
        }
    }

    /// World position the kernel evaluates this affector at.
    #[inline]
    pub fn effective_position(&self, flock_position: Vec3) -> Vec3 {
        flock_position - self.position
    }

    /// Whether this affector can influence anything at all.
    #[inline]
    pub fn is_inert(&self) -> bool {
        self.force == 0.0 || !(self.distance > 0.0)
    }

    /// Influence exerted on a boid at `boid_position`, before clamping.
    ///
    /// Returns the displacement contribution and a proximity weight in
    /// `[0, 1]` (1 at the affector, 0 at the rim or beyond).
    pub fn influence(&self, boid_position: Vec3, flock_position: Vec3) -> (Vec3, f32) {
        if self.is_inert() {
            return (Vec3::ZERO, 0.0);
        }

        let mut offset = boid_position - self.effective_position(flock_position);
        if self.axis == AffectorAxis::VerticalCylinder {
            offset.y = 0.0;
        }

        let dist = offset.length().max(MIN_DISTANCE);
        if dist >= self.distance {
            return (Vec3::ZERO, 0.0);
        }

        // `offset` points away from the source, so attraction flips it.
        let strength = 1.0 / dist - 1.0 / self.distance;
        let proximity = 1.0 - dist / self.distance;
        (-offset * strength * self.force, proximity)
    }

    pub fn to_gpu(&self) -> AffectorGpu {
        AffectorGpu {
            position: self.position.to_array(),
            force: self.force,
            distance: self.distance,
            axis: self.axis.as_u32(),
            _pad: [0.0; 2],
        }
    }
}

/// Separation floor used to avoid dividing by zero.
pub(crate) const MIN_DISTANCE: f32 = 0.000_001;

/// Map a point set to affectors sharing force, distance and axis.
pub fn affectors_from_points(
    points: &[Vec3],
    force: f32,
    distance: f32,
    axis: AffectorAxis,
) -> Vec<Affector> {
    points
        .iter()
        .map(|&position| Affector {
            position,
            force,
            distance,
            axis,
        })
        .collect()
}

/// Transform applied to raw points (drawing paths, mesh vertices) before they
/// become affector offsets: `p * (reverse ? -1 : 1) * scale + offset`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLayout {
    pub scale: f32,
    pub offset: Vec3,
    /// Negate points. Offsets are subtracted from the flock position, so a
    /// drawing authored in world orientation needs this to appear upright.
    pub reverse: bool,
}

impl Default for PointLayout {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec3::ZERO,
            reverse: false,
        }
    }
}

impl PointLayout {
    pub fn apply(&self, points: &[Vec3]) -> Vec<Vec3> {
        let sign = if self.reverse { -1.0 } else { 1.0 };
        points
            .iter()
            .map(|&p| p * sign * self.scale + self.offset)
            .collect()
    }
}

/// The affector list owned by a flock.
///
/// The backing storage only changes on [`replace`](Self::replace); the
/// tracking affector is refreshed in place. `generation` counts
/// replacements so buffer owners know when to reallocate.
#[derive(Clone, Debug, Default)]
pub struct AffectorSet {
    affectors: Vec<Affector>,
    generation: u64,
}

impl AffectorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the current list and take ownership of `affectors`.
    pub fn replace(&mut self, affectors: Vec<Affector>) {
        tracing::debug!(
            previous = self.affectors.len(),
            next = affectors.len(),
            "replacing affector set"
        );
        self.affectors = affectors;
        self.generation += 1;
    }

    /// Refresh the single tracking affector without reallocating.
    ///
    /// The set is resized to exactly one element only if it does not already
    /// hold one, which counts as a replacement.
    pub fn update_tracking(&mut self, tracking: Affector) {
        if self.affectors.len() == 1 {
            self.affectors[0] = tracking;
        } else {
            self.replace(vec![tracking]);
        }
    }

    pub fn clear(&mut self) {
        if !self.affectors.is_empty() {
            self.replace(Vec::new());
        }
    }

    /// Fixed view handed to the kernel for one tick.
    #[inline]
    pub fn as_slice(&self) -> &[Affector] {
        &self.affectors
    }

    pub fn len(&self) -> usize {
        self.affectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.affectors.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// GPU layout of an affector. Matches `Affector` in the WGSL kernel.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct AffectorGpu {
    pub position: [f32; 3],
    pub force: f32,
    pub distance: f32,
    pub axis: u32,
    pub _pad: [f32; 2],
}
