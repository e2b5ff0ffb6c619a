//! Live tunables read by the kernel every tick.
//!
//! [`FlockParams`] is `Copy`: the flock copies it once at the start of each
//! tick, so edits made between ticks never tear a tick in half. External
//! tuning code addresses fields by their [`TunableParam`] name.

use crate::error::FlockError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Per-tick simulation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockParams {
    /// Default force for affectors built without an explicit one.
    pub affector_force: f32,
    /// Default radius for affectors built without an explicit one.
    pub affector_distance: f32,
    /// How quickly headings turn toward the desired direction.
    pub rotation_speed: f32,
    pub boid_speed: f32,
    /// Fraction of `boid_speed` added or removed by per-boid noise.
    pub boid_speed_variation: f32,
    /// Neighbor radius; non-positive disables flocking.
    pub neighbour_distance: f32,
    /// Animation frames advanced per second.
    pub boid_frame_speed: f32,
    /// Neighbor scan stride; 1 checks every other boid each tick.
    pub step_boid_check_neighbours: u32,
    pub frame_interpolation: bool,
    /// Per-axis cap on the summed affector contribution.
    pub max_affector_full_axis_size: f32,
}

impl Default for FlockParams {
    fn default() -> Self {
        // Tuned for a table-top AR scene (meters).
        Self {
            affector_force: 0.2,
            affector_distance: 0.2,
            rotation_speed: 10.0,
            boid_speed: 0.6,
            boid_speed_variation: 0.9,
            neighbour_distance: 0.2,
            boid_frame_speed: 10.0,
            step_boid_check_neighbours: 1,
            frame_interpolation: true,
            max_affector_full_axis_size: 2.0,
        }
    }
}

impl FlockParams {
    /// Upper bound on how far any boid can travel in `dt` seconds.
    pub fn max_displacement(&self, dt: f32) -> f32 {
        self.boid_speed.abs() * (1.0 + self.boid_speed_variation.abs()) * dt.abs()
    }

    /// Neighbor stride, never zero.
    #[inline]
    pub fn neighbour_stride(&self) -> usize {
        self.step_boid_check_neighbours.max(1) as usize
    }

    pub fn get(&self, param: TunableParam) -> f32 {
        match param {
            TunableParam::AffectorForce => self.affector_force,
            TunableParam::AffectorDistance => self.affector_distance,
            TunableParam::RotationSpeed => self.rotation_speed,
            TunableParam::BoidSpeed => self.boid_speed,
            TunableParam::BoidSpeedVariation => self.boid_speed_variation,
            TunableParam::NeighbourDistance => self.neighbour_distance,
            TunableParam::BoidFrameSpeed => self.boid_frame_speed,
            TunableParam::StepBoidCheckNeighbours => self.step_boid_check_neighbours as f32,
            TunableParam::FrameInterpolation => {
                if self.frame_interpolation {
                    1.0
                } else {
                    0.0
                }
            }
            TunableParam::MaxAffectorFullAxisSize => self.max_affector_full_axis_size,
        }
    }

    /// Set a tunable from a slider value.
    ///
    /// Integer and boolean options are rounded/thresholded: the stride is
    /// clamped to at least 1 and `FrameInterpolation` is on for values >= 0.5.
    pub fn set(&mut self, param: TunableParam, value: f32) {
        match param {
            TunableParam::AffectorForce => self.affector_force = value,
            TunableParam::AffectorDistance => self.affector_distance = value,
            TunableParam::RotationSpeed => self.rotation_speed = value,
            TunableParam::BoidSpeed => self.boid_speed = value,
            TunableParam::BoidSpeedVariation => self.boid_speed_variation = value,
            TunableParam::NeighbourDistance => self.neighbour_distance = value,
            TunableParam::BoidFrameSpeed => self.boid_frame_speed = value,
            TunableParam::StepBoidCheckNeighbours => {
                self.step_boid_check_neighbours = if value.is_finite() {
                    value.round().max(1.0) as u32
                } else {
                    1
                }
            }
            TunableParam::FrameInterpolation => self.frame_interpolation = value >= 0.5,
            TunableParam::MaxAffectorFullAxisSize => self.max_affector_full_axis_size = value,
        }
    }

    /// Set a tunable by its option name, e.g. `"AffectorForce"`.
    pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<(), FlockError> {
        let param = name.parse::<TunableParam>()?;
        self.set(param, value);
        Ok(())
    }
}

/// The recognized tunable options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TunableParam {
    AffectorForce,
    AffectorDistance,
    RotationSpeed,
    BoidSpeed,
    BoidSpeedVariation,
    NeighbourDistance,
    BoidFrameSpeed,
    StepBoidCheckNeighbours,
    FrameInterpolation,
    MaxAffectorFullAxisSize,
}

impl TunableParam {
    pub const ALL: [TunableParam; 10] = [
        TunableParam::AffectorForce,
        TunableParam::AffectorDistance,
        TunableParam::RotationSpeed,
        TunableParam::BoidSpeed,
        TunableParam::BoidSpeedVariation,
        TunableParam::NeighbourDistance,
        TunableParam::BoidFrameSpeed,
        TunableParam::StepBoidCheckNeighbours,
        TunableParam::FrameInterpolation,
        TunableParam::MaxAffectorFullAxisSize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TunableParam::AffectorForce => "AffectorForce",
            TunableParam::AffectorDistance => "AffectorDistance",
            TunableParam::RotationSpeed => "RotationSpeed",
            TunableParam::BoidSpeed => "BoidSpeed",
            TunableParam::BoidSpeedVariation => "BoidSpeedVariation",
            TunableParam::NeighbourDistance => "NeighbourDistance",
            TunableParam::BoidFrameSpeed => "BoidFrameSpeed",
            TunableParam::StepBoidCheckNeighbours => "StepBoidCheckNeighbours",
            TunableParam::FrameInterpolation => "FrameInterpolation",
            TunableParam::MaxAffectorFullAxisSize => "MaxAffectorFullAxisSize",
        }
    }

    /// Suggested slider range. Values outside it are still accepted.
    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            TunableParam::AffectorForce => -1.0..=1.0,
            TunableParam::AffectorDistance => 0.1..=1.0,
            TunableParam::RotationSpeed => 0.0..=50.0,
            TunableParam::BoidSpeed => 0.0..=5.0,
            TunableParam::BoidSpeedVariation => 0.0..=1.0,
            TunableParam::NeighbourDistance => 0.0..=2.0,
            TunableParam::BoidFrameSpeed => 0.0..=60.0,
            TunableParam::StepBoidCheckNeighbours => 1.0..=64.0,
            TunableParam::FrameInterpolation => 0.0..=1.0,
            TunableParam::MaxAffectorFullAxisSize => 0.0..=10.0,
        }
    }
}

impl fmt::Display for TunableParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TunableParam {
    type Err = FlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TunableParam::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| FlockError::UnknownParam(s.to_string()))
    }
}
