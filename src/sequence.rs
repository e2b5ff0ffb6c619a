//! Timed affector sequences.
//!
//! A sequence swaps the flock's affector set on a schedule, e.g. to make the
//! flock trace a shape, clear, then trace the next one. It is a plain state
//! machine advanced by the flock before each kernel run.
//!
//! ```
//! use arflock::sequence::{AffectorSequence, SequenceStep};
//! use arflock::{FlockParams, Vec3};
//!
//! let mut seq = AffectorSequence::new(
//!     1.0,
//!     vec![
//!         SequenceStep::points(vec![Vec3::ZERO, Vec3::Y], 2.0),
//!         SequenceStep::pause(0.5),
//!     ],
//! );
//! let params = FlockParams::default();
//! assert!(seq.advance(0.5, &params).is_none()); // still in the initial delay
//! assert_eq!(seq.advance(0.5, &params).unwrap().len(), 2);
//! ```

use crate::affector::{affectors_from_points, Affector, AffectorAxis, PointLayout};
use crate::params::FlockParams;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One stage of a sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceStep {
    /// Affector offsets for this stage; empty clears the set.
    #[serde(default)]
    pub points: Vec<Vec3>,
    #[serde(default)]
    pub layout: PointLayout,
    /// Falls back to `AffectorForce` when absent.
    #[serde(default)]
    pub force: Option<f32>,
    /// Falls back to `AffectorDistance` when absent.
    #[serde(default)]
    pub distance: Option<f32>,
    #[serde(default)]
    pub axis: AffectorAxis,
    /// Seconds to hold this stage before moving on.
    pub hold: f32,
}

impl SequenceStep {
    pub fn points(points: Vec<Vec3>, hold: f32) -> Self {
        Self {
            points,
            layout: PointLayout::default(),
            force: None,
            distance: None,
            axis: AffectorAxis::Point,
            hold,
        }
    }

    /// A stage with no affectors.
    pub fn pause(hold: f32) -> Self {
        Self::points(Vec::new(), hold)
    }

    /// Resolve this stage into affectors using the current tunables.
    pub fn build(&self, params: &FlockParams) -> Vec<Affector> {
        affectors_from_points(
            &self.layout.apply(&self.points),
            self.force.unwrap_or(params.affector_force),
            self.distance.unwrap_or(params.affector_distance),
            self.axis,
        )
    }
}

/// Looping schedule of affector stages.
#[derive(Clone, Debug)]
pub struct AffectorSequence {
    steps: Vec<SequenceStep>,
    /// Index of the active step, `None` during the initial delay.
    current: Option<usize>,
    /// Seconds left before the next transition.
    remaining: f32,
}

impl AffectorSequence {
    pub fn new(initial_delay: f32, steps: Vec<SequenceStep>) -> Self {
        Self {
            steps,
            current: None,
            remaining: initial_delay.max(0.0),
        }
    }

    /// Advance by `dt`; returns the new affector list when the stage changes.
    ///
    /// At most one transition happens per call, so a long `dt` never skips
    /// a stage entirely.
    pub fn advance(&mut self, dt: f32, params: &FlockParams) -> Option<Vec<Affector>> {
        if self.steps.is_empty() {
            return None;
        }

        self.remaining -= dt.max(0.0);
        if self.remaining > 0.0 {
            return None;
        }

        let next = match self.current {
            None => 0,
            Some(i) => (i + 1) % self.steps.len(),
        };
        self.current = Some(next);
        // Zero-length holds still last one tick.
        self.remaining = self.steps[next].hold.max(0.0);
        Some(self.steps[next].build(params))
    }

    pub fn current_step(&self) -> Option<usize> {
        self.current
    }
}
