//! # arflock - Affector-driven boid flocking
//!
//! A boid flock for interactive scenes: agents flock with their neighbours,
//! drift home to a shared target, and bend around attract/repel
//! "affectors" such as a tracked viewer or a traced shape. Each agent
//! carries the two animation frames and blend factor a renderer needs to
//! draw it as an animated mesh instance.
//!
//! arflock runs the simulation on the CPU and exports GPU-ready buffers
//! plus a WGSL port of the same kernel. Drawing is left to the host.
//!
//! ## Quick Start
//!
//! ```
//! use arflock::prelude::*;
//!
//! let mut config = FlockConfig::default();
//! config.seed.count = 100;
//! config.affectors = AffectorMode::Points {
//!     points: vec![Vec3::new(0.0, 0.0, 0.5)],
//!     layout: Default::default(),
//!     force: Some(0.5),
//!     distance: Some(0.4),
//!     axis: AffectorAxis::Point,
//! };
//!
//! let mesh = [Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.2)];
//! let mut flock = Flock::new(config);
//! flock.initialize(AnimationSource::RestPose(&mesh))?;
//!
//! for _ in 0..60 {
//!     flock.tick(1.0 / 60.0, None);
//! }
//! assert_eq!(flock.boids().len(), 100);
//! # Ok::<(), FlockError>(())
//! ```
//!
//! ## Core Concepts
//!
//! ### Boids
//!
//! A [`Boid`] is position, unit heading, a per-agent speed jitter phase,
//! size, tint and animation state. Boids are seeded in a sphere around the
//! flock origin and re-seeded wholesale on [`Flock::respawn`].
//!
//! ### Affectors
//!
//! An [`Affector`] attracts (positive force) or repels (negative force)
//! boids within its radius. `Point` affectors act in 3D; `VerticalCylinder`
//! affectors ignore height, so a viewer standing or crouching keeps the
//! flock at the same altitude. Positions are offsets from the flock target.
//!
//! ### Tunables
//!
//! [`FlockParams`] holds every live knob, addressable by [`TunableParam`]
//! for sliders and config files. Changes apply on the next tick.
//!
//! ### Animation
//!
//! [`AnimationTable`] bakes a clip (anything implementing [`PoseSampler`])
//! into a power-of-two frame table, or a single rest-pose frame.
//!
//! ## Execution
//!
//! Each tick reads the previous state and writes a second buffer, so the
//! update is order independent. Large flocks are split across threads with
//! rayon; [`shader::FLOCK_COMPUTE_WGSL`] runs the same rule on the GPU.

pub mod affector;
pub mod animation;
pub mod boid;
pub mod config;
pub mod error;
pub mod flock;
pub mod kernel;
pub mod params;
pub mod sequence;
pub mod shader;
mod spawn;
pub mod store;
pub mod time;

pub use bytemuck;
pub use glam::{Quat, Vec3};

pub use affector::{affectors_from_points, Affector, AffectorAxis, AffectorGpu, AffectorSet, PointLayout};
pub use animation::{nearest_power_of_two, AnimationSource, AnimationTable, KeyframeClip, PoseSampler};
pub use boid::{Boid, BoidGpu};
pub use config::{AffectorMode, FlockConfig};
pub use error::FlockError;
pub use flock::Flock;
pub use kernel::TickContext;
pub use params::{FlockParams, TunableParam};
pub use sequence::{AffectorSequence, SequenceStep};
pub use shader::FlockUniforms;
pub use spawn::SpawnContext;
pub use store::{seed_boids, BoidStore, SeedSettings};
pub use time::SimClock;

/// Convenient re-exports for common usage.
///
/// ```
/// use arflock::prelude::*;
/// ```
pub mod prelude {
    pub use crate::affector::{Affector, AffectorAxis, PointLayout};
    pub use crate::animation::{AnimationSource, KeyframeClip, PoseSampler};
    pub use crate::boid::Boid;
    pub use crate::config::{AffectorMode, FlockConfig};
    pub use crate::error::FlockError;
    pub use crate::flock::Flock;
    pub use crate::params::{FlockParams, TunableParam};
    pub use crate::sequence::SequenceStep;
    pub use glam::{Quat, Vec3};
}
