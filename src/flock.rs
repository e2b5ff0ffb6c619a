//! The flock controller.
//!
//! [`Flock`] owns the boid buffers, the affector set and the animation table,
//! and drives one kernel run per [`tick`](Flock::tick). Placement code calls
//! [`respawn`](Flock::respawn); tuning code edits [`params_mut`](Flock::params_mut)
//! between ticks; renderers read the accessors after each tick.
//!
//! # Example
//!
//! ```
//! use arflock::prelude::*;
//!
//! let mut config = FlockConfig::default();
//! config.seed.count = 32;
//! config.affectors = AffectorMode::Tracking;
//!
//! let rest_pose = [Vec3::ZERO, Vec3::X, Vec3::Z];
//! let mut flock = Flock::new(config);
//! flock.initialize(AnimationSource::RestPose(&rest_pose)).unwrap();
//! flock.respawn(Vec3::new(0.0, 0.5, -1.0), Quat::IDENTITY);
//!
//! let viewer = Vec3::new(0.0, 1.6, 0.0);
//! let boids = flock.tick(1.0 / 60.0, Some(viewer));
//! assert_eq!(boids.len(), 32);
//! ```

use crate::affector::{Affector, AffectorGpu, AffectorSet};
use crate::animation::{AnimationSource, AnimationTable};
use crate::boid::{Boid, BoidGpu};
use crate::config::FlockConfig;
use crate::error::FlockError;
use crate::kernel::{self, TickContext};
use crate::params::FlockParams;
use crate::sequence::AffectorSequence;
use crate::shader::FlockUniforms;
use crate::store::{seed_boids, BoidStore};
use crate::time::SimClock;
use glam::{Quat, Vec3};
use tracing::{debug, info, trace, warn};

/// State that exists only once the flock is initialized.
struct FlockState {
    store: BoidStore,
    animation: AnimationTable,
    affectors: AffectorSet,
    sequence: Option<AffectorSequence>,
    last_uniforms: FlockUniforms,
}

/// A boid flock and everything needed to advance it.
pub struct Flock {
    config: FlockConfig,
    /// Live tunables; copied at the start of every tick.
    params: FlockParams,
    /// Reference transform boids spawn around.
    origin: Vec3,
    rotation: Quat,
    /// Point every boid is drawn toward (`FlockPosition`).
    target: Vec3,
    /// Pinned vertical component of `target`, if any.
    target_height: Option<f32>,
    clock: SimClock,
    /// Seeding passes so far; offsets a fixed seed so respawns differ.
    spawn_pass: u64,
    state: Option<FlockState>,
}

impl Flock {
    /// Create an uninitialized flock from a configuration.
    pub fn new(config: FlockConfig) -> Self {
        Self {
            params: config.params,
            origin: config.origin,
            rotation: config.rotation,
            target: config.origin,
            target_height: None,
            clock: SimClock::new(),
            spawn_pass: 0,
            state: None,
            config,
        }
    }

    /// Bake the animation table, seed the boids and build the affector set.
    ///
    /// Calling this on an initialized flock does nothing. On error the flock
    /// stays uninitialized.
    pub fn initialize(&mut self, source: AnimationSource<'_>) -> Result<(), FlockError> {
        if self.state.is_some() {
            debug!("flock already initialized");
            return Ok(());
        }

        let animation = AnimationTable::build(source)?;
        let boids = self.seed_population();

        let mut affectors = AffectorSet::new();
        affectors.replace(self.config.affectors.initial_affectors(&self.params));
        let sequence = if self.config.affectors.is_tracking() {
            None
        } else {
            self.config.affectors.sequence()
        };

        info!(
            name = %self.config.name,
            boids = boids.len(),
            frames = animation.frame_count(),
            affectors = affectors.len(),
            "flock initialized"
        );

        self.state = Some(FlockState {
            store: BoidStore::new(boids),
            animation,
            affectors,
            sequence,
            last_uniforms: FlockUniforms::default(),
        });
        Ok(())
    }

    fn seed_population(&mut self) -> Vec<Boid> {
        let settings = self.config.seed.for_pass(self.spawn_pass);
        self.spawn_pass += 1;
        seed_boids(&settings, self.origin, self.rotation)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Move the flock's reference frame and re-seed every boid around it.
    ///
    /// The target moves with it. Before initialization this only records
    /// the transform that initialization will use.
    pub fn respawn(&mut self, position: Vec3, rotation: Quat) {
        self.origin = position;
        self.rotation = rotation;
        self.set_target_position(position);

        if let Some(state) = self.state.as_mut() {
            let settings = self.config.seed.for_pass(self.spawn_pass);
            self.spawn_pass += 1;
            let boids = seed_boids(&settings, self.origin, self.rotation);
            info!(?position, boids = boids.len(), "respawning flock");
            state.store.replace_all(boids);
        } else {
            debug!(?position, "respawn before initialization, storing transform");
        }
    }

    /// Advance the simulation by `dt` seconds and return the new boid state.
    ///
    /// `anchor` feeds the tracking affector; pass `None` to keep its last
    /// position. Ticking an uninitialized flock does nothing.
    pub fn tick(&mut self, dt: f32, anchor: Option<Vec3>) -> &[Boid] {
        let Some(state) = self.state.as_mut() else {
            warn!("tick called before flock initialization");
            return &[];
        };

        let params = self.params;
        let time = self.clock.elapsed();
        let tick = self.clock.ticks();
        let dt = self.clock.advance(dt);

        if let Some(sequence) = state.sequence.as_mut() {
            if let Some(next) = sequence.advance(dt, &params) {
                state.affectors.replace(next);
            }
        }

        if self.config.affectors.is_tracking() {
            let tracking = match (anchor, state.affectors.as_slice().first()) {
                (Some(anchor), _) => Some(Affector::tracking(
                    anchor,
                    self.target,
                    params.affector_force,
                    params.affector_distance,
                )),
                // No fresh anchor: keep the last offset, resync the tunables.
                (None, Some(last)) => Some(Affector {
                    force: params.affector_force,
                    distance: params.affector_distance,
                    ..*last
                }),
                (None, None) => None,
            };
            if let Some(tracking) = tracking {
                state.affectors.update_tracking(tracking);
            }
        }

        let ctx = TickContext {
            params,
            affectors: state.affectors.as_slice(),
            flock_position: self.target,
            dt,
            time,
            tick,
            total_frames: state.animation.frame_count() as u32,
        };
        state.last_uniforms = FlockUniforms::from_tick(&ctx, state.store.len());
        kernel::run_tick(&mut state.store, &ctx);

        trace!(tick, dt, affectors = ctx.affectors.len(), "flock tick");
        state.store.boids()
    }

    // ========== Tunables ==========

    pub fn params(&self) -> &FlockParams {
        &self.params
    }

    /// Tunables for the next tick.
    pub fn params_mut(&mut self) -> &mut FlockParams {
        &mut self.params
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimClock {
        &mut self.clock
    }

    // ========== Target ==========

    /// Current `FlockPosition`.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn set_target_position(&mut self, position: Vec3) {
        self.target = position;
        if let Some(y) = self.target_height {
            self.target.y = y;
        }
    }

    /// Pin the target's height, or release it with `None`.
    pub fn set_target_height(&mut self, height: Option<f32>) {
        self.target_height = height;
        if let Some(y) = height {
            self.target.y = y;
        }
    }

    pub fn origin(&self) -> (Vec3, Quat) {
        (self.origin, self.rotation)
    }

    // ========== Affectors ==========

    /// Replace the affector set, e.g. when a new drawing is selected.
    ///
    /// Any running sequence is stopped. Has no lasting effect in tracking
    /// mode, where the next tick restores the tracking affector.
    pub fn replace_affectors(&mut self, affectors: Vec<Affector>) {
        if let Some(state) = self.state.as_mut() {
            state.sequence = None;
            state.affectors.replace(affectors);
        }
    }

    pub fn affectors(&self) -> &[Affector] {
        self.state.as_ref().map_or(&[][..], |s| s.affectors.as_slice())
    }

    /// Bumped whenever the affector set is replaced rather than refreshed.
    pub fn affector_generation(&self) -> u64 {
        self.state.as_ref().map_or(0, |s| s.affectors.generation())
    }

    // ========== Render export ==========

    /// Boid state as of the last tick.
    pub fn boids(&self) -> &[Boid] {
        self.state.as_ref().map_or(&[][..], |s| s.store.boids())
    }

    pub fn animation(&self) -> Option<&AnimationTable> {
        self.state.as_ref().map(|s| &s.animation)
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    pub fn gpu_boids(&self) -> Vec<BoidGpu> {
        self.boids().iter().map(Boid::to_gpu).collect()
    }

    pub fn gpu_affectors(&self) -> Vec<AffectorGpu> {
        self.affectors().iter().map(Affector::to_gpu).collect()
    }

    /// Uniforms the last tick ran with.
    pub fn uniforms(&self) -> FlockUniforms {
        self.state
            .as_ref()
            .map_or_else(FlockUniforms::default, |s| s.last_uniforms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affector::AffectorAxis;
    use crate::config::AffectorMode;
    use crate::sequence::SequenceStep;

    const REST: [Vec3; 3] = [Vec3::ZERO, Vec3::X, Vec3::Z];

    fn config(count: usize, affectors: AffectorMode) -> FlockConfig {
        let mut config = FlockConfig::default();
        config.seed.count = count;
        config.seed.seed = Some(5);
        config.affectors = affectors;
        config
    }

    fn flock(count: usize, affectors: AffectorMode) -> Flock {
        let mut flock = Flock::new(config(count, affectors));
        flock.initialize(AnimationSource::RestPose(&REST)).unwrap();
        flock
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut f = flock(16, AffectorMode::None);
        let before = f.boids().to_vec();
        f.tick(0.016, None);
        let after_tick = f.boids().to_vec();
        assert_ne!(before, after_tick);

        f.initialize(AnimationSource::RestPose(&[])).unwrap();
        assert_eq!(f.boids(), after_tick.as_slice());
    }

    #[test]
    fn test_failed_initialize_leaves_flock_empty() {
        let mut f = Flock::new(config(16, AffectorMode::None));
        assert!(matches!(
            f.initialize(AnimationSource::RestPose(&[])),
            Err(FlockError::EmptyMesh)
        ));
        assert!(!f.is_initialized());
        assert!(f.tick(0.016, None).is_empty());
        assert!(f.animation().is_none());
    }

    #[test]
    fn test_respawn_before_initialize_sets_origin() {
        let mut f = Flock::new(config(20, AffectorMode::None));
        let p = Vec3::new(3.0, 0.0, 3.0);
        f.respawn(p, Quat::IDENTITY);
        f.initialize(AnimationSource::RestPose(&REST)).unwrap();
        for boid in f.boids() {
            assert!(boid.position.distance(p) <= 0.5 + 1e-4);
        }
        assert_eq!(f.target(), p);
    }

    #[test]
    fn test_respawn_rerandomizes_fixed_seed() {
        let mut f = flock(12, AffectorMode::None);
        let p = Vec3::new(1.0, 0.0, 0.0);
        f.respawn(p, Quat::IDENTITY);
        let first = f.boids().to_vec();
        for _ in 0..30 {
            f.tick(0.016, None);
        }
        f.respawn(p, Quat::IDENTITY);
        let second = f.boids().to_vec();

        assert_eq!(second.len(), 12);
        let traits = |b: &Boid| (b.size, b.tint, b.position);
        assert_ne!(
            first.iter().map(traits).collect::<Vec<_>>(),
            second.iter().map(traits).collect::<Vec<_>>()
        );

        // Same seed, same respawn history: same populations.
        let mut g = flock(12, AffectorMode::None);
        g.respawn(p, Quat::IDENTITY);
        assert_eq!(g.boids(), first.as_slice());
    }

    #[test]
    fn test_tracking_affector_follows_anchor() {
        let mut f = flock(8, AffectorMode::Tracking);
        f.respawn(Vec3::new(0.0, 0.5, 0.0), Quat::IDENTITY);
        assert!(f.affectors().is_empty());

        let anchor = Vec3::new(1.0, 1.6, 0.0);
        f.tick(0.016, Some(anchor));
        let a = f.affectors()[0];
        assert_eq!(a.axis, AffectorAxis::VerticalCylinder);
        assert!(a.effective_position(f.target()).distance(anchor) < 1e-5);
        let generation = f.affector_generation();

        // Tunables resync every tick, without a reallocation.
        f.params_mut().affector_force = -0.9;
        f.tick(0.016, Some(Vec3::new(2.0, 1.6, 0.0)));
        assert_eq!(f.affectors()[0].force, -0.9);
        assert_eq!(f.affector_generation(), generation);

        // No anchor keeps the last offset.
        let offset = f.affectors()[0].position;
        f.params_mut().affector_distance = 0.7;
        f.tick(0.016, None);
        assert_eq!(f.affectors()[0].position, offset);
        assert_eq!(f.affectors()[0].distance, 0.7);
    }

    #[test]
    fn test_sequence_swaps_affectors() {
        let mode = AffectorMode::Sequence {
            initial_delay: 0.0,
            steps: vec![
                SequenceStep::points(vec![Vec3::X, Vec3::Y], 0.1),
                SequenceStep::pause(0.1),
            ],
        };
        let mut f = flock(4, mode);
        f.tick(0.05, None);
        assert_eq!(f.affectors().len(), 2);
        f.tick(0.05, None);
        f.tick(0.05, None);
        assert!(f.affectors().is_empty());
    }

    #[test]
    fn test_replace_affectors_stops_sequence() {
        let mode = AffectorMode::Sequence {
            initial_delay: 0.0,
            steps: vec![SequenceStep::pause(0.01)],
        };
        let mut f = flock(4, mode);
        let custom = vec![Affector {
            position: Vec3::ZERO,
            force: 0.1,
            distance: 0.1,
            axis: AffectorAxis::Point,
        }];
        f.replace_affectors(custom.clone());
        f.tick(1.0, None);
        f.tick(1.0, None);
        assert_eq!(f.affectors(), custom.as_slice());
        assert_eq!(f.gpu_affectors().len(), 1);
    }

    #[test]
    fn test_target_height_pin() {
        let mut f = flock(4, AffectorMode::None);
        f.set_target_height(Some(1.2));
        f.respawn(Vec3::new(1.0, 0.0, 1.0), Quat::IDENTITY);
        assert_eq!(f.target(), Vec3::new(1.0, 1.2, 1.0));

        f.set_target_height(None);
        f.set_target_position(Vec3::ZERO);
        assert_eq!(f.target(), Vec3::ZERO);
    }

    #[test]
    fn test_uniforms_track_last_tick() {
        let mut f = flock(10, AffectorMode::None);
        assert_eq!(f.uniforms(), FlockUniforms::default());
        f.tick(0.02, None);
        let u = f.uniforms();
        assert_eq!(u.boids_count, 10);
        assert_eq!(u.total_frames, 1);
        assert!((u.delta_time - 0.02).abs() < 1e-6);
        assert_eq!(f.gpu_boids().len(), 10);
    }
}
