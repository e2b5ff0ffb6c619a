//! Serializable flock configuration.
//!
//! Everything needed to build a [`Flock`](crate::Flock) except the animation
//! source, which is a live mesh rather than data. Configurations load from
//! JSON; missing fields take their defaults.

use crate::affector::{affectors_from_points, Affector, AffectorAxis, PointLayout};
use crate::error::FlockError;
use crate::params::FlockParams;
use crate::sequence::{AffectorSequence, SequenceStep};
use crate::store::SeedSettings;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Where the flock's affectors come from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum AffectorMode {
    /// No affectors; boids only flock and return home.
    #[default]
    None,
    /// A fixed point layout, built once at initialization.
    Points {
        points: Vec<Vec3>,
        #[serde(default)]
        layout: PointLayout,
        #[serde(default)]
        force: Option<f32>,
        #[serde(default)]
        distance: Option<f32>,
        #[serde(default)]
        axis: AffectorAxis,
    },
    /// One vertical-cylinder affector following an anchor passed to every
    /// tick. Force and distance track `AffectorForce` / `AffectorDistance`.
    Tracking,
    /// Stages swapped on a timer.
    Sequence {
        #[serde(default)]
        initial_delay: f32,
        steps: Vec<SequenceStep>,
    },
}

impl AffectorMode {
    /// Affectors present right after initialization.
    pub fn initial_affectors(&self, params: &FlockParams) -> Vec<Affector> {
        match self {
            AffectorMode::Points {
                points,
                layout,
                force,
                distance,
                axis,
            } => affectors_from_points(
                &layout.apply(points),
                force.unwrap_or(params.affector_force),
                distance.unwrap_or(params.affector_distance),
                *axis,
            ),
            AffectorMode::None | AffectorMode::Tracking | AffectorMode::Sequence { .. } => {
                Vec::new()
            }
        }
    }

    pub fn sequence(&self) -> Option<AffectorSequence> {
        match self {
            AffectorMode::Sequence {
                initial_delay,
                steps,
            } => Some(AffectorSequence::new(*initial_delay, steps.clone())),
            _ => None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self, AffectorMode::Tracking)
    }
}

/// Complete flock configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    pub name: String,
    pub seed: SeedSettings,
    pub params: FlockParams,
    pub affectors: AffectorMode,
    /// Reference position used until the first respawn.
    pub origin: Vec3,
    pub rotation: Quat,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            name: "Untitled".into(),
            seed: SeedSettings::default(),
            params: FlockParams::default(),
            affectors: AffectorMode::default(),
            origin: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl FlockConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FlockError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FlockError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, FlockError> {
        Ok(serde_json::from_str(json)?)
    }
}
