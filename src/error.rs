//! Error types for arflock.
//!
//! Only initialization and configuration loading can fail. Once a flock is
//! running, degenerate inputs are absorbed by the kernel instead of being
//! reported.

use std::fmt;

/// Errors surfaced while building or configuring a flock.
#[derive(Debug)]
pub enum FlockError {
    /// The mesh used for the animation table has no vertices.
    EmptyMesh,
    /// The animation clip cannot be sampled (bad frame rate, length, or shape).
    InvalidClip(String),
    /// The clip sampler failed while baking a specific frame.
    ClipSampling {
        /// Frame being baked when the sampler failed.
        frame: usize,
        /// Reason reported by the sampler.
        reason: String,
    },
    /// Failed to read or write a configuration file.
    Io(std::io::Error),
    /// Configuration file is not valid JSON for [`FlockConfig`](crate::FlockConfig).
    Config(serde_json::Error),
    /// A tunable name that is not one of the recognized options.
    UnknownParam(String),
}

impl fmt::Display for FlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlockError::EmptyMesh => write!(f, "Animation mesh has zero vertices"),
            FlockError::InvalidClip(msg) => write!(f, "Invalid animation clip: {}", msg),
            FlockError::ClipSampling { frame, reason } => {
                write!(f, "Failed to bake animation frame {}: {}", frame, reason)
            }
            FlockError::Io(e) => write!(f, "Failed to access flock config: {}", e),
            FlockError::Config(e) => write!(f, "Failed to parse flock config: {}", e),
            FlockError::UnknownParam(name) => write!(f, "Unknown tunable parameter: {}", name),
        }
    }
}

impl std::error::Error for FlockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlockError::Io(e) => Some(e),
            FlockError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FlockError {
    fn from(e: std::io::Error) -> Self {
        FlockError::Io(e)
    }
}

impl From<serde_json::Error> for FlockError {
    fn from(e: serde_json::Error) -> Self {
        FlockError::Config(e)
    }
}
