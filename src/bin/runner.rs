//! Flock Runner
//!
//! Loads a flock config from JSON and runs it headless, logging flock
//! statistics as it goes. A viewer anchor orbits the target so tracking
//! configs have something to follow.
//!
//! Usage: `flock-runner [config.json] [ticks]`
//!
//! Set `RUST_LOG=arflock=debug` for per-step detail.

use arflock::prelude::*;
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn};

const DT: f32 = 1.0 / 60.0;
const DEFAULT_TICKS: u64 = 600;
const REPORT_EVERY: u64 = 60;

/// A flat arrowhead pointing down +Z; stands in for a bird mesh.
const ARROW_MESH: [Vec3; 4] = [
    Vec3::new(0.0, 0.0, 0.05),
    Vec3::new(-0.03, 0.0, -0.03),
    Vec3::new(0.03, 0.0, -0.03),
    Vec3::new(0.0, 0.01, -0.02),
];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Flap the arrow's wings over a short looping clip.
fn arrow_clip() -> KeyframeClip {
    let frames = (0..8)
        .map(|i| {
            let lift = (i as f32 / 8.0 * std::f32::consts::TAU).sin() * 0.02;
            ARROW_MESH
                .iter()
                .enumerate()
                .map(|(v, p)| if v == 1 || v == 2 { *p + Vec3::Y * lift } else { *p })
                .collect()
        })
        .collect();
    KeyframeClip::new(frames, 24.0)
}

fn load_config(args: &[String]) -> FlockConfig {
    let Some(path) = args.get(1).map(PathBuf::from) else {
        info!("no config file specified, using tracking defaults");
        return FlockConfig {
            name: "Tracking demo".into(),
            affectors: AffectorMode::Tracking,
            ..Default::default()
        };
    };

    match FlockConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            FlockConfig::default()
        }
    }
}

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let config = load_config(&args);
    let ticks = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TICKS);

    let origin = config.origin;
    let mut flock = Flock::new(config);
    let mut clip = arrow_clip();
    if let Err(e) = flock.initialize(AnimationSource::Clip(&mut clip)) {
        error!(error = %e, "failed to initialize flock");
        std::process::exit(1);
    }
    flock.respawn(origin, Quat::IDENTITY);

    for tick in 0..ticks {
        let angle = tick as f32 * DT * 0.5;
        let anchor = flock.target() + Vec3::new(angle.cos(), 1.0, angle.sin());
        let boids = flock.tick(DT, Some(anchor));

        if (tick + 1) % REPORT_EVERY == 0 {
            let count = boids.len().max(1) as f32;
            let center = boids.iter().map(|b| b.position).sum::<Vec3>() / count;
            let mean_speed = boids.iter().map(|b| b.speed).sum::<f32>() / count;
            let spread = boids
                .iter()
                .map(|b| b.position.distance(center))
                .fold(0.0f32, f32::max);
            info!(
                tick = tick + 1,
                ?center,
                spread,
                mean_speed,
                affectors = flock.affectors().len(),
                "flock stats"
            );
        }
    }

    info!(
        ticks,
        elapsed = flock.clock().elapsed(),
        boids = flock.boids().len(),
        "run complete"
    );
}
