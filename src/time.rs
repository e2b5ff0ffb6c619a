//! Simulated time.
//!
//! The flock never reads a wall clock: the host passes `dt` into every tick
//! and [`SimClock`] turns it into the scaled delta, elapsed time and tick
//! counter the kernel consumes.
//!
//! # Example
//!
//! ```
//! use arflock::time::SimClock;
//!
//! let mut clock = SimClock::new();
//! clock.set_time_scale(0.5);
//! let dt = clock.advance(1.0 / 30.0);
//! assert!((dt - 1.0 / 60.0).abs() < 1e-6);
//! assert_eq!(clock.ticks(), 1);
//! ```

/// Accumulates simulated time from host-supplied deltas.
#[derive(Clone, Debug, PartialEq)]
pub struct SimClock {
    /// Total simulated seconds.
    elapsed: f64,
    /// Scaled delta of the last tick.
    delta: f32,
    /// Ticks advanced since start (paused ticks included).
    ticks: u64,
    paused: bool,
    /// Replaces the host delta when set.
    fixed_delta: Option<f32>,
    /// Multiplier applied to every delta (1.0 = real time).
    time_scale: f32,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            ticks: 0,
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
        }
    }

    /// Advance by a host delta and return the delta the kernel should use.
    ///
    /// Negative or non-finite deltas count as zero.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.ticks += 1;

        if self.paused {
            self.delta = 0.0;
            return 0.0;
        }

        let raw = self.fixed_delta.unwrap_or(dt);
        let raw = if raw.is_finite() { raw.max(0.0) } else { 0.0 };
        self.delta = raw * self.time_scale;
        self.elapsed += self.delta as f64;
        self.delta
    }

    /// Simulated seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    /// Delta of the last tick.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// While paused, ticks still run but with a zero delta.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Use a fixed delta regardless of what the host passes. `None` restores
    /// host timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Negative scales clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn reset(&mut self) {
        *self = Self {
            fixed_delta: self.fixed_delta,
            time_scale: self.time_scale,
            ..Self::new()
        };
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_new() {
        let clock = SimClock::new();
        assert_eq!(clock.ticks(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        assert!(!clock.is_paused());
        assert_eq!(clock.time_scale(), 1.0);
    }

    #[test]
    fn test_clock_advance() {
        let mut clock = SimClock::new();
        clock.advance(0.25);
        clock.advance(0.25);
        assert_eq!(clock.ticks(), 2);
        assert!((clock.elapsed() - 0.5).abs() < 1e-6);
        assert_eq!(clock.delta(), 0.25);
    }

    #[test]
    fn test_clock_pause() {
        let mut clock = SimClock::new();
        clock.advance(0.1);
        clock.pause();

        let before = clock.elapsed();
        assert_eq!(clock.advance(0.1), 0.0);
        assert_eq!(clock.elapsed(), before);
        assert_eq!(clock.ticks(), 2);

        clock.resume();
        assert!(clock.advance(0.1) > 0.0);
    }

    #[test]
    fn test_clock_rejects_bad_deltas() {
        let mut clock = SimClock::new();
        assert_eq!(clock.advance(-1.0), 0.0);
        assert_eq!(clock.advance(f32::NAN), 0.0);
        assert_eq!(clock.advance(f32::INFINITY), 0.0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_time_scale_clamps() {
        let mut clock = SimClock::new();
        clock.set_time_scale(2.0);
        assert_eq!(clock.time_scale(), 2.0);
        clock.set_time_scale(-1.0);
        assert_eq!(clock.time_scale(), 0.0);
    }

    #[test]
    fn test_fixed_delta() {
        let mut clock = SimClock::new();
        clock.set_fixed_delta(Some(1.0 / 60.0));
        let dt = clock.advance(0.5);
        assert!((dt - 1.0 / 60.0).abs() < 1e-6);

        clock.reset();
        assert_eq!(clock.ticks(), 0);
        assert!((clock.advance(0.5) - 1.0 / 60.0).abs() < 1e-6);
    }
}
