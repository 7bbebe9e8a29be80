//! Timing utilities for the playback scheduler.
//!
//! Playback reads time through a [`TimeSource`] so the scheduler can run
//! against the real monotonic clock or a manually advanced one:
//! - [`MonotonicTime`] for interactive use
//! - [`ManualTime`] for deterministic simulation
//! - [`RateController`] for throttling state publication

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A source of monotonic nanosecond timestamps.
pub trait TimeSource {
    /// Nanoseconds since an arbitrary fixed origin.
    fn now_ns(&self) -> u64;
}

/// Real monotonic time anchored at construction.
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    epoch: Instant,
}

impl MonotonicTime {
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::start()
    }
}

impl TimeSource for MonotonicTime {
    fn now_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}

/// Manually advanced time. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now_ns: Arc<AtomicU64>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now_ns
            .fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Jump to an absolute timestamp.
    pub fn set_ns(&self, ns: u64) {
        self.now_ns.store(ns, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn now_ns(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
}

/// Convert a nanosecond value to seconds.
pub fn ns_to_secs(ns: u64) -> f64 {
    ns as f64 / 1_000_000_000.0
}

/// Convert a frame index to seconds at the given rate.
pub fn frames_to_secs(frames: f64, fps: u32) -> f64 {
    frames / fps.max(1) as f64
}

/// Convert seconds to the nearest whole frame, never negative.
pub fn secs_to_frames(secs: f64, fps: u32) -> u64 {
    (secs * fps as f64).round().max(0.0) as u64
}

/// Rate limiter for throttled state publication.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        Self {
            target_interval_ns: 1_000_000_000 / target_hz.max(1) as u64,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Forget the last tick so the next call fires immediately.
    pub fn reset(&mut self) {
        self.last_tick_ns = None;
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_time_elapsed() {
        let time = MonotonicTime::start();
        assert!(time.now_ns() < 1_000_000_000);
    }

    #[test]
    fn test_manual_time_shared_between_clones() {
        let time = ManualTime::new();
        let handle = time.clone();
        handle.advance(Duration::from_millis(250));
        assert_eq!(time.now_ns(), 250_000_000);
        time.set_ns(5);
        assert_eq!(handle.now_ns(), 5);
    }

    #[test]
    fn test_frame_conversions() {
        assert!((ns_to_secs(1_500_000_000) - 1.5).abs() < 1e-9);
        assert!((frames_to_secs(45.0, 30) - 1.5).abs() < 1e-9);
        assert_eq!(secs_to_frames(1.5, 30), 45);
        assert_eq!(secs_to_frames(0.049, 30), 1);
        assert_eq!(secs_to_frames(-2.0, 30), 0);
    }

    #[test]
    fn test_rate_controller() {
        let mut ctrl = RateController::new(10);
        assert!(ctrl.should_tick(0)); // first tick always fires
        assert!(!ctrl.should_tick(16_000_000)); // one display refresh later, too soon
        assert!(ctrl.should_tick(100_000_000));
        ctrl.reset();
        assert!(ctrl.should_tick(101_000_000));
    }
}
