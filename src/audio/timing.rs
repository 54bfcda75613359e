// Audio timing utilities for the shared backend clock

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Shared backend clock, counted in rendered samples
///
/// The audio callback advances the position once per buffer, but only while
/// the clock is running. Suspending freezes the reading in place, so a
/// suspended backend reports the same time until it is resumed.
#[derive(Clone)]
pub struct AudioTiming {
    /// Current sample position (incremented by audio callback)
    sample_position: Arc<AtomicU64>,
    /// Whether the clock is advancing
    running: Arc<AtomicBool>,
    /// Sample rate (for timestamp conversions)
    sample_rate: f64,
}

impl AudioTiming {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_position: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(false)),
            sample_rate: sample_rate as f64,
        }
    }

    /// Get current sample position (called from control thread)
    pub fn current_sample(&self) -> u64 {
        self.sample_position.load(Ordering::Relaxed)
    }

    /// Current clock reading in seconds
    pub fn seconds(&self) -> f64 {
        self.current_sample() as f64 / self.sample_rate
    }

    /// Advance sample position (called from audio callback). No-op while
    /// the clock is suspended.
    pub fn advance(&self, frames: usize) {
        if self.running.load(Ordering::Relaxed) {
            self.sample_position
                .fetch_add(frames as u64, Ordering::Relaxed);
        }
    }

    /// Let the clock advance again
    pub fn resume(&self) {
        self.running.store(true, Ordering::Relaxed);
    }

    /// Freeze the clock at its current reading
    pub fn suspend(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_creation() {
        let timing = AudioTiming::new(48000.0);
        assert_eq!(timing.current_sample(), 0);
        assert_eq!(timing.seconds(), 0.0);
        assert_eq!(timing.sample_rate(), 48000.0);
        assert!(!timing.is_running());
    }

    #[test]
    fn test_advance_samples_while_running() {
        let timing = AudioTiming::new(48000.0);
        timing.resume();
        timing.advance(480);
        assert_eq!(timing.current_sample(), 480);
        timing.advance(480);
        assert_eq!(timing.current_sample(), 960);
    }

    #[test]
    fn test_seconds_conversion() {
        let timing = AudioTiming::new(48000.0);
        timing.resume();
        timing.advance(48000);
        assert_eq!(timing.seconds(), 1.0);
        timing.advance(24000);
        assert_eq!(timing.seconds(), 1.5);
    }

    #[test]
    fn test_suspend_freezes_clock() {
        let timing = AudioTiming::new(48000.0);
        timing.resume();
        timing.advance(4800);
        let frozen = timing.seconds();

        timing.suspend();
        timing.advance(4800);
        timing.advance(4800);
        assert_eq!(timing.seconds(), frozen);

        timing.resume();
        timing.advance(4800);
        assert!(timing.seconds() > frozen);
    }

    #[test]
    fn test_clone_shares_position() {
        let timing = AudioTiming::new(48000.0);
        let view = timing.clone();
        timing.resume();
        timing.advance(100);
        assert_eq!(view.current_sample(), 100);
        assert!(view.is_running());
    }
}
