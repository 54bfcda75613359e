// Clock reconciliation - device clock, wall clock, and logical position
//
// One play segment is described by a single anchor: the device-clock reading
// at which the timeline reads position 0, paired with a wall-clock
// observation of the same moment. Every position the engine reports comes
// from `position_at` on the current anchor; nothing else stores a live
// position while playing.

use std::time::Instant;

/// Wrap an offset into `[0, timeline_duration)`
///
/// Euclidean remainder, so negative offsets land in bounds as well:
/// `wrap_position(-1.0, 4.0) == 3.0`. Inputs must be finite; callers reject
/// non-finite values before wrapping.
pub fn wrap_position(seconds: f64, timeline_duration: f64) -> f64 {
    let wrapped = seconds.rem_euclid(timeline_duration);
    // rem_euclid can round up to exactly the modulus for tiny negative inputs
    if wrapped >= timeline_duration { 0.0 } else { wrapped }
}

/// Clock anchors for one active play segment
///
/// `device_origin` is the device-clock reading corresponding to timeline
/// position 0. The wall-clock side is recorded as an `Instant` plus the
/// position current at that instant, which carries the same information as a
/// "wall instant of position 0" without ever subtracting a `Duration` from an
/// `Instant` (the subtraction can underflow early in a process).
#[derive(Debug, Clone, Copy)]
pub struct ClockAnchor {
    device_origin: f64,
    wall_at: Instant,
    wall_position: f64,
}

impl ClockAnchor {
    /// Anchor a fresh segment: "now" on both clocks is position 0
    pub fn at_start(device_now: f64, wall_now: Instant) -> Self {
        Self {
            device_origin: device_now,
            wall_at: wall_now,
            wall_position: 0.0,
        }
    }

    /// Re-anchor so that `position` falls on "now" (resume from pause, seek
    /// while playing). The origin may come out negative when the device
    /// clock is younger than the position; that is a legal anchor.
    pub fn at_position(device_now: f64, position: f64, wall_now: Instant) -> Self {
        Self {
            device_origin: device_now - position,
            wall_at: wall_now,
            wall_position: position,
        }
    }

    /// Device-clock reading corresponding to timeline position 0
    pub fn device_origin(&self) -> f64 {
        self.device_origin
    }

    /// The authoritative position formula: device-clock seconds elapsed
    /// since the anchor, unwrapped (loop-wrap detection needs the overshoot)
    pub fn position_at(&self, device_now: f64) -> f64 {
        device_now - self.device_origin
    }

    /// Position implied by the wall clock alone
    pub fn wall_position_at(&self, wall_now: Instant) -> f64 {
        self.wall_position + wall_now.duration_since(self.wall_at).as_secs_f64()
    }

    /// Seconds the device clock has fallen behind the wall clock since the
    /// anchor (negative when the device clock ran ahead)
    pub fn drift_at(&self, device_now: f64, wall_now: Instant) -> f64 {
        self.wall_position_at(wall_now) - self.position_at(device_now)
    }
}
