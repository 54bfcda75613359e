// Note representation for the looping timeline
// A note is a scheduled tone with a position, duration, frequency, and velocity

use serde::{Deserialize, Serialize};

/// Loudness used when a note carries no explicit velocity
pub const DEFAULT_VELOCITY: f32 = 0.5;

/// A scheduled tone on the looping timeline
///
/// `time` is the offset in seconds from the start of the loop; all offsets are
/// interpreted modulo the timeline duration. Notes are immutable value
/// records; edits go through `add_note`/`remove_note` on the engine, which
/// owns the collection. Fields are stored exactly as given; validity is
/// enforced at the scheduling boundary (see [`Note::is_schedulable`]), not at
/// construction, so an invalid note still shows up in `notes()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Caller-supplied identifier. Uniqueness is not enforced; removal
    /// matches every note sharing the id.
    pub id: String,

    /// Offset in seconds from the start of the timeline loop
    pub time: f64,

    /// Length of the tone in seconds
    pub duration: f64,

    /// Pitch in Hz
    pub frequency: f32,

    /// Loudness in [0, 1]; `None` falls back to [`DEFAULT_VELOCITY`]
    pub velocity: Option<f32>,
}

impl Note {
    /// Creates a note with the default velocity
    pub fn new(id: impl Into<String>, time: f64, duration: f64, frequency: f32) -> Self {
        Self {
            id: id.into(),
            time,
            duration,
            frequency,
            velocity: None,
        }
    }

    /// Sets an explicit velocity
    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Effective loudness, clamped into [0, 1]
    pub fn velocity_or_default(&self) -> f32 {
        self.velocity.unwrap_or(DEFAULT_VELOCITY).clamp(0.0, 1.0)
    }

    /// Whether this note can be realized as sound
    ///
    /// Backends skip unschedulable notes one by one without aborting the
    /// batch they arrive in. The predicate lives here so every backend
    /// applies the same filter.
    pub fn is_schedulable(&self) -> bool {
        self.frequency.is_finite()
            && self.frequency > 0.0
            && self.time.is_finite()
            && self.time >= 0.0
    }

    /// End of the note relative to the start of the loop (in seconds)
    pub fn end_time(&self) -> f64 {
        self.time + self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_creation() {
        let note = Note::new("n1", 1.5, 0.5, 440.0);

        assert_eq!(note.id, "n1");
        assert_eq!(note.time, 1.5);
        assert_eq!(note.duration, 0.5);
        assert_eq!(note.frequency, 440.0);
        assert_eq!(note.velocity, None);
    }

    #[test]
    fn test_default_velocity() {
        let note = Note::new("n1", 0.0, 1.0, 440.0);
        assert_eq!(note.velocity_or_default(), DEFAULT_VELOCITY);

        let loud = Note::new("n2", 0.0, 1.0, 440.0).with_velocity(0.9);
        assert_eq!(loud.velocity_or_default(), 0.9);

        // Explicit zero is zero, not the default
        let silent = Note::new("n3", 0.0, 1.0, 440.0).with_velocity(0.0);
        assert_eq!(silent.velocity_or_default(), 0.0);
    }

    #[test]
    fn test_velocity_clamping() {
        let over = Note::new("n1", 0.0, 1.0, 440.0).with_velocity(1.5);
        assert_eq!(over.velocity_or_default(), 1.0);

        let under = Note::new("n2", 0.0, 1.0, 440.0).with_velocity(-0.25);
        assert_eq!(under.velocity_or_default(), 0.0);
    }

    #[test]
    fn test_schedulability() {
        assert!(Note::new("ok", 0.0, 0.5, 440.0).is_schedulable());

        // Non-positive or non-finite frequency
        assert!(!Note::new("zero_hz", 0.0, 0.5, 0.0).is_schedulable());
        assert!(!Note::new("neg_hz", 0.0, 0.5, -440.0).is_schedulable());
        assert!(!Note::new("nan_hz", 0.0, 0.5, f32::NAN).is_schedulable());
        assert!(!Note::new("inf_hz", 0.0, 0.5, f32::INFINITY).is_schedulable());

        // Negative or non-finite start offset
        assert!(!Note::new("neg_time", -0.1, 0.5, 440.0).is_schedulable());
        assert!(!Note::new("nan_time", f64::NAN, 0.5, 440.0).is_schedulable());
    }

    #[test]
    fn test_end_time() {
        let note = Note::new("n1", 1.25, 0.5, 440.0);
        assert_eq!(note.end_time(), 1.75);
    }
}
