// Scheduling port between the playback engine and an audio backend
//
// The engine drives playback purely through this trait. The production
// implementation is the CPAL-backed `SynthController`; tests substitute
// `MockSynth` and a virtual clock.

use thiserror::Error;

use crate::playback::Note;

/// Errors surfaced by an audio backend's lifecycle operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthError {
    #[error("Audio backend failed to start: {0}")]
    StartFailed(String),

    #[error("Audio backend failed to resume: {0}")]
    ResumeFailed(String),

    #[error("Audio backend failed to suspend: {0}")]
    SuspendFailed(String),
}

/// Abstract audio backend the playback engine schedules against
///
/// Time is the backend's own monotonic clock in seconds. The clock only
/// advances while the backend is running; `suspend` freezes it and `resume`
/// continues from the frozen reading.
pub trait SynthGateway: Send {
    /// Bring the backend into the running state, creating it on first use
    fn start(&mut self) -> Result<(), SynthError>;

    /// Resume a suspended backend. The clock continues from where it froze.
    fn resume(&mut self) -> Result<(), SynthError>;

    /// Suspend the backend, freezing its clock and silencing output
    fn suspend(&mut self) -> Result<(), SynthError>;

    /// Current reading of the backend clock, in seconds
    fn current_time_seconds(&self) -> f64;

    /// Schedule every playable note against `anchor`, the backend-clock
    /// instant corresponding to timeline position zero
    ///
    /// A note whose onset lies before the current clock reading plays its
    /// remainder. `anchor` may be negative when playback resumed mid
    /// timeline. Notes that fail playability checks are skipped, never
    /// errors.
    fn schedule_notes(&mut self, notes: &[Note], anchor: f64);

    /// Cut every sounding and pending voice
    fn silence_all(&mut self);
}
