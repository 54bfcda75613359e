// Transport engine - Play/pause/stop/seek over a looping timeline
//
// The engine reconciles three clocks: the backend's device clock (used for
// scheduling), the wall clock (carried as a drift diagnostic across
// pauses), and the logical playback position observers poll. The device
// clock is authoritative; position is always derived from the current
// anchor, never integrated tick by tick.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use thiserror::Error;

use super::clock::{ClockAnchor, wrap_position};
use super::note::Note;
use super::ticker::{ThreadTicker, Ticker};
use crate::synth::gateway::{SynthError, SynthGateway};

/// Device/wall clock disagreement that gets one diagnostic log per segment
const DRIFT_LOG_THRESHOLD_SECONDS: f64 = 0.25;

/// Transport state (stopped/playing/paused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    Paused,
}

impl PlaybackStatus {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackStatus::Playing)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, PlaybackStatus::Paused)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, PlaybackStatus::Stopped)
    }

    /// Playing or paused, meaning an anchor exists
    pub fn is_active(&self) -> bool {
        !matches!(self, PlaybackStatus::Stopped)
    }
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        PlaybackStatus::Stopped
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error(transparent)]
    Synth(#[from] SynthError),

    #[error("Backend clock returned an unusable reading: {0}")]
    InvalidClock(f64),

    #[error("Seek time is not a finite number: {0}")]
    InvalidSeek(f64),
}

/// Transport state machine, synchronous over an injected backend
///
/// All clock reconciliation lives here. [`PlaybackEngine`] wraps this with
/// the polling loop; tests drive it directly for deterministic control.
pub struct PlaybackCore {
    synth: Box<dyn SynthGateway>,
    timeline_duration: f64,
    status: PlaybackStatus,
    /// Authoritative only while not playing; derived from the anchor otherwise
    position: f64,
    anchor: Option<ClockAnchor>,
    notes: Vec<Note>,
    drift_logged: bool,
}

impl PlaybackCore {
    pub fn new(synth: Box<dyn SynthGateway>, timeline_duration: f64) -> Self {
        assert!(
            timeline_duration.is_finite() && timeline_duration > 0.0,
            "timeline duration must be a positive number of seconds"
        );

        Self {
            synth,
            timeline_duration,
            status: PlaybackStatus::Stopped,
            position: 0.0,
            anchor: None,
            notes: Vec::new(),
            drift_logged: false,
        }
    }

    /// Start playing, or resume from the paused position
    ///
    /// No-op while already playing. Backend lifecycle failures and an
    /// unusable clock reading abort the call with state untouched.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if self.status.is_playing() {
            return Ok(());
        }

        let resuming = self.status.is_paused();
        if resuming {
            self.synth.resume()?;
        } else {
            self.synth.start()?;
        }

        let now = self.synth.current_time_seconds();
        if !now.is_finite() {
            warn!("Aborting play, backend clock reading {} is unusable", now);
            return Err(PlaybackError::InvalidClock(now));
        }

        let anchor = if resuming {
            // Continue from the frozen position
            ClockAnchor::at_position(now, self.position, Instant::now())
        } else {
            self.position = 0.0;
            ClockAnchor::at_start(now, Instant::now())
        };

        if resuming {
            // Replace whatever was left pending when playback paused
            self.synth.silence_all();
        }

        self.status = PlaybackStatus::Playing;
        self.anchor = Some(anchor);
        self.drift_logged = false;
        self.synth.schedule_notes(&self.notes, anchor.device_origin());
        Ok(())
    }

    /// Freeze the position and suspend the backend clock
    ///
    /// No-op unless playing. A rejected suspend leaves the engine playing
    /// so the caller can retry.
    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        if !self.status.is_playing() {
            return Ok(());
        }

        self.synth.suspend()?;

        // The clock is frozen now; its reading is the pause instant
        let now = self.synth.current_time_seconds();
        if now.is_finite() {
            if let Some(anchor) = self.anchor {
                self.position = wrap_position(anchor.position_at(now), self.timeline_duration);
            }
        } else {
            warn!(
                "Pausing with unusable clock reading {}, keeping last known position",
                now
            );
        }

        self.status = PlaybackStatus::Paused;
        Ok(())
    }

    /// Silence everything and reset to position zero
    pub fn stop(&mut self) {
        self.synth.silence_all();
        self.status = PlaybackStatus::Stopped;
        self.position = 0.0;
        self.anchor = None;
    }

    /// Move the playback position, wrapping into the timeline
    ///
    /// While playing this silences pending sound and reschedules every note
    /// against a fresh anchor. Otherwise only the logical position moves.
    pub fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError> {
        if !seconds.is_finite() {
            warn!("Rejecting seek to {}", seconds);
            return Err(PlaybackError::InvalidSeek(seconds));
        }

        let wrapped = wrap_position(seconds, self.timeline_duration);

        if self.status.is_playing() {
            let now = self.synth.current_time_seconds();
            if !now.is_finite() {
                warn!("Aborting seek, backend clock reading {} is unusable", now);
                return Err(PlaybackError::InvalidClock(now));
            }

            let anchor = ClockAnchor::at_position(now, wrapped, Instant::now());
            self.synth.silence_all();
            self.synth.schedule_notes(&self.notes, anchor.device_origin());
            self.anchor = Some(anchor);
            self.drift_logged = false;
        }

        self.position = wrapped;
        Ok(())
    }

    /// Append a note; while active, also schedule it into the current cycle
    ///
    /// The note is stored even when it cannot be scheduled. Immediate
    /// scheduling wants a usable non-negative anchor; before the device
    /// clock has advanced past the seeked position the anchor can sit below
    /// zero, in which case the note first sounds on the next cycle.
    pub fn add_note(&mut self, note: Note) {
        if self.status.is_active() {
            match self.anchor.map(|anchor| anchor.device_origin()) {
                Some(origin) if origin.is_finite() && origin >= 0.0 => {
                    self.synth
                        .schedule_notes(std::slice::from_ref(&note), origin);
                }
                origin => {
                    warn!(
                        "Note {} stored without scheduling, anchor {:?} is unusable",
                        note.id, origin
                    );
                }
            }
        }

        self.notes.push(note);
    }

    /// Remove every note with this id
    ///
    /// While playing, pending sound is silenced and the remaining set is
    /// rescheduled from the existing anchor, cutting any sounding note off.
    pub fn remove_note(&mut self, id: &str) {
        self.notes.retain(|note| note.id != id);

        if self.status.is_playing() {
            if let Some(anchor) = self.anchor {
                self.synth.silence_all();
                self.synth.schedule_notes(&self.notes, anchor.device_origin());
            }
        }
    }

    /// Swap the whole note collection
    ///
    /// Same playback semantics as [`remove_note`](Self::remove_note): while
    /// playing, the new set replaces all pending sound at once.
    pub fn replace_notes(&mut self, notes: Vec<Note>) {
        self.notes = notes;

        if self.status.is_playing() {
            if let Some(anchor) = self.anchor {
                self.synth.silence_all();
                self.synth.schedule_notes(&self.notes, anchor.device_origin());
            }
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Position within the current loop, recomputed live while playing
    pub fn current_position(&self) -> f64 {
        if self.status.is_playing() {
            if let Some(anchor) = self.anchor {
                let now = self.synth.current_time_seconds();
                if now.is_finite() {
                    return wrap_position(anchor.position_at(now), self.timeline_duration);
                }
            }
        }
        self.position
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn timeline_duration(&self) -> f64 {
        self.timeline_duration
    }

    /// One iteration of the polling loop: refresh position, detect the loop
    /// boundary, and emit the drift diagnostic
    ///
    /// Crossing the boundary silences everything, re-anchors at "now" for
    /// position zero and reschedules the full note set. Overshoot past the
    /// boundary is not carried into the new cycle.
    pub fn tick(&mut self) {
        if !self.status.is_playing() {
            return;
        }
        let Some(anchor) = self.anchor else {
            return;
        };

        let now = self.synth.current_time_seconds();
        if !now.is_finite() {
            warn!("Ignoring tick, backend clock reading {} is unusable", now);
            return;
        }

        let wall_now = Instant::now();
        let drift = anchor.drift_at(now, wall_now);
        if !self.drift_logged && drift.abs() > DRIFT_LOG_THRESHOLD_SECONDS {
            debug!(
                "Device and wall clock positions differ by {:.3}s this segment",
                drift
            );
            self.drift_logged = true;
        }

        if anchor.position_at(now) >= self.timeline_duration {
            self.synth.silence_all();
            let new_anchor = ClockAnchor::at_start(now, wall_now);
            self.synth
                .schedule_notes(&self.notes, new_anchor.device_origin());
            self.anchor = Some(new_anchor);
            self.position = 0.0;
            self.drift_logged = false;
        }
    }
}

/// Transport engine with its own polling loop
///
/// Wraps [`PlaybackCore`] behind a mutex shared with the ticker thread.
/// The loop runs only while playing: started by `play`, cancelled by
/// `pause` and `stop`.
pub struct PlaybackEngine {
    core: Arc<Mutex<PlaybackCore>>,
    ticker: Box<dyn Ticker>,
}

impl PlaybackEngine {
    pub fn new(synth: Box<dyn SynthGateway>, timeline_duration: f64) -> Self {
        Self::with_ticker(synth, timeline_duration, Box::new(ThreadTicker::new()))
    }

    pub fn with_ticker(
        synth: Box<dyn SynthGateway>,
        timeline_duration: f64,
        ticker: Box<dyn Ticker>,
    ) -> Self {
        Self {
            core: Arc::new(Mutex::new(PlaybackCore::new(synth, timeline_duration))),
            ticker,
        }
    }

    pub fn play(&mut self) -> Result<(), PlaybackError> {
        let entered_playing = {
            let mut core = self.core.lock().unwrap();
            let was_playing = core.status().is_playing();
            core.play()?;
            !was_playing
        };

        if entered_playing {
            let core = Arc::clone(&self.core);
            self.ticker.start(Box::new(move || {
                // Contention just skips this tick; the next one catches up
                if let Ok(mut core) = core.try_lock() {
                    core.tick();
                }
            }));
        }
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        let left_playing = {
            let mut core = self.core.lock().unwrap();
            let was_playing = core.status().is_playing();
            core.pause()?;
            was_playing
        };

        if left_playing {
            self.ticker.stop();
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        self.core.lock().unwrap().stop();
        self.ticker.stop();
    }

    pub fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError> {
        self.core.lock().unwrap().seek(seconds)
    }

    pub fn add_note(&mut self, note: Note) {
        self.core.lock().unwrap().add_note(note);
    }

    pub fn remove_note(&mut self, id: &str) {
        self.core.lock().unwrap().remove_note(id);
    }

    pub fn replace_notes(&mut self, notes: Vec<Note>) {
        self.core.lock().unwrap().replace_notes(notes);
    }

    pub fn status(&self) -> PlaybackStatus {
        self.core.lock().unwrap().status()
    }

    pub fn current_position(&self) -> f64 {
        self.core.lock().unwrap().current_position()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.core.lock().unwrap().notes().to_vec()
    }

    pub fn timeline_duration(&self) -> f64 {
        self.core.lock().unwrap().timeline_duration()
    }
}
