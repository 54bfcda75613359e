// Mock audio backend with a hand-driven clock
//
// Stands in for the CPAL controller in unit and integration tests. The
// clock is virtual: it advances only through `advance()`, and only while
// the backend is running, which reproduces the freeze-on-suspend behavior
// of the real clock without real time.

use log::warn;
use std::sync::{Arc, Mutex};

use super::gateway::{SynthError, SynthGateway};
use crate::playback::Note;

/// One recorded `schedule_notes` call, after playability filtering
#[derive(Debug, Clone)]
pub struct ScheduledBatch {
    pub anchor: f64,
    pub notes: Vec<Note>,
}

#[derive(Debug)]
struct MockState {
    clock: f64,
    running: bool,
    started: bool,
    start_calls: u32,
    resume_calls: u32,
    suspend_calls: u32,
    silence_calls: u32,
    fail_start: bool,
    fail_resume: bool,
    fail_suspend: bool,
    batches: Vec<ScheduledBatch>,
}

/// Cloneable handle over shared mock state
///
/// Clone one copy into the engine under test and keep the other to drive
/// the clock and inspect what got scheduled.
#[derive(Clone)]
pub struct MockSynth {
    state: Arc<Mutex<MockState>>,
}

impl MockSynth {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                clock: 0.0,
                running: false,
                started: false,
                start_calls: 0,
                resume_calls: 0,
                suspend_calls: 0,
                silence_calls: 0,
                fail_start: false,
                fail_resume: false,
                fail_suspend: false,
                batches: Vec::new(),
            })),
        }
    }

    /// Advance the virtual clock. Ignored while suspended, like the real
    /// backend clock.
    pub fn advance(&self, seconds: f64) {
        let mut state = self.state.lock().unwrap();
        if state.running {
            state.clock += seconds;
        }
    }

    /// Force the clock to an arbitrary reading, including a non-finite one
    pub fn set_clock(&self, seconds: f64) {
        self.state.lock().unwrap().clock = seconds;
    }

    pub fn clock(&self) -> f64 {
        self.state.lock().unwrap().clock
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().unwrap().started
    }

    pub fn start_calls(&self) -> u32 {
        self.state.lock().unwrap().start_calls
    }

    pub fn resume_calls(&self) -> u32 {
        self.state.lock().unwrap().resume_calls
    }

    pub fn suspend_calls(&self) -> u32 {
        self.state.lock().unwrap().suspend_calls
    }

    pub fn silence_calls(&self) -> u32 {
        self.state.lock().unwrap().silence_calls
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.state.lock().unwrap().fail_start = fail;
    }

    pub fn set_fail_resume(&self, fail: bool) {
        self.state.lock().unwrap().fail_resume = fail;
    }

    pub fn set_fail_suspend(&self, fail: bool) {
        self.state.lock().unwrap().fail_suspend = fail;
    }

    /// Every recorded schedule call, oldest first
    pub fn batches(&self) -> Vec<ScheduledBatch> {
        self.state.lock().unwrap().batches.clone()
    }

    pub fn last_batch(&self) -> Option<ScheduledBatch> {
        self.state.lock().unwrap().batches.last().cloned()
    }

    pub fn batch_count(&self) -> usize {
        self.state.lock().unwrap().batches.len()
    }

    pub fn clear_batches(&self) {
        self.state.lock().unwrap().batches.clear();
    }
}

impl Default for MockSynth {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthGateway for MockSynth {
    fn start(&mut self) -> Result<(), SynthError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_start {
            return Err(SynthError::StartFailed("injected start failure".to_string()));
        }
        state.start_calls += 1;
        state.started = true;
        state.running = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), SynthError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_resume {
            return Err(SynthError::ResumeFailed(
                "injected resume failure".to_string(),
            ));
        }
        state.resume_calls += 1;
        state.running = true;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), SynthError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_suspend {
            return Err(SynthError::SuspendFailed(
                "injected suspend failure".to_string(),
            ));
        }
        state.suspend_calls += 1;
        state.running = false;
        Ok(())
    }

    fn current_time_seconds(&self) -> f64 {
        self.state.lock().unwrap().clock
    }

    fn schedule_notes(&mut self, notes: &[Note], anchor: f64) {
        if !anchor.is_finite() {
            warn!(
                "Discarding batch of {} notes, anchor {} is unusable",
                notes.len(),
                anchor
            );
            return;
        }

        let playable: Vec<Note> = notes
            .iter()
            .filter(|note| note.is_schedulable())
            .cloned()
            .collect();

        self.state.lock().unwrap().batches.push(ScheduledBatch {
            anchor,
            notes: playable,
        });
    }

    fn silence_all(&mut self) {
        self.state.lock().unwrap().silence_calls += 1;
    }
}
