// Polling cadence for position refresh and loop-wrap detection
//
// The engine recomputes its position and detects loop wraparound on a
// periodic callback. The cadence is injected so tests can fire ticks by hand
// instead of waiting on real time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Target interval between executed ticks (~60 Hz)
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Granularity at which the tick thread re-checks its run flag
const POLL_GRANULARITY: Duration = Duration::from_millis(1);

/// A repeating callback source for the engine's polling loop
pub trait Ticker: Send {
    /// Begin invoking `on_tick` at the polling cadence, replacing any
    /// previous loop
    fn start(&mut self, on_tick: Box<dyn FnMut() + Send>);

    /// Cancel the loop. No callback runs after this returns. Must not be
    /// called from inside the tick callback.
    fn stop(&mut self);
}

/// Production ticker backed by a worker thread
///
/// The thread wakes every millisecond and fires the callback once at least
/// [`TICK_INTERVAL`] has passed since the last firing, so a late wakeup
/// shifts the next tick instead of bunching ticks together.
pub struct ThreadTicker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadTicker {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl Default for ThreadTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticker for ThreadTicker {
    fn start(&mut self, mut on_tick: Box<dyn FnMut() + Send>) {
        self.stop();

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        self.handle = Some(thread::spawn(move || {
            let mut last_tick = Instant::now();

            while running.load(Ordering::SeqCst) {
                let now = Instant::now();
                if now.duration_since(last_tick) >= TICK_INTERVAL {
                    on_tick();
                    last_tick = now;
                }
                thread::sleep(POLL_GRANULARITY);
            }
        }));
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

type TickFn = Box<dyn FnMut() + Send>;
type TickSlot = Arc<Mutex<Option<TickFn>>>;

/// Test ticker fired by hand through a [`ManualTickerHandle`]
pub struct ManualTicker {
    slot: TickSlot,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle for firing ticks after the ticker itself has been handed to
    /// the engine
    pub fn handle(&self) -> ManualTickerHandle {
        ManualTickerHandle {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl Default for ManualTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self, on_tick: Box<dyn FnMut() + Send>) {
        *self.slot.lock().unwrap() = Some(on_tick);
    }

    fn stop(&mut self) {
        *self.slot.lock().unwrap() = None;
    }
}

#[derive(Clone)]
pub struct ManualTickerHandle {
    slot: TickSlot,
}

impl ManualTickerHandle {
    /// Fire one tick if a loop is active; returns whether a callback ran
    pub fn tick(&self) -> bool {
        let mut slot = self.slot.lock().unwrap();
        match slot.as_mut() {
            Some(on_tick) => {
                on_tick();
                true
            }
            None => false,
        }
    }

    /// Whether the engine currently has a polling loop registered
    pub fn is_active(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }
}
