// Playback module
// Looping transport, clock reconciliation, and the note timeline

pub mod clock;
pub mod engine;
pub mod note;
pub mod ticker;

pub use clock::{ClockAnchor, wrap_position};
pub use engine::{PlaybackCore, PlaybackEngine, PlaybackError, PlaybackStatus};
pub use note::{DEFAULT_VELOCITY, Note};
pub use ticker::{ManualTicker, ManualTickerHandle, TICK_INTERVAL, ThreadTicker, Ticker};
