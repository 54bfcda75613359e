// Looptone - Library exports for tests and benchmarks

pub mod audio;
pub mod messaging;
pub mod playback;
pub mod synth;

// Re-export commonly used types for convenience
pub use audio::engine::{AudioEngine, AudioError, SynthController};
pub use audio::timing::AudioTiming;
pub use messaging::channels::create_command_channel;
pub use playback::{
    ClockAnchor, Note, PlaybackCore, PlaybackEngine, PlaybackError, PlaybackStatus, Ticker,
    wrap_position,
};
pub use synth::envelope::RampParams;
pub use synth::gateway::{SynthError, SynthGateway};
pub use synth::mock::MockSynth;
pub use synth::voice::ScheduledVoice;
