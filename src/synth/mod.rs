// Module synthèse - Voix programmées et accès au backend

pub mod envelope;
pub mod gateway;
pub mod mock;
pub mod oscillator;
pub mod voice;

pub use envelope::RampParams;
pub use gateway::{SynthError, SynthGateway};
pub use mock::{MockSynth, ScheduledBatch};
pub use oscillator::SineOscillator;
pub use voice::ScheduledVoice;
