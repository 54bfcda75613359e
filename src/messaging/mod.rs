// Module messaging - Canaux lock-free vers le callback audio

pub mod channels;
pub mod command;

pub use channels::{CommandConsumer, CommandProducer, create_command_channel};
pub use command::{SynthCommand, VoiceSpec};
