// Types de commandes - Communication contrôle → Audio

/// One note resolved against the backend clock, ready to render
///
/// Absolute times in seconds. The gain is the note velocity after
/// defaulting and clamping, so the callback applies it untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSpec {
    pub start_seconds: f64,
    pub stop_seconds: f64,
    pub frequency: f32,
    pub gain: f32,
}

#[derive(Debug, Clone, Copy)]
pub enum SynthCommand {
    Schedule(VoiceSpec),
    SilenceAll,
}
