// Voix programmée - Une note plaquée sur l'horloge du backend

use super::envelope::RampParams;
use super::oscillator::SineOscillator;
use crate::messaging::VoiceSpec;

/// A note rendered over an absolute window of backend-clock time
///
/// The window is [start, stop) in seconds. A voice whose onset is already
/// past when it first renders picks up mid envelope, which is how a note
/// scheduled behind the clock plays its remainder.
pub struct ScheduledVoice {
    oscillator: SineOscillator,
    envelope: RampParams,
    start_seconds: f64,
    stop_seconds: f64,
    gain: f32,
    finished: bool,
}

impl ScheduledVoice {
    pub fn new(spec: VoiceSpec, sample_rate: f32) -> Self {
        let mut oscillator = SineOscillator::new(sample_rate);
        oscillator.set_frequency(spec.frequency);

        Self {
            oscillator,
            envelope: RampParams::default(),
            start_seconds: spec.start_seconds,
            stop_seconds: spec.stop_seconds,
            gain: spec.gain,
            // Une fenêtre vide ne sonne jamais
            finished: !(spec.stop_seconds > spec.start_seconds),
        }
    }

    /// Render one sample at the given backend-clock reading
    pub fn next_sample(&mut self, now_seconds: f64) -> f32 {
        if self.finished || now_seconds < self.start_seconds {
            return 0.0;
        }

        if now_seconds >= self.stop_seconds {
            self.finished = true;
            return 0.0;
        }

        let elapsed = now_seconds - self.start_seconds;
        let duration = self.stop_seconds - self.start_seconds;
        let envelope_value = self.envelope.gain_at(elapsed, duration, self.gain);

        self.oscillator.next_sample() * envelope_value
    }

    /// Whether the voice has sounded its whole window and can be dropped
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44100.0;

    fn spec(start: f64, stop: f64) -> VoiceSpec {
        VoiceSpec {
            start_seconds: start,
            stop_seconds: stop,
            frequency: 440.0,
            gain: 0.8,
        }
    }

    #[test]
    fn test_silent_before_onset() {
        let mut voice = ScheduledVoice::new(spec(1.0, 2.0), SAMPLE_RATE);
        assert_eq!(voice.next_sample(0.5), 0.0);
        assert!(!voice.is_finished());
    }

    #[test]
    fn test_sounds_inside_window() {
        let mut voice = ScheduledVoice::new(spec(1.0, 2.0), SAMPLE_RATE);

        let mut peak: f32 = 0.0;
        let step = 1.0 / SAMPLE_RATE as f64;
        let mut now = 1.2;
        for _ in 0..1000 {
            peak = peak.max(voice.next_sample(now).abs());
            now += step;
        }

        assert!(peak > 0.1, "voice stayed silent mid window: {}", peak);
        assert!(!voice.is_finished());
    }

    #[test]
    fn test_finishes_after_stop() {
        let mut voice = ScheduledVoice::new(spec(1.0, 2.0), SAMPLE_RATE);
        assert_eq!(voice.next_sample(2.0), 0.0);
        assert!(voice.is_finished());
        assert_eq!(voice.next_sample(2.5), 0.0);
    }

    #[test]
    fn test_empty_window_never_sounds() {
        let mut voice = ScheduledVoice::new(spec(2.0, 2.0), SAMPLE_RATE);
        assert!(voice.is_finished());
        assert_eq!(voice.next_sample(2.0), 0.0);

        let mut inverted = ScheduledVoice::new(spec(2.0, 1.0), SAMPLE_RATE);
        assert!(inverted.is_finished());
        assert_eq!(inverted.next_sample(1.5), 0.0);
    }

    #[test]
    fn test_past_onset_plays_remainder() {
        // Rendering starts half way through the window
        let mut voice = ScheduledVoice::new(spec(0.0, 1.0), SAMPLE_RATE);

        let mut peak: f32 = 0.0;
        let step = 1.0 / SAMPLE_RATE as f64;
        let mut now = 0.5;
        for _ in 0..1000 {
            peak = peak.max(voice.next_sample(now).abs());
            now += step;
        }

        assert!(peak > 0.1, "remainder stayed silent: {}", peak);
    }
}
