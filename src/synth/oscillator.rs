// Oscillateur sinusoïdal - Source d'onde des voix programmées

use std::f32::consts::PI;

pub struct SineOscillator {
    phase: f32,
    phase_increment: f32,
    sample_rate: f32,
}

impl SineOscillator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_increment: 0.0,
            sample_rate,
        }
    }

    pub fn set_frequency(&mut self, freq: f32) {
        self.phase_increment = freq / self.sample_rate;
    }

    pub fn next_sample(&mut self) -> f32 {
        let sample = (self.phase * 2.0 * PI).sin();

        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44100.0;
    const EPSILON: f32 = 0.001;

    #[test]
    fn test_oscillator_frequency() {
        // Test que la fréquence est correctement appliquée
        let mut osc = SineOscillator::new(SAMPLE_RATE);
        osc.set_frequency(440.0);

        // Phase increment doit être freq / sample_rate
        let expected_increment = 440.0 / SAMPLE_RATE;
        assert!((osc.phase_increment - expected_increment).abs() < EPSILON);
    }

    #[test]
    fn test_oscillator_reset() {
        let mut osc = SineOscillator::new(SAMPLE_RATE);
        osc.set_frequency(440.0);

        // Avancer la phase
        for _ in 0..100 {
            osc.next_sample();
        }

        // La phase ne doit plus être à 0
        assert!(osc.phase > 0.0);

        // Reset
        osc.reset();
        assert_eq!(osc.phase, 0.0);
    }

    #[test]
    fn test_sine_amplitude() {
        let mut osc = SineOscillator::new(SAMPLE_RATE);
        osc.set_frequency(440.0);

        // Générer plusieurs samples et vérifier qu'ils sont dans [-1, 1]
        for _ in 0..1000 {
            let sample = osc.next_sample();
            assert!(sample >= -1.0 && sample <= 1.0, "Sample {} hors limites", sample);
        }
    }

    #[test]
    fn test_sine_starts_at_zero() {
        let mut osc = SineOscillator::new(SAMPLE_RATE);
        osc.set_frequency(440.0);

        // Premier sample doit être proche de 0 (sin(0) = 0)
        let first_sample = osc.next_sample();
        assert!(first_sample.abs() < EPSILON, "First sample: {}", first_sample);
    }

    #[test]
    fn test_phase_wrapping() {
        let mut osc = SineOscillator::new(SAMPLE_RATE);
        osc.set_frequency(440.0);

        // Générer assez de samples pour que la phase wrap plusieurs fois
        for _ in 0..10000 {
            osc.next_sample();
            // La phase doit toujours être dans [0, 1)
            assert!(
                osc.phase >= 0.0 && osc.phase < 1.0,
                "Phase out of range: {}",
                osc.phase
            );
        }
    }
}
