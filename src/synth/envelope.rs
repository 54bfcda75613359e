// Ramp envelope implementation
//
// Linear attack-sustain-release gain shape applied to each scheduled voice.
// The sustain level is the note velocity, so the whole shape is a trapezoid
// over the note's duration.

/// Ramp envelope parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampParams {
    /// Attack time in seconds (0.001 to 5.0)
    pub attack: f32,
    /// Release time in seconds (0.001 to 5.0)
    pub release: f32,
}

impl RampParams {
    /// Create ramp parameters with validation
    pub fn new(attack: f32, release: f32) -> Self {
        Self {
            attack: attack.clamp(0.001, 5.0),
            release: release.clamp(0.001, 5.0),
        }
    }

    /// Gain at `elapsed` seconds into a note that lasts `duration` seconds,
    /// sustaining at `peak`
    ///
    /// Zero outside the note window. Inside it, the attack ramp rises from
    /// the onset and the release ramp falls into the stop time; a note
    /// shorter than attack plus release takes the lower of the two ramps,
    /// so the shape degrades to a small triangle instead of clicking.
    pub fn gain_at(&self, elapsed: f64, duration: f64, peak: f32) -> f32 {
        if elapsed < 0.0 || elapsed >= duration || peak <= 0.0 {
            return 0.0;
        }

        let attack_ramp = (elapsed / self.attack as f64).min(1.0);
        let release_ramp = ((duration - elapsed) / self.release as f64).min(1.0);

        peak * attack_ramp.min(release_ramp) as f32
    }
}

impl Default for RampParams {
    fn default() -> Self {
        Self {
            attack: 0.01,  // 10ms attack
            release: 0.05, // 50ms release
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    #[test]
    fn test_ramp_params_default() {
        let params = RampParams::default();
        assert_eq!(params.attack, 0.01);
        assert_eq!(params.release, 0.05);
    }

    #[test]
    fn test_ramp_params_clamping() {
        let params = RampParams::new(-1.0, 10.0);
        assert!(params.attack >= 0.001);
        assert!(params.release <= 5.0);
    }

    #[test]
    fn test_silent_outside_window() {
        let params = RampParams::default();
        assert_eq!(params.gain_at(-0.1, 1.0, 0.8), 0.0);
        assert_eq!(params.gain_at(1.0, 1.0, 0.8), 0.0);
        assert_eq!(params.gain_at(2.0, 1.0, 0.8), 0.0);
    }

    #[test]
    fn test_attack_rises_to_peak() {
        let params = RampParams::new(0.01, 0.05);

        assert_eq!(params.gain_at(0.0, 1.0, 0.8), 0.0);

        let mid_attack = params.gain_at(0.005, 1.0, 0.8);
        assert!((mid_attack - 0.4).abs() < EPSILON);

        let sustained = params.gain_at(0.5, 1.0, 0.8);
        assert!((sustained - 0.8).abs() < EPSILON);
    }

    #[test]
    fn test_release_falls_into_stop() {
        let params = RampParams::new(0.01, 0.05);

        let mid_release = params.gain_at(0.975, 1.0, 0.8);
        assert!((mid_release - 0.4).abs() < EPSILON);

        let near_stop = params.gain_at(0.9999, 1.0, 0.8);
        assert!(near_stop < 0.01);
    }

    #[test]
    fn test_short_note_takes_lower_ramp() {
        let params = RampParams::new(0.01, 0.05);

        // 20ms note: attack and release windows overlap
        for i in 0..20 {
            let elapsed = i as f64 * 0.001;
            let gain = params.gain_at(elapsed, 0.02, 1.0);
            assert!(
                (0.0..=1.0).contains(&gain),
                "gain {} out of range at {}",
                gain,
                elapsed
            );
        }

        // Never reaches full peak on a note this short
        let apex = params.gain_at(0.01, 0.02, 1.0);
        assert!(apex < 0.5);
    }

    #[test]
    fn test_zero_peak_is_silent() {
        let params = RampParams::default();
        assert_eq!(params.gain_at(0.5, 1.0, 0.0), 0.0);
    }
}
