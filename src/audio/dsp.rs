// Hygiène du callback - anti-dénormaux, saturation douce, écriture de trame
//
// All helpers here are allocation-free and safe to call from the real-time
// audio callback.

use cpal::{FromSample, Sample};

/// Flush denormals to zero
///
/// Les nombres dénormaux (très proches de 0) peuvent causer des ralentissements
/// CPU importants sur certains processeurs. Cette fonction force les très
/// petites valeurs à zéro.
///
/// Seuil: 1e-15 (largement sous le bruit numérique à 32-bit float)
#[inline]
pub fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < 1e-15 { 0.0 } else { x }
}

/// Soft clipping avec tanh (saturation douce)
///
/// Limite doucement la sortie audio dans [-1, 1] sans créer de distorsion
/// dure. Utile quand plusieurs voix se superposent au même instant.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// Write one mono f32 sample to every channel of an interleaved output frame
///
/// The sample type conversion goes through CPAL's `FromSample`, so the same
/// callback body serves f32, i16 and u16 devices.
#[inline]
pub fn write_mono_to_interleaved_frame<T>(internal_sample: f32, output_frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    for channel_sample in output_frame.iter_mut() {
        *channel_sample = Sample::from_sample::<f32>(internal_sample);
    }
}
