// Moteur audio - Callback CPAL temps-réel
//
// # Format Support
//
// Le moteur détecte le format préféré du device via `sample_format()` et
// crée le stream correspondant (F32, I16 ou U16). En interne tout le rendu
// se fait en f32; la conversion vers le format du device passe par le trait
// `FromSample<f32>` de CPAL au moment de l'écriture dans le buffer.
//
// # Suspend semantics
//
// The CPAL stream keeps running for its whole lifetime. Suspending the
// backend freezes the shared sample clock and mutes the output instead of
// tearing the stream down, so the backend clock reports the same reading
// until the next resume.
//
// # Stream Limitations
//
// Sur macOS (CoreAudio) le Stream n'est pas Send/Sync. L'AudioEngine reste
// donc sur le thread qui l'a créé; le `SynthController` retourné par `new()`
// est la poignée déplaçable que le moteur de lecture consomme.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::audio::dsp::{flush_denormals_to_zero, soft_clip, write_mono_to_interleaved_frame};
use crate::audio::timing::AudioTiming;
use crate::messaging::channels::{CommandConsumer, CommandProducer, create_command_channel};
use crate::messaging::command::{SynthCommand, VoiceSpec};
use crate::playback::Note;
use crate::synth::gateway::{SynthError, SynthGateway};
use crate::synth::voice::ScheduledVoice;

/// Upper bound on simultaneously sounding voices
const MAX_VOICES: usize = 64;

/// Capacity of the control → callback command ring
const COMMAND_CHANNEL_CAPACITY: usize = 256;

/// Fixed output gain applied after voice summation
const MASTER_GAIN: f32 = 0.5;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Failed to read device configuration: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("Unsupported sample format: {0:?}. Supported formats: F32, I16, U16")]
    UnsupportedFormat(SampleFormat),

    #[error("Failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

pub struct AudioEngine {
    _device: Device,
    _stream: Stream,
    sample_rate: f32,
    dropped_voices: Arc<AtomicU64>,
}

impl AudioEngine {
    /// Open the default output device and return the engine together with
    /// the controller the playback side schedules through
    ///
    /// The engine owns the stream and must outlive the controller for sound
    /// to come out.
    pub fn new() -> Result<(Self, SynthController), AudioError> {
        let host = cpal::default_host();

        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        info!(
            "Audio device: {}",
            device.name().unwrap_or("Unknown".to_string())
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        debug!("Audio config: {:?}", supported_config);

        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        // Horloge partagée entre le callback et le contrôleur
        let timing = AudioTiming::new(sample_rate);

        let (command_tx, command_rx) = create_command_channel(COMMAND_CHANNEL_CAPACITY);
        let command_rx = Arc::new(Mutex::new(command_rx));

        // Pool de voix pré-alloué, partagé avec le callback
        let voices = Arc::new(Mutex::new(Vec::with_capacity(MAX_VOICES)));

        let dropped_voices = Arc::new(AtomicU64::new(0));
        let stream_healthy = Arc::new(AtomicBool::new(true));

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                channels,
                sample_rate,
                Arc::clone(&command_rx),
                Arc::clone(&voices),
                timing.clone(),
                Arc::clone(&dropped_voices),
                Arc::clone(&stream_healthy),
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                channels,
                sample_rate,
                Arc::clone(&command_rx),
                Arc::clone(&voices),
                timing.clone(),
                Arc::clone(&dropped_voices),
                Arc::clone(&stream_healthy),
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                channels,
                sample_rate,
                Arc::clone(&command_rx),
                Arc::clone(&voices),
                timing.clone(),
                Arc::clone(&dropped_voices),
                Arc::clone(&stream_healthy),
            ),
            other => return Err(AudioError::UnsupportedFormat(other)),
        }?;

        stream.play()?;

        info!("Audio engine started: {} Hz, {} canaux", sample_rate, channels);

        let controller = SynthController {
            command_tx,
            timing,
            stream_healthy,
            started: false,
        };

        let engine = Self {
            _device: device,
            _stream: stream,
            sample_rate,
            dropped_voices,
        };

        Ok((engine, controller))
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Voices refused because the pool was full
    pub fn dropped_voices(&self) -> u64 {
        self.dropped_voices.load(Ordering::Relaxed)
    }

    /// Build an audio stream with automatic format conversion
    ///
    /// Generic over the device sample type; the callback renders f32
    /// internally and converts on write.
    #[allow(clippy::too_many_arguments)]
    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        sample_rate: f32,
        command_rx: Arc<Mutex<CommandConsumer>>,
        voices: Arc<Mutex<Vec<ScheduledVoice>>>,
        timing: AudioTiming,
        dropped_voices: Arc<AtomicU64>,
        stream_healthy: Arc<AtomicBool>,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // ========== SACRED ZONE ==========
                // No allocations, No I/O, No blocking locks

                // Drain pending commands into the voice pool
                if let Ok(mut rx) = command_rx.try_lock() {
                    if let Ok(mut pool) = voices.try_lock() {
                        while let Some(cmd) = ringbuf::traits::Consumer::try_pop(&mut *rx) {
                            match cmd {
                                SynthCommand::Schedule(spec) => {
                                    if pool.len() < MAX_VOICES {
                                        pool.push(ScheduledVoice::new(spec, sample_rate));
                                    } else {
                                        dropped_voices.fetch_add(1, Ordering::Relaxed);
                                    }
                                }
                                SynthCommand::SilenceAll => {
                                    pool.clear();
                                }
                            }
                        }
                    }
                }

                if !timing.is_running() {
                    // Suspendu : silence, l'horloge reste figée
                    for sample in data.iter_mut() {
                        *sample = Sample::from_sample::<f32>(0.0);
                    }
                    return;
                }

                // Generate audio samples
                if let Ok(mut pool) = voices.try_lock() {
                    let seconds_per_sample = 1.0 / sample_rate as f64;
                    let mut now = timing.seconds();

                    for frame in data.chunks_mut(channels) {
                        let mut sample = 0.0f32;
                        for voice in pool.iter_mut() {
                            sample += voice.next_sample(now);
                        }

                        sample = flush_denormals_to_zero(sample * MASTER_GAIN);
                        sample = soft_clip(sample);
                        write_mono_to_interleaved_frame(sample, frame);

                        now += seconds_per_sample;
                    }

                    timing.advance(data.len() / channels);
                    pool.retain(|voice| !voice.is_finished());
                } else {
                    // Fallback: silence if we cannot acquire the lock
                    for sample in data.iter_mut() {
                        *sample = Sample::from_sample::<f32>(0.0);
                    }
                }
                // ========== SACRED ZONE END ==========
            },
            move |err| {
                // Runs outside the audio callback, I/O is fine here
                error!("Audio stream error: {}", err);
                stream_healthy.store(false, Ordering::Relaxed);
            },
            None,
        )?;

        Ok(stream)
    }
}

/// Movable scheduling handle over the running audio engine
///
/// Implements [`SynthGateway`] on top of the lock-free command channel and
/// the shared sample clock.
pub struct SynthController {
    command_tx: CommandProducer,
    timing: AudioTiming,
    stream_healthy: Arc<AtomicBool>,
    started: bool,
}

impl SynthController {
    #[cfg(test)]
    fn for_tests(
        command_tx: CommandProducer,
        timing: AudioTiming,
        stream_healthy: Arc<AtomicBool>,
    ) -> Self {
        Self {
            command_tx,
            timing,
            stream_healthy,
            started: false,
        }
    }

    fn ensure_healthy(&self, msg: &str) -> Result<(), String> {
        if self.stream_healthy.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(msg.to_string())
        }
    }
}

impl SynthGateway for SynthController {
    fn start(&mut self) -> Result<(), SynthError> {
        self.ensure_healthy("audio stream reported an error")
            .map_err(SynthError::StartFailed)?;

        self.timing.resume();
        if !self.started {
            self.started = true;
            info!("Audio backend running: {} Hz", self.timing.sample_rate());
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<(), SynthError> {
        self.ensure_healthy("audio stream reported an error")
            .map_err(SynthError::ResumeFailed)?;

        self.timing.resume();
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), SynthError> {
        self.ensure_healthy("audio stream reported an error")
            .map_err(SynthError::SuspendFailed)?;

        self.timing.suspend();
        Ok(())
    }

    fn current_time_seconds(&self) -> f64 {
        self.timing.seconds()
    }

    fn schedule_notes(&mut self, notes: &[Note], anchor: f64) {
        if !anchor.is_finite() {
            warn!(
                "Discarding batch of {} notes, anchor {} is unusable",
                notes.len(),
                anchor
            );
            return;
        }

        for note in notes {
            if !note.is_schedulable() {
                debug!("Skipping unplayable note {}", note.id);
                continue;
            }

            let start_seconds = anchor + note.time;
            let stop_seconds = start_seconds + note.duration;
            if !(stop_seconds > start_seconds) {
                debug!("Skipping note {} with an empty window", note.id);
                continue;
            }

            let spec = VoiceSpec {
                start_seconds,
                stop_seconds,
                frequency: note.frequency,
                gain: note.velocity_or_default(),
            };

            if ringbuf::traits::Producer::try_push(
                &mut self.command_tx,
                SynthCommand::Schedule(spec),
            )
            .is_err()
            {
                warn!("Command channel full, dropping note {}", note.id);
            }
        }
    }

    fn silence_all(&mut self) {
        if ringbuf::traits::Producer::try_push(&mut self.command_tx, SynthCommand::SilenceAll)
            .is_err()
        {
            warn!("Command channel full, silence request dropped");
        }
    }
}
