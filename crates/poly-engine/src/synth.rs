//! The synthesizer engine: event dispatch and sample production.

use arrayvec::ArrayVec;
use tracing::{debug, trace};

use crate::config::{SynthConfig, MAX_CHANNELS};
use crate::error::SynthError;
use crate::event::{Event, EventKind};
use crate::frequency::Frequency;
use crate::noise::Noise;
use crate::voice::{ModSource, Modulation, Voice, MAX_AMPLITUDE_SCALE};

/// A multi-voice fixed-point synthesizer.
///
/// Parameters change only through [`apply`](Self::apply), and only while the
/// engine is idle. A `Time` event starts a segment of that many samples;
/// [`next_sample`](Self::next_sample) produces them and goes silent when the
/// segment runs out.
#[derive(Clone, Debug)]
pub struct Synth {
    config: SynthConfig,
    voices: ArrayVec<Voice, MAX_CHANNELS>,
    /// Channels computed each tick.
    enabled: u16,
    /// Channels left out of the mix.
    muted: u16,
    /// Samples left in the current segment.
    remaining: u16,
    noise: Noise,
}

impl Synth {
    /// Create an idle engine with all voices cleared.
    pub fn new(config: SynthConfig) -> Self {
        Self {
            config,
            voices: (0..config.channels()).map(|_| Voice::default()).collect(),
            enabled: 0,
            muted: 0,
            remaining: 0,
            noise: Noise::new(),
        }
    }

    /// Return every register and voice to its power-on state.
    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            *voice = Voice::default();
        }
        self.enabled = 0;
        self.muted = 0;
        self.remaining = 0;
        self.noise.reset();
    }

    /// Apply one event.
    ///
    /// `Time` and `End` are always accepted. Everything else fails with
    /// [`SynthError::Busy`] while a segment is playing. A rejected event
    /// leaves the engine untouched.
    pub fn apply(&mut self, event: Event) -> Result<(), SynthError> {
        let kind = event.kind;
        if self.remaining > 0 && !kind.is_ungated() {
            trace!(?kind, remaining = self.remaining, "event rejected while busy");
            return Err(SynthError::Busy);
        }
        if kind.is_voice() {
            return self.apply_voice_event(event);
        }

        match kind {
            EventKind::Time => self.remaining = event.value,
            EventKind::End => {
                debug!("end event, resetting synth");
                self.reset();
            }
            EventKind::Enable => self.enabled = event.value,
            EventKind::Mute => self.muted = event.value,
            kind => return Err(SynthError::InvalidEvent(kind.code())),
        }
        Ok(())
    }

    /// Decode and apply a packed `flags`/`value` event.
    pub fn apply_packed(&mut self, flags: u16, value: u16) -> Result<(), SynthError> {
        let event = Event::from_packed(flags, value)?;
        self.apply(event)
    }

    fn apply_voice_event(&mut self, event: Event) -> Result<(), SynthError> {
        let channels = self.voices.len();
        let voice = self
            .voices
            .get_mut(event.channel as usize)
            .ok_or(SynthError::InvalidChannel(event.channel))?;
        let value = event.value;

        match event.kind {
            EventKind::SetFrequency => {
                voice.frequency = Frequency::from_register(value);
                voice.time = 0;
            }
            EventKind::FrequencyStep => voice.frequency_step = value as i16,
            EventKind::PhaseModSource => voice.phase_mod = mod_source(value, channels)?,
            EventKind::SetAmplitude => voice.amplitude = value as u8,
            EventKind::AmplitudeStep => voice.amplitude_step = value as u8 as i8,
            EventKind::AmplitudeModSource => voice.amplitude_mod = mod_source(value, channels)?,
            EventKind::AmplitudeScale => {
                if value > MAX_AMPLITUDE_SCALE as u16 {
                    return Err(SynthError::OutOfRange(value));
                }
                voice.amplitude_scale = value as u8;
            }
            EventKind::StepInterval => voice.step_interval = value,
            kind => return Err(SynthError::InvalidEvent(kind.code())),
        }
        Ok(())
    }

    /// Produce the next mixed sample.
    ///
    /// Returns silence without touching any voice while idle. Otherwise every
    /// enabled voice is advanced in channel order, every unmuted voice is
    /// summed, and the countdown drops by one. The sum saturates at the i16
    /// bounds.
    pub fn next_sample(&mut self) -> i16 {
        if self.remaining == 0 {
            return 0;
        }

        let mut mix: i32 = 0;
        for ch in 0..self.voices.len() {
            let bit = 1u16 << ch;
            if self.enabled & bit != 0 {
                let modulation = self.modulation_for(ch);
                self.voices[ch].compute(modulation, &mut self.noise, &self.config);
            }
            if self.muted & bit == 0 {
                mix += self.voices[ch].last_sample as i32;
            }
        }

        self.remaining -= 1;
        mix.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }

    /// Fill `out` with consecutive samples.
    pub fn render(&mut self, out: &mut [i16]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Read the modulation inputs for `ch` from the current voice outputs.
    ///
    /// Earlier channels have already been advanced this tick; later ones
    /// still hold the previous tick's sample.
    fn modulation_for(&self, ch: usize) -> Modulation {
        let voice = &self.voices[ch];
        let read = |source: ModSource| {
            source
                .channel()
                .and_then(|src| self.voices.get(src))
                .map(|v| v.last_sample)
        };
        Modulation {
            amplitude: read(voice.amplitude_mod),
            phase: read(voice.phase_mod),
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Is a timed segment playing?
    pub fn is_running(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining_samples(&self) -> u16 {
        self.remaining
    }

    pub fn enabled_mask(&self) -> u16 {
        self.enabled
    }

    pub fn muted_mask(&self) -> u16 {
        self.muted
    }

    pub fn voice(&self, channel: usize) -> Option<&Voice> {
        self.voices.get(channel)
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }
}

/// Decode a modulation register, rejecting sources beyond the channel count.
fn mod_source(value: u16, channels: usize) -> Result<ModSource, SynthError> {
    let source = ModSource::from_register(value);
    match source.channel() {
        Some(ch) if ch >= channels => Err(SynthError::OutOfRange(value)),
        _ => Ok(source),
    }
}
