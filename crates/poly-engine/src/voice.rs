//! Voice: one oscillator channel and its per-tick computation.

use crate::config::SynthConfig;
use crate::frequency::{phase_angle, wrap_angle, Frequency};
use crate::noise::Noise;
use crate::sine::sine;

/// Largest accepted attenuation shift.
pub const MAX_AMPLITUDE_SCALE: u8 = 31;

/// Where a voice takes its phase or amplitude modulation from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModSource {
    #[default]
    Disabled,
    /// Read the previous output of this channel.
    Channel(u8),
}

impl ModSource {
    /// Register value that disables modulation.
    pub const DISABLE_REGISTER: u16 = u16::MAX;

    /// Decode a raw modulation register; only the low nibble selects a channel.
    pub const fn from_register(value: u16) -> Self {
        if value == Self::DISABLE_REGISTER {
            ModSource::Disabled
        } else {
            ModSource::Channel((value & 0x0f) as u8)
        }
    }

    pub const fn register(self) -> u16 {
        match self {
            ModSource::Disabled => Self::DISABLE_REGISTER,
            ModSource::Channel(ch) => ch as u16,
        }
    }

    pub const fn channel(self) -> Option<usize> {
        match self {
            ModSource::Disabled => None,
            ModSource::Channel(ch) => Some(ch as usize),
        }
    }
}

/// Modulation inputs for one tick, read from other voices before computing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modulation {
    /// Added to the voice amplitude.
    pub amplitude: Option<i16>,
    /// Added to the phase angle (quarter degrees).
    pub phase: Option<i16>,
}

/// State of a single voice channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Voice {
    /// Last computed output; also what modulated voices read.
    pub(crate) last_sample: i16,
    /// Samples since the last frequency retrigger.
    pub(crate) time: u16,
    pub(crate) frequency: Frequency,
    /// Hz added to the frequency every `step_interval` samples.
    pub(crate) frequency_step: i16,
    /// Ramp period in samples (0 = no ramping).
    pub(crate) step_interval: u16,
    pub(crate) amplitude: u8,
    /// Added to the amplitude every `step_interval` samples until it saturates.
    pub(crate) amplitude_step: i8,
    /// Right shift applied to the scaled sample (0..=31).
    pub(crate) amplitude_scale: u8,
    pub(crate) phase_mod: ModSource,
    pub(crate) amplitude_mod: ModSource,
}

impl Voice {
    pub fn last_sample(&self) -> i16 {
        self.last_sample
    }

    pub fn time(&self) -> u16 {
        self.time
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn frequency_step(&self) -> i16 {
        self.frequency_step
    }

    pub fn step_interval(&self) -> u16 {
        self.step_interval
    }

    pub fn amplitude(&self) -> u8 {
        self.amplitude
    }

    pub fn amplitude_step(&self) -> i8 {
        self.amplitude_step
    }

    pub fn amplitude_scale(&self) -> u8 {
        self.amplitude_scale
    }

    pub fn phase_mod(&self) -> ModSource {
        self.phase_mod
    }

    pub fn amplitude_mod(&self) -> ModSource {
        self.amplitude_mod
    }

    /// Advance the voice by one sample tick.
    ///
    /// Produces the next sample into `last_sample`, applies any due ramp
    /// step and advances `time`.
    pub(crate) fn compute(
        &mut self,
        modulation: Modulation,
        noise: &mut Noise,
        config: &SynthConfig,
    ) {
        let mut amp = self.amplitude as i32;
        if let Some(offset) = modulation.amplitude {
            amp += offset as i32;
        }

        let sample = if amp == 0 {
            0
        } else {
            let raw = match self.frequency {
                Frequency::Dc => amp,
                Frequency::Noise => noise.next_bipolar() * amp,
                Frequency::Tone(hz) => {
                    let mut angle = phase_angle(hz, self.time, config.sample_rate());
                    if let Some(offset) = modulation.phase {
                        angle += offset as i64;
                    }
                    sine(wrap_angle(angle)) as i32 * amp
                }
            };
            raw >> self.amplitude_scale
        };

        self.ramp(config.max_frequency());

        self.last_sample = sample.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        self.time = self.time.wrapping_add(1);
    }

    /// Apply one frequency/amplitude ramp step if one is due at `time`.
    fn ramp(&mut self, max_frequency: u16) {
        if self.step_interval == 0 || self.time % self.step_interval != 0 {
            return;
        }

        if self.frequency_step != 0 {
            self.frequency = self.frequency.ramp(self.frequency_step, max_frequency);
        }

        if self.amplitude_step != 0 {
            let next = self.amplitude as i16 + self.amplitude_step as i16;
            match u8::try_from(next) {
                Ok(amplitude) => self.amplitude = amplitude,
                Err(_) => {
                    // Saturate and stop: the ramp is one-shot.
                    self.amplitude = if next < 0 { 0 } else { u8::MAX };
                    self.amplitude_step = 0;
                }
            }
        }
    }
}
