//! Construction-time synthesizer configuration.

use crate::error::ConfigError;
use crate::frequency::NOISE_REGISTER;

/// Upper bound on voice channels (one bit each in the enable/mute masks).
pub const MAX_CHANNELS: usize = 16;

/// Default sample rate of the reference hardware.
pub const DEFAULT_SAMPLE_RATE: u32 = 32_000;

/// Immutable engine constants: sample rate, ramp ceiling, channel count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SynthConfig {
    sample_rate: u32,
    max_frequency: u16,
    channels: usize,
}

impl SynthConfig {
    /// Create a configuration with the frequency ceiling at Nyquist.
    pub fn new(sample_rate: u32, channels: usize) -> Result<Self, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(ConfigError::ChannelCount(channels));
        }
        let nyquist = (sample_rate / 2).min((NOISE_REGISTER - 1) as u32) as u16;
        Ok(Self {
            sample_rate,
            max_frequency: nyquist,
            channels,
        })
    }

    /// Override the ceiling that frequency ramps clamp to.
    pub fn with_max_frequency(mut self, max_frequency: u16) -> Result<Self, ConfigError> {
        if max_frequency == NOISE_REGISTER {
            return Err(ConfigError::MaxFrequency(max_frequency));
        }
        self.max_frequency = max_frequency;
        Ok(self)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn max_frequency(&self) -> u16 {
        self.max_frequency
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

impl Default for SynthConfig {
    /// 32 kHz, 8 channels: the host test harness setup.
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_frequency: (DEFAULT_SAMPLE_RATE / 2) as u16,
            channels: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nyquist_is_default_ceiling() {
        let config = SynthConfig::new(32_000, 1).unwrap();
        assert_eq!(config.max_frequency(), 16_000);
    }

    #[test]
    fn ceiling_never_reaches_noise_register() {
        let config = SynthConfig::new(1_000_000, 1).unwrap();
        assert_eq!(config.max_frequency(), NOISE_REGISTER - 1);
    }

    #[test]
    fn zero_sample_rate_rejected() {
        assert_eq!(SynthConfig::new(0, 4), Err(ConfigError::ZeroSampleRate));
    }

    #[test]
    fn channel_count_bounds() {
        assert_eq!(SynthConfig::new(8000, 0), Err(ConfigError::ChannelCount(0)));
        assert_eq!(SynthConfig::new(8000, 17), Err(ConfigError::ChannelCount(17)));
        assert!(SynthConfig::new(8000, 16).is_ok());
    }

    #[test]
    fn max_frequency_override() {
        let config = SynthConfig::new(8000, 2).unwrap().with_max_frequency(1000).unwrap();
        assert_eq!(config.max_frequency(), 1000);
        assert_eq!(
            SynthConfig::new(8000, 2).unwrap().with_max_frequency(u16::MAX),
            Err(ConfigError::MaxFrequency(u16::MAX))
        );
    }

    #[test]
    fn default_matches_harness() {
        let config = SynthConfig::default();
        assert_eq!(config, SynthConfig::new(32_000, 8).unwrap());
    }
}
