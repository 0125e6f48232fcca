//! Voice frequency register and phase arithmetic.
//!
//! The register is a raw `u16` on the wire: 0 selects DC output, `u16::MAX`
//! selects noise, anything in between is a tone in Hz.

use crate::sine::FULL_CIRCLE;

/// Register value that selects noise mode.
pub const NOISE_REGISTER: u16 = u16::MAX;

/// What a voice's oscillator produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Frequency {
    /// No oscillation; the voice emits its amplitude as a constant level.
    #[default]
    Dc,
    /// Sine tone in Hz (1..=65534).
    Tone(u16),
    /// Pseudo-random samples.
    Noise,
}

impl Frequency {
    /// Decode a raw frequency register value.
    pub const fn from_register(value: u16) -> Self {
        match value {
            0 => Frequency::Dc,
            NOISE_REGISTER => Frequency::Noise,
            hz => Frequency::Tone(hz),
        }
    }

    /// Encode back to the raw register value.
    pub const fn register(self) -> u16 {
        match self {
            Frequency::Dc => 0,
            Frequency::Tone(hz) => hz,
            Frequency::Noise => NOISE_REGISTER,
        }
    }

    /// Step the register by `step` Hz, clamped to `0..=max`.
    ///
    /// The step works on the raw register, so a noise voice ramping down
    /// lands on `max` and becomes a tone.
    pub fn ramp(self, step: i16, max: u16) -> Self {
        let next = self.register() as i32 + step as i32;
        Self::from_register(next.clamp(0, max as i32) as u16)
    }
}

/// Phase angle in quarter degrees after `time` samples of a `hz` tone.
///
/// Computed as `1440 * hz * time / sample_rate` without reduction so the
/// caller can add phase modulation before wrapping.
pub fn phase_angle(hz: u16, time: u16, sample_rate: u32) -> i64 {
    if sample_rate == 0 {
        return 0;
    }
    (FULL_CIRCLE as i64 * hz as i64 * time as i64) / sample_rate as i64
}

/// Wrap a (possibly negative) angle into `0..FULL_CIRCLE`.
pub fn wrap_angle(angle: i64) -> u32 {
    angle.rem_euclid(FULL_CIRCLE as i64) as u32
}
