//! Event types and their packed wire encoding.
//!
//! On the wire an event is two `u16` words: `flags` carries the kind in bits
//! 15..12 and the channel in bits 11..8, `value` carries the new register
//! value.

use crate::error::SynthError;
use crate::voice::ModSource;

/// Bit position of the event kind within `flags`.
pub const KIND_SHIFT: u16 = 12;

/// Bit position of the channel number within `flags`.
pub const CHANNEL_SHIFT: u16 = 8;

/// Largest channel number the 4-bit channel field can carry.
pub const MAX_PACKED_CHANNEL: u8 = 0x0f;

/// What an event changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    /// Reset the whole synthesizer. Always accepted.
    End = 0x0,
    /// Play the current parameters for `value` samples. Always accepted.
    Time = 0x1,
    /// Replace the mask of computed channels.
    Enable = 0x2,
    /// Replace the mask of channels excluded from the mix.
    Mute = 0x3,
    /// Set frequency (0 = DC, 0xFFFF = noise) and retrigger.
    SetFrequency = 0x4,
    /// Set the per-step frequency delta (signed).
    FrequencyStep = 0x5,
    /// Set or disable (0xFFFF) the phase modulation source.
    PhaseModSource = 0x6,
    /// Set the amplitude (low 8 bits).
    SetAmplitude = 0x8,
    /// Set the per-step amplitude delta (low 8 bits, signed).
    AmplitudeStep = 0x9,
    /// Set or disable (0xFFFF) the amplitude modulation source.
    AmplitudeModSource = 0xa,
    /// Set the attenuation shift (0..=31).
    AmplitudeScale = 0xb,
    /// Set the ramp period in samples.
    StepInterval = 0xf,
}

impl EventKind {
    /// Decode a 4-bit kind code.
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x0 => EventKind::End,
            0x1 => EventKind::Time,
            0x2 => EventKind::Enable,
            0x3 => EventKind::Mute,
            0x4 => EventKind::SetFrequency,
            0x5 => EventKind::FrequencyStep,
            0x6 => EventKind::PhaseModSource,
            0x8 => EventKind::SetAmplitude,
            0x9 => EventKind::AmplitudeStep,
            0xa => EventKind::AmplitudeModSource,
            0xb => EventKind::AmplitudeScale,
            0xf => EventKind::StepInterval,
            _ => return None,
        })
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Kinds accepted while a timed segment is playing.
    pub const fn is_ungated(self) -> bool {
        matches!(self, EventKind::End | EventKind::Time)
    }

    /// Kinds that address a single voice through the channel field.
    pub const fn is_voice(self) -> bool {
        !matches!(
            self,
            EventKind::End | EventKind::Time | EventKind::Enable | EventKind::Mute
        )
    }
}

impl TryFrom<u8> for EventKind {
    type Error = SynthError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(SynthError::InvalidEvent(code))
    }
}

/// A register change for the synthesizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Event {
    pub kind: EventKind,
    /// Target voice; ignored by global kinds.
    pub channel: u8,
    pub value: u16,
}

impl Event {
    pub const fn new(kind: EventKind, channel: u8, value: u16) -> Self {
        Self { kind, channel, value }
    }

    pub const fn end() -> Self {
        Self::new(EventKind::End, 0, 0)
    }

    pub const fn time(samples: u16) -> Self {
        Self::new(EventKind::Time, 0, samples)
    }

    pub const fn enable(mask: u16) -> Self {
        Self::new(EventKind::Enable, 0, mask)
    }

    pub const fn mute(mask: u16) -> Self {
        Self::new(EventKind::Mute, 0, mask)
    }

    pub const fn set_frequency(channel: u8, hz: u16) -> Self {
        Self::new(EventKind::SetFrequency, channel, hz)
    }

    pub const fn frequency_step(channel: u8, step: i16) -> Self {
        Self::new(EventKind::FrequencyStep, channel, step as u16)
    }

    pub const fn phase_mod(channel: u8, source: ModSource) -> Self {
        Self::new(EventKind::PhaseModSource, channel, source.register())
    }

    pub const fn set_amplitude(channel: u8, amplitude: u8) -> Self {
        Self::new(EventKind::SetAmplitude, channel, amplitude as u16)
    }

    pub const fn amplitude_step(channel: u8, step: i8) -> Self {
        Self::new(EventKind::AmplitudeStep, channel, step as u8 as u16)
    }

    pub const fn amplitude_mod(channel: u8, source: ModSource) -> Self {
        Self::new(EventKind::AmplitudeModSource, channel, source.register())
    }

    pub const fn amplitude_scale(channel: u8, shift: u16) -> Self {
        Self::new(EventKind::AmplitudeScale, channel, shift)
    }

    pub const fn step_interval(channel: u8, samples: u16) -> Self {
        Self::new(EventKind::StepInterval, channel, samples)
    }

    /// Decode a packed `flags`/`value` pair.
    pub fn from_packed(flags: u16, value: u16) -> Result<Self, SynthError> {
        let kind = EventKind::try_from((flags >> KIND_SHIFT) as u8)?;
        let channel = ((flags >> CHANNEL_SHIFT) & 0x0f) as u8;
        Ok(Self::new(kind, channel, value))
    }

    /// Encode as a packed `(flags, value)` pair.
    ///
    /// Fails with [`SynthError::InvalidChannel`] when the channel does not
    /// fit in the 4-bit field.
    pub const fn to_packed(&self) -> Result<(u16, u16), SynthError> {
        if self.channel > MAX_PACKED_CHANNEL {
            return Err(SynthError::InvalidChannel(self.channel));
        }
        let kind = (self.kind.code() as u16) << KIND_SHIFT;
        let channel = (self.channel as u16) << CHANNEL_SHIFT;
        Ok((kind | channel, self.value))
    }
}
