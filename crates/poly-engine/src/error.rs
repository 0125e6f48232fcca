//! Error types returned by the synthesizer.

use thiserror::Error;

/// Reasons an event can be rejected by [`Synth::apply`](crate::Synth::apply).
///
/// All of these are recoverable; the engine state is untouched when one is
/// returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SynthError {
    /// The event kind code is not part of the protocol.
    #[error("unrecognized event kind {0:#x}")]
    InvalidEvent(u8),
    /// The event value is outside the range its register accepts.
    #[error("value {0} out of range")]
    OutOfRange(u16),
    /// Voice parameters are frozen while a timed segment plays out.
    #[error("busy: samples remaining in current segment")]
    Busy,
    /// The event addresses a channel beyond the configured channel count.
    #[error("channel {0} is not configured")]
    InvalidChannel(u8),
}

/// Reasons a [`SynthConfig`](crate::SynthConfig) can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("sample rate must be nonzero")]
    ZeroSampleRate,
    #[error("channel count {0} outside 1..=16")]
    ChannelCount(usize),
    #[error("maximum frequency {0} collides with the noise register value")]
    MaxFrequency(u16),
}
