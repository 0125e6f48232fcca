//! Fixed-point multi-voice tone/noise synthesizer.
//!
//! Consumes register-level events and produces one mixed `i16` sample per
//! tick. Sized for microcontrollers: no heap, no floating point, bounded
//! time per call.

#![cfg_attr(not(feature = "std"), no_std)]

mod config;
mod error;
mod event;
mod fifo;
mod frequency;
mod noise;
mod sequencer;
pub mod sine;
mod synth;
mod voice;

pub use config::{SynthConfig, DEFAULT_SAMPLE_RATE, MAX_CHANNELS};
pub use error::{ConfigError, SynthError};
pub use event::{Event, EventKind, CHANNEL_SHIFT, KIND_SHIFT, MAX_PACKED_CHANNEL};
pub use fifo::{pwm_duty, FifoReader, FifoWriter, SampleFifo, PWM_IDLE, PWM_SHIFT};
pub use frequency::{Frequency, NOISE_REGISTER};
pub use sequencer::Sequencer;
pub use synth::Synth;
pub use voice::{ModSource, Voice, MAX_AMPLITUDE_SCALE};
