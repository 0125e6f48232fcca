//! File formats for polysynth.
//!
//! Binary event lists in the firmware's packed layout, the text command
//! script used by the host harness, and PCM output (WAV and raw).

mod event_file;
mod script;
mod wav_format;

pub use event_file::{load_events, save_events, write_events, RECORD_SIZE};
pub use script::{parse_script, parse_script_str, ScriptError};
pub use wav_format::{samples_to_wav, write_raw, write_wav, RAW_GAIN_SHIFT};

use poly_engine::SynthError;
use thiserror::Error;

/// Error type for reading and writing event files.
#[derive(Debug, Error)]
pub enum FormatError {
    /// File length is not a whole number of records.
    #[error("event file has {0} trailing bytes")]
    TrailingBytes(usize),
    /// A record does not decode to a known event, or an event does not fit a record.
    #[error("record {index}: {source}")]
    Event {
        index: usize,
        #[source]
        source: SynthError,
    },
    /// Low-level read/write failure.
    #[error(transparent)]
    Binary(#[from] binrw::Error),
}
