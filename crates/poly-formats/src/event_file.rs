//! Binary event lists: headerless little-endian `{flags, value}` records.

use std::io::{Cursor, Seek, Write};

use binrw::{BinRead, BinWrite};
use poly_engine::Event;

use crate::FormatError;

/// Bytes per event record.
pub const RECORD_SIZE: usize = 4;

#[derive(BinRead, BinWrite, Clone, Copy, Debug, PartialEq, Eq)]
#[brw(little)]
struct PackedEvent {
    flags: u16,
    value: u16,
}

/// Decode an event list.
pub fn load_events(data: &[u8]) -> Result<Vec<Event>, FormatError> {
    let trailing = data.len() % RECORD_SIZE;
    if trailing != 0 {
        return Err(FormatError::TrailingBytes(trailing));
    }

    let count = data.len() / RECORD_SIZE;
    let mut cursor = Cursor::new(data);
    let mut events = Vec::with_capacity(count);
    for index in 0..count {
        let record = PackedEvent::read(&mut cursor)?;
        let event = Event::from_packed(record.flags, record.value)
            .map_err(|source| FormatError::Event { index, source })?;
        events.push(event);
    }
    tracing::debug!(count, "loaded event file");
    Ok(events)
}

/// Encode an event list to a writer.
///
/// Stops at the first event whose channel does not fit a record.
pub fn write_events<W: Write + Seek>(w: &mut W, events: &[Event]) -> Result<(), FormatError> {
    for (index, event) in events.iter().enumerate() {
        let (flags, value) = event
            .to_packed()
            .map_err(|source| FormatError::Event { index, source })?;
        PackedEvent { flags, value }.write(w)?;
    }
    Ok(())
}

/// Encode an event list to bytes.
pub fn save_events(events: &[Event]) -> Result<Vec<u8>, FormatError> {
    let mut cursor = Cursor::new(Vec::with_capacity(events.len() * RECORD_SIZE));
    write_events(&mut cursor, events)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use poly_engine::{EventKind, SynthError};

    #[test]
    fn reads_firmware_records() {
        // ENABLE 1, IFREQ 1000, TIME 64000
        let data = [0x00, 0x20, 0x01, 0x00, 0x00, 0x40, 0xe8, 0x03, 0x00, 0x10, 0x00, 0xfa];
        let events = load_events(&data).unwrap();
        assert_eq!(
            events,
            vec![Event::enable(1), Event::set_frequency(0, 1000), Event::time(64_000)]
        );
    }

    #[test]
    fn empty_file_is_empty_list() {
        assert!(load_events(&[]).unwrap().is_empty());
    }

    #[test]
    fn trailing_bytes_rejected() {
        let err = load_events(&[0, 0x20, 1, 0, 9]).unwrap_err();
        assert!(matches!(err, FormatError::TrailingBytes(1)));
    }

    #[test]
    fn unknown_kind_reports_record_index() {
        let data = [0x00, 0x20, 0x01, 0x00, 0x00, 0xc0, 0x00, 0x00];
        match load_events(&data).unwrap_err() {
            FormatError::Event { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source, SynthError::InvalidEvent(0xc));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn save_then_load_preserves_events() {
        let events = vec![
            Event::set_frequency(3, 440),
            Event::amplitude_step(3, -4),
            Event::new(EventKind::StepInterval, 15, 1000),
            Event::end(),
        ];
        let bytes = save_events(&events).unwrap();
        assert_eq!(bytes.len(), events.len() * RECORD_SIZE);
        assert_eq!(load_events(&bytes).unwrap(), events);
    }

    #[test]
    fn save_rejects_channel_outside_record() {
        let events = [Event::enable(1), Event::set_amplitude(17, 5)];
        match save_events(&events).unwrap_err() {
            FormatError::Event { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source, SynthError::InvalidChannel(17));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
