//! Cursor-driven playback of an event list.

use crate::error::SynthError;
use crate::event::{Event, EventKind};
use crate::synth::Synth;

/// Feeds a borrowed event list to a [`Synth`] and pulls samples from it.
///
/// Whenever the engine is idle the next events are applied until one of them
/// (a `Time`) starts a segment. The cursor only moves forward, so the
/// playback path never allocates.
#[derive(Clone, Debug)]
pub struct Sequencer<'a> {
    events: &'a [Event],
    cursor: usize,
    finished: bool,
    error: Option<SynthError>,
}

impl<'a> Sequencer<'a> {
    pub fn new(events: &'a [Event]) -> Self {
        Self {
            events,
            cursor: 0,
            finished: false,
            error: None,
        }
    }

    /// Next output sample, or `None` once the sequence is over.
    ///
    /// The sequence ends at an `End` event (which also resets the engine),
    /// when the events run out with the engine idle, or at the first
    /// rejected event.
    pub fn next_sample(&mut self, synth: &mut Synth) -> Option<i16> {
        while !synth.is_running() {
            if self.finished {
                return None;
            }
            let Some(&event) = self.events.get(self.cursor) else {
                self.finished = true;
                return None;
            };
            self.cursor += 1;

            if let Err(err) = synth.apply(event) {
                tracing::warn!(position = self.cursor - 1, ?event, %err, "sequence stopped");
                self.error = Some(err);
                self.finished = true;
                return None;
            }
            if event.kind == EventKind::End {
                self.finished = true;
                return None;
            }
        }
        Some(synth.next_sample())
    }

    /// Fill `out` until it is full or the sequence ends; returns samples written.
    pub fn render(&mut self, synth: &mut Synth, out: &mut [i16]) -> usize {
        for (written, slot) in out.iter_mut().enumerate() {
            match self.next_sample(synth) {
                Some(sample) => *slot = sample,
                None => return written,
            }
        }
        out.len()
    }

    /// Start again from the first event.
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.finished = false;
        self.error = None;
    }

    /// Index of the next event to apply.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The event rejection that stopped the sequence, if any.
    pub fn error(&self) -> Option<SynthError> {
        self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SynthConfig;

    fn synth() -> Synth {
        Synth::new(SynthConfig::new(8000, 2).unwrap())
    }

    fn drain(seq: &mut Sequencer, synth: &mut Synth) -> Vec<i16> {
        let mut out = Vec::new();
        while let Some(s) = seq.next_sample(synth) {
            out.push(s);
        }
        out
    }

    #[test]
    fn plays_segments_in_order() {
        let events = [
            Event::set_amplitude(0, 5),
            Event::enable(1),
            Event::time(2),
            Event::set_amplitude(0, 9),
            Event::time(3),
        ];
        let mut synth = synth();
        let mut seq = Sequencer::new(&events);
        assert_eq!(drain(&mut seq, &mut synth), [5, 5, 9, 9, 9]);
        assert!(seq.is_finished());
        assert_eq!(seq.error(), None);
    }

    #[test]
    fn end_resets_and_finishes() {
        let events = [
            Event::set_amplitude(0, 5),
            Event::enable(1),
            Event::time(1),
            Event::end(),
            Event::set_amplitude(0, 7),
            Event::time(10),
        ];
        let mut synth = synth();
        let mut seq = Sequencer::new(&events);
        assert_eq!(drain(&mut seq, &mut synth), [5]);
        assert_eq!(seq.position(), 4);
        assert_eq!(synth.enabled_mask(), 0);
        assert_eq!(seq.next_sample(&mut synth), None);
    }

    #[test]
    fn rejected_event_stops_sequence() {
        let events = [Event::amplitude_scale(0, 40), Event::time(5)];
        let mut synth = synth();
        let mut seq = Sequencer::new(&events);
        assert_eq!(seq.next_sample(&mut synth), None);
        assert_eq!(seq.error(), Some(SynthError::OutOfRange(40)));
        assert_eq!(seq.position(), 1);
        assert!(!synth.is_running());
    }

    #[test]
    fn trailing_time_plays_out() {
        let events = [Event::time(4)];
        let mut synth = synth();
        let mut seq = Sequencer::new(&events);
        assert_eq!(drain(&mut seq, &mut synth).len(), 4);
    }

    #[test]
    fn render_reports_partial_fill() {
        let events = [Event::set_amplitude(1, 3), Event::enable(2), Event::time(3)];
        let mut synth = synth();
        let mut seq = Sequencer::new(&events);
        let mut out = [0i16; 8];
        assert_eq!(seq.render(&mut synth, &mut out), 3);
        assert_eq!(&out[..3], &[3, 3, 3]);
    }

    #[test]
    fn rewind_replays() {
        let events = [Event::set_amplitude(0, 2), Event::enable(1), Event::time(2), Event::end()];
        let mut synth = synth();
        let mut seq = Sequencer::new(&events);
        let first = drain(&mut seq, &mut synth);
        seq.rewind();
        assert_eq!(drain(&mut seq, &mut synth), first);
    }
}
