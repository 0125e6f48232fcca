//! Headless controller for polysynth.
//!
//! Owns an engine configuration and an event list, and renders them either
//! offline or live through the default audio device.

use poly_audio::{AudioOutput, CpalOutput};
use poly_engine::{Sequencer, Synth};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

// Re-export common types so callers don't need poly-engine/poly-formats directly.
pub use poly_engine::{Event, EventKind, SynthConfig, SynthError};
pub use poly_formats::{samples_to_wav, write_raw, FormatError, ScriptError};

/// Headless synthesizer controller.
pub struct Controller {
    config: SynthConfig,
    events: Vec<Event>,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    shared: PlaybackShared,
    thread: Option<JoinHandle<()>>,
}

/// State the audio thread reports back through.
#[derive(Clone, Default)]
struct PlaybackShared {
    stop_signal: Arc<AtomicBool>,
    samples_played: Arc<AtomicU64>,
    /// Device sample rate, 0 until the device is open.
    sample_rate: Arc<AtomicU32>,
    finished: Arc<AtomicBool>,
}

impl Controller {
    pub fn new(config: SynthConfig) -> Self {
        Self {
            config,
            events: Vec::new(),
            playback: None,
        }
    }

    // --- Event list ---

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn set_events(&mut self, events: Vec<Event>) {
        self.stop();
        self.events = events;
    }

    /// Replace the event list with a parsed command script.
    pub fn load_script<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<(), ScriptError> {
        let events = poly_formats::parse_script(tokens)?;
        tracing::debug!(events = events.len(), "loaded script");
        self.set_events(events);
        Ok(())
    }

    /// Replace the event list with a binary event file.
    pub fn load_binary(&mut self, data: &[u8]) -> Result<(), FormatError> {
        let events = poly_formats::load_events(data)?;
        self.set_events(events);
        Ok(())
    }

    // --- Real-time playback ---

    pub fn play(&mut self) {
        self.stop();

        let events = self.events.clone();
        let config = self.config;
        let shared = PlaybackShared::default();
        let thread_shared = shared.clone();

        let thread = std::thread::spawn(move || {
            audio_thread(config, events, thread_shared);
        });

        self.playback = Some(PlaybackHandle {
            shared,
            thread: Some(thread),
        });
    }

    pub fn stop(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            pb.shared.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = pb.thread.take() {
                let _ = handle.join();
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.shared.finished.load(Ordering::Relaxed))
    }

    /// Samples handed to the device so far, if playing.
    pub fn samples_played(&self) -> Option<u64> {
        self.playback
            .as_ref()
            .map(|p| p.shared.samples_played.load(Ordering::Relaxed))
    }

    /// Rate the audio device runs at, once playback has opened it.
    pub fn playback_sample_rate(&self) -> Option<u32> {
        self.playback
            .as_ref()
            .map(|p| p.shared.sample_rate.load(Ordering::Relaxed))
            .filter(|&rate| rate != 0)
    }

    // --- Offline rendering ---

    /// Render up to `max_samples` at the configured sample rate.
    ///
    /// Fails with the first event the engine rejects.
    pub fn render_samples(&self, max_samples: usize) -> Result<Vec<i16>, SynthError> {
        let mut synth = Synth::new(self.config);
        let mut sequencer = Sequencer::new(&self.events);

        let reserve = max_samples.min(self.config.sample_rate() as usize * 60);
        let mut samples = Vec::with_capacity(reserve);
        while samples.len() < max_samples {
            match sequencer.next_sample(&mut synth) {
                Some(sample) => samples.push(sample),
                None => break,
            }
        }

        match sequencer.error() {
            Some(err) => Err(err),
            None => Ok(samples),
        }
    }

    pub fn render_to_wav(&self, max_seconds: u32) -> Result<Vec<u8>, SynthError> {
        let sample_rate = self.config.sample_rate();
        let max_samples = sample_rate as usize * max_seconds as usize;
        let samples = self.render_samples(max_samples)?;
        Ok(samples_to_wav(&samples, sample_rate))
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(SynthConfig::default())
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Engine configuration for a device running at `sample_rate`.
///
/// Keeps the channel count and the frequency ceiling, lowered to the
/// device's Nyquist limit if needed.
fn device_config(config: SynthConfig, sample_rate: u32) -> SynthConfig {
    if sample_rate == config.sample_rate() {
        return config;
    }
    tracing::warn!(
        requested = config.sample_rate(),
        device = sample_rate,
        "device sample rate differs, segment lengths will scale"
    );
    match SynthConfig::new(sample_rate, config.channels()) {
        Ok(device) => {
            let ceiling = config.max_frequency().min(device.max_frequency());
            device.with_max_frequency(ceiling).unwrap_or(device)
        }
        Err(_) => config,
    }
}

/// Samples rendered per ring buffer write.
const CHUNK_SIZE: usize = 256;

/// How long the device may refuse samples before playback gives up.
const STALL_LIMIT: Duration = Duration::from_secs(2);

/// Hand `samples` to `output`, waiting for room as needed.
///
/// Returns `false` if `stop` was raised or the device accepted nothing for
/// `stall_limit`; the rest of `samples` is dropped.
fn write_all(
    output: &mut impl AudioOutput,
    mut samples: &[i16],
    stop: &AtomicBool,
    stall_limit: Duration,
) -> bool {
    let mut stalled_since: Option<Instant> = None;
    while !samples.is_empty() {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let accepted = output.write(samples);
        if accepted > 0 {
            samples = &samples[accepted..];
            stalled_since = None;
            continue;
        }

        let since = *stalled_since.get_or_insert_with(Instant::now);
        if since.elapsed() >= stall_limit {
            tracing::warn!(?stall_limit, "audio device stopped consuming samples");
            return false;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    true
}

fn audio_thread(config: SynthConfig, events: Vec<Event>, shared: PlaybackShared) {
    let (mut output, consumer) = match CpalOutput::new() {
        Ok(pair) => pair,
        Err(err) => {
            tracing::error!(%err, "audio output unavailable");
            shared.finished.store(true, Ordering::Relaxed);
            return;
        }
    };

    let sample_rate = output.sample_rate();
    shared.sample_rate.store(sample_rate, Ordering::Relaxed);
    let mut synth = Synth::new(device_config(config, sample_rate));
    let mut sequencer = Sequencer::new(&events);

    if let Err(err) = output.build_stream(consumer).and_then(|_| output.start()) {
        tracing::error!(%err, "failed to start audio stream");
        shared.finished.store(true, Ordering::Relaxed);
        return;
    }

    let stop = &shared.stop_signal;
    let mut chunk = [0i16; CHUNK_SIZE];
    let mut count: u64 = 0;

    loop {
        let rendered = sequencer.render(&mut synth, &mut chunk);
        if rendered == 0 || !write_all(&mut output, &chunk[..rendered], stop, STALL_LIMIT) {
            break;
        }
        count += rendered as u64;
        shared.samples_played.store(count, Ordering::Relaxed);
    }

    if let Some(err) = sequencer.error() {
        tracing::warn!(%err, "playback stopped early");
    }

    // Let the ring buffer drain before the stream is dropped.
    if !stop.load(Ordering::Relaxed) {
        let silence = [0i16; CHUNK_SIZE];
        for _ in 0..(sample_rate / 5) as usize / CHUNK_SIZE {
            if !write_all(&mut output, &silence, stop, STALL_LIMIT) {
                break;
            }
        }
    }
    let _ = output.stop();

    shared.finished.store(true, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use poly_audio::AudioError;

    /// Output that takes at most `per_write` samples per call until `capacity` is used up.
    struct MockOutput {
        accepted: Vec<i16>,
        per_write: usize,
        capacity: usize,
    }

    impl MockOutput {
        fn new(per_write: usize, capacity: usize) -> Self {
            Self {
                accepted: Vec::new(),
                per_write,
                capacity,
            }
        }
    }

    impl AudioOutput for MockOutput {
        fn sample_rate(&self) -> u32 {
            8000
        }

        fn write(&mut self, samples: &[i16]) -> usize {
            let room = self.capacity - self.accepted.len();
            let n = samples.len().min(self.per_write).min(room);
            self.accepted.extend_from_slice(&samples[..n]);
            n
        }

        fn start(&mut self) -> Result<(), AudioError> {
            Ok(())
        }

        fn stop(&mut self) -> Result<(), AudioError> {
            Ok(())
        }
    }

    fn controller() -> Controller {
        Controller::new(SynthConfig::new(8000, 2).unwrap())
    }

    #[test]
    fn empty_controller_renders_nothing() {
        let ctrl = controller();
        assert!(ctrl.render_samples(100).unwrap().is_empty());
        assert!(!ctrl.is_playing());
        assert_eq!(ctrl.samples_played(), None);
    }

    #[test]
    fn script_render_is_capped() {
        let mut ctrl = controller();
        ctrl.load_script(&["amp", "7", "en", "1", "time", "50"]).unwrap();
        assert_eq!(ctrl.events().len(), 3);

        let all = ctrl.render_samples(1000).unwrap();
        assert_eq!(all.len(), 50);
        assert!(all.iter().all(|&s| s == 7));

        assert_eq!(ctrl.render_samples(10).unwrap().len(), 10);
    }

    #[test]
    fn binary_load_round_trips_script() {
        let mut ctrl = controller();
        ctrl.load_script(&["voice", "1", "freq", "100", "amp", "200", "en", "2", "time", "80"])
            .unwrap();
        let bytes = poly_formats::save_events(ctrl.events()).unwrap();
        let expected = ctrl.render_samples(usize::MAX).unwrap();

        let mut other = controller();
        other.load_binary(&bytes).unwrap();
        assert_eq!(other.events(), ctrl.events());
        assert_eq!(other.render_samples(usize::MAX).unwrap(), expected);
    }

    #[test]
    fn rejected_event_fails_render() {
        let mut ctrl = controller();
        ctrl.load_script(&["voice", "5", "amp", "1", "time", "10"]).unwrap();
        assert_eq!(ctrl.render_samples(100), Err(SynthError::InvalidChannel(5)));
    }

    #[test]
    fn wav_export_length() {
        let mut ctrl = controller();
        ctrl.set_events(vec![Event::time(8000), Event::time(8000), Event::time(8000)]);
        // Capped at two seconds.
        let wav = ctrl.render_to_wav(2).unwrap();
        assert_eq!(wav.len(), 44 + 2 * 16_000);
    }

    #[test]
    fn bad_binary_leaves_events_untouched() {
        let mut ctrl = controller();
        ctrl.set_events(vec![Event::time(1)]);
        assert!(ctrl.load_binary(&[1, 2, 3]).is_err());
        assert_eq!(ctrl.events(), &[Event::time(1)]);
    }

    #[test]
    fn write_all_splits_across_partial_writes() {
        let mut output = MockOutput::new(3, usize::MAX);
        let samples: Vec<i16> = (0..10).collect();
        let stop = AtomicBool::new(false);
        assert!(write_all(&mut output, &samples, &stop, STALL_LIMIT));
        assert_eq!(output.accepted, samples);
    }

    #[test]
    fn write_all_honours_stop() {
        let mut output = MockOutput::new(4, 4);
        let stop = AtomicBool::new(true);
        assert!(!write_all(&mut output, &[1, 2, 3], &stop, STALL_LIMIT));
        assert!(output.accepted.is_empty());
    }

    #[test]
    fn write_all_gives_up_on_stalled_device() {
        let mut output = MockOutput::new(4, 6);
        let stop = AtomicBool::new(false);
        let samples = [5i16; 10];
        assert!(!write_all(&mut output, &samples, &stop, Duration::from_millis(20)));
        assert_eq!(output.accepted, [5; 6]);
    }

    #[test]
    fn device_config_keeps_frequency_ceiling() {
        let config = SynthConfig::new(32_000, 4)
            .unwrap()
            .with_max_frequency(1000)
            .unwrap();
        let device = device_config(config, 48_000);
        assert_eq!(device.sample_rate(), 48_000);
        assert_eq!(device.channels(), 4);
        assert_eq!(device.max_frequency(), 1000);

        assert_eq!(device_config(config, 32_000), config);
    }

    #[test]
    fn device_config_clamps_to_device_nyquist() {
        let device = device_config(SynthConfig::new(32_000, 2).unwrap(), 22_050);
        assert_eq!(device.max_frequency(), 11_025);
    }

    #[test]
    fn no_playback_rate_before_play() {
        assert_eq!(controller().playback_sample_rate(), None);
    }
}
