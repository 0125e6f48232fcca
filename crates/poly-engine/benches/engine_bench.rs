use criterion::{black_box, criterion_group, criterion_main, Criterion};
use poly_engine::{Event, ModSource, Synth, SynthConfig};

const SAMPLE_RATE: u32 = 32_000;

fn tone_synth(channels: u8) -> Synth {
    let mut synth = Synth::new(SynthConfig::new(SAMPLE_RATE, channels as usize).unwrap());
    for ch in 0..channels {
        let events = [
            Event::set_frequency(ch, 220 + ch as u16 * 110),
            Event::set_amplitude(ch, 200),
            Event::amplitude_scale(ch, 8),
        ];
        for event in events {
            synth.apply(event).unwrap();
        }
    }
    synth.apply(Event::enable((1u32 << channels).wrapping_sub(1) as u16)).unwrap();
    synth
}

fn bench_render(c: &mut Criterion) {
    let mut buf = vec![0i16; SAMPLE_RATE as usize];

    for channels in [1u8, 8, 16] {
        c.bench_function(&format!("render_1s_{}ch", channels), |b| {
            b.iter(|| {
                let mut synth = tone_synth(channels);
                synth.apply(Event::time(u16::MAX)).unwrap();
                synth.render(black_box(&mut buf));
            })
        });
    }

    c.bench_function("render_1s_modulated", |b| {
        b.iter(|| {
            let mut synth = tone_synth(4);
            synth.apply(Event::phase_mod(0, ModSource::Channel(1))).unwrap();
            synth.apply(Event::amplitude_mod(2, ModSource::Channel(3))).unwrap();
            synth.apply(Event::set_frequency(3, u16::MAX)).unwrap();
            synth.apply(Event::time(u16::MAX)).unwrap();
            synth.render(black_box(&mut buf));
        })
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
