//! Benchmarks for processor chains.
//!
//! A stereo tone patch (sine → tanh shaper → gain) with parameters ramping,
//! plus a chain of pass-through dummies to isolate dispatch overhead.

use std::hint::black_box;

use criterion::measurement::WallTime;
use criterion::{BenchmarkGroup, BenchmarkId, Criterion};
use rtblock::{AudioModule, AudioProcessor, Dummy, Gain, Shaper, SineOscillator};

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");
    bench_at::<64>(&mut group);
    bench_at::<128>(&mut group);
    bench_at::<256>(&mut group);
    bench_at::<512>(&mut group);
    group.finish();
}

fn tone_patch<const LEN: usize>() -> AudioProcessor<f32, 2, LEN> {
    AudioProcessor::new(48_000.0)
        .with_module(
            AudioModule::new("osc", SineOscillator::new(110.0))
                .with_parameter(SineOscillator::frequency_parameter(110.0))
                .unwrap()
                .with_parameter(SineOscillator::amplitude_parameter(0.8))
                .unwrap(),
        )
        .unwrap()
        .with_module(
            AudioModule::new("drive", Shaper::tanh())
                .with_parameter(Shaper::drive_parameter(3.0))
                .unwrap(),
        )
        .unwrap()
        .with_module(
            AudioModule::new("out", Gain)
                .with_parameter(Gain::parameter(0.7))
                .unwrap(),
        )
        .unwrap()
}

fn bench_at<const LEN: usize>(group: &mut BenchmarkGroup<'_, WallTime>) {
    let mut patch = tone_patch::<LEN>();
    let controls = patch.control_surface();
    let mut flip = false;
    group.bench_with_input(BenchmarkId::new("tone_patch", LEN), &LEN, |b, _| {
        b.iter(|| {
            flip = !flip;
            controls.set("osc.frequency", if flip { 220.0 } else { 110.0 }).ok();
            patch.process();
            black_box(patch.buffer());
        })
    });

    let mut dummies = AudioProcessor::<f32, 2, LEN>::new(48_000.0);
    for i in 0..8 {
        dummies
            .add_module(AudioModule::new(format!("thru{i}"), Dummy::pass_through()))
            .unwrap();
    }
    group.bench_with_input(BenchmarkId::new("dummy_x8", LEN), &LEN, |b, _| {
        b.iter(|| {
            dummies.process();
            black_box(dummies.buffer());
        })
    });
}
