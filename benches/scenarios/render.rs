//! Benchmarks for interleaved device rendering.
//!
//! Callback sizes deliberately do not match the block size, so the frame
//! cursor crosses block boundaries inside a callback.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rtblock::{AudioContext, AudioModule, AudioProcessor, Gain, SineOscillator};

const CALLBACK_FRAMES: &[usize] = &[441, 512, 1024];

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");

    for &frames in CALLBACK_FRAMES {
        let processor = AudioProcessor::<f32, 2, 256>::new(44_100.0)
            .with_module(AudioModule::new("osc", SineOscillator::new(440.0)))
            .unwrap()
            .with_module(
                AudioModule::new("out", Gain)
                    .with_parameter(Gain::parameter(0.5))
                    .unwrap(),
            )
            .unwrap();
        let mut context = AudioContext::new(processor).with_volume(0.8);

        let mut float_out = vec![0.0f32; frames * 2];
        group.bench_with_input(BenchmarkId::new("f32", frames), &frames, |b, _| {
            b.iter(|| context.render_interleaved(None, black_box(&mut float_out)))
        });

        let mut int_out = vec![0i16; frames * 2];
        group.bench_with_input(BenchmarkId::new("i16", frames), &frames, |b, _| {
            b.iter(|| context.render_interleaved_i16(black_box(&mut int_out)))
        });
    }

    group.finish();
}
