//! Benchmarks for smoothed parameter reads on the audio thread.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rtblock::{AudioParameter, ParamSpec, Smoothing};

use crate::BLOCK_SIZES;

pub fn bench_param(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives/param");

    for &size in BLOCK_SIZES {
        for smoothing in [Smoothing::Linear, Smoothing::Exponential] {
            let spec = ParamSpec::<f32>::new("cutoff", 20.0, 20_000.0, 1_000.0)
                .smoothing_ms(50.0)
                .smoothing(smoothing);
            let mut param = AudioParameter::new(&spec);
            let handle = param.handle();
            let mut flip = false;

            let id = format!("{smoothing:?}").to_lowercase();
            group.bench_with_input(BenchmarkId::new(id, size), &size, |b, &size| {
                b.iter(|| {
                    // keep the ramp moving so every block interpolates
                    flip = !flip;
                    handle.set(if flip { 18_000.0 } else { 200.0 });
                    param.advance(size);
                    let mut sum = 0.0;
                    for i in 1..=size {
                        sum += param.interpolated_at(i);
                    }
                    black_box(sum)
                })
            });
        }
    }

    group.finish();
}
