//! Benchmarks for table evaluation against direct computation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rtblock::dsp::distortion::tanh_table;
use rtblock::LookupTable;

use crate::BLOCK_SIZES;

pub fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives/lookup");
    let sine = LookupTable::sine();
    let tanh = tanh_table();

    for &size in BLOCK_SIZES {
        let phases: Vec<f32> = (0..size)
            .map(|i| i as f32 / size as f32 * std::f32::consts::TAU)
            .collect();
        let drives: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 8.0 - 4.0)
            .collect();

        group.bench_with_input(BenchmarkId::new("sine_table", size), &size, |b, _| {
            b.iter(|| phases.iter().map(|&x| sine.eval(black_box(x))).sum::<f32>())
        });

        group.bench_with_input(BenchmarkId::new("sine_direct", size), &size, |b, _| {
            b.iter(|| phases.iter().map(|&x| black_box(x).sin()).sum::<f32>())
        });

        group.bench_with_input(BenchmarkId::new("tanh_table", size), &size, |b, _| {
            b.iter(|| drives.iter().map(|&x| tanh.eval(black_box(x))).sum::<f32>())
        });
    }

    group.finish();
}
