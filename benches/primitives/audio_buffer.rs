//! Benchmarks for multichannel block operations.

use std::hint::black_box;

use criterion::{BenchmarkGroup, BenchmarkId, Criterion};
use criterion::measurement::WallTime;
use rtblock::{AudioBuffer, RingAudioBuffer};

pub fn bench_audio_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives/audio_buffer");
    bench_at::<64>(&mut group);
    bench_at::<128>(&mut group);
    bench_at::<256>(&mut group);
    bench_at::<512>(&mut group);
    group.finish();
}

fn bench_at<const LEN: usize>(group: &mut BenchmarkGroup<'_, WallTime>) {
    let block: Vec<f32> = (0..LEN).map(|i| (i as f32 / LEN as f32) * 2.0 - 1.0).collect();

    let mut buffer = AudioBuffer::<f32, 2, LEN>::new();
    group.bench_with_input(BenchmarkId::new("write_block", LEN), &LEN, |b, _| {
        b.iter(|| {
            buffer.write_block(0, black_box(&block)).ok();
            buffer.write_block(1, black_box(&block)).ok();
        })
    });

    let mut other = AudioBuffer::<f32, 2, LEN>::new();
    other.write_block(0, &block).ok();
    other.write_block(1, &block).ok();
    group.bench_with_input(BenchmarkId::new("add", LEN), &LEN, |b, _| {
        b.iter(|| buffer.add(black_box(&other)))
    });

    group.bench_with_input(BenchmarkId::new("apply_gain", LEN), &LEN, |b, _| {
        b.iter(|| buffer.apply_gain(black_box(0.99)))
    });

    group.bench_with_input(BenchmarkId::new("non_finite_mask", LEN), &LEN, |b, _| {
        b.iter(|| black_box(buffer.non_finite_mask()))
    });

    let mut ring = RingAudioBuffer::<f32, 2, LEN>::new();
    group.bench_with_input(BenchmarkId::new("ring_write_block", LEN), &LEN, |b, _| {
        b.iter(|| {
            ring.write_block(0, black_box(&block)).ok();
            ring.write_block(1, black_box(&block)).ok();
        })
    });
}
