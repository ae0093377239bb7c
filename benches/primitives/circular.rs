//! Benchmarks for the fixed-capacity ring and the cross-thread queue.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rtblock::buffer::queue::block_queue;
use rtblock::{CircularBuffer, Discard, Overwrite};

use crate::BLOCK_SIZES;

pub fn bench_circular(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives/circular");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| i as f32).collect();

        // Steady state: the ring is full, so every push evicts.
        let mut ring = CircularBuffer::<f32, 256, Overwrite>::filled(0.0);
        group.bench_with_input(BenchmarkId::new("overwrite_push", size), &size, |b, _| {
            b.iter(|| {
                for &value in &input {
                    ring.push(black_box(value));
                }
            })
        });

        let mut ring = CircularBuffer::<f32, 512, Discard>::new();
        group.bench_with_input(BenchmarkId::new("push_pop", size), &size, |b, _| {
            b.iter(|| {
                for &value in &input {
                    ring.push(black_box(value));
                }
                while let Some(value) = ring.pop() {
                    black_box(value);
                }
            })
        });

        let (mut tx, mut rx) = block_queue::<f32>(size);
        let mut out = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("queue_round_trip", size), &size, |b, _| {
            b.iter(|| {
                for &value in &input {
                    tx.push(black_box(value));
                }
                rx.pop_into(black_box(&mut out))
            })
        });
    }

    group.finish();
}
