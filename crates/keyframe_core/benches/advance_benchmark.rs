//! # Advance Pass Benchmark
//!
//! Measures one advance batch over a populated state table.
//!
//! Compares:
//! 1. Sequential step over every record
//! 2. Rayon fan-out with several minimum batch lengths
//!
//! Target: 100K animators under 1ms on a desktop CPU.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keyframe_core::{
    advance_all, advance_all_sequential, AnimationDefinition, AnimationStyle, AnimatorHandle,
    AnimatorState, Outbound, StateTable, VisualId,
};

const ANIMATOR_COUNT: usize = 100_000;

/// Table where every third animator uses a different style.
fn populated_table(count: usize) -> StateTable {
    let defs = [
        AnimationStyle::Loop,
        AnimationStyle::YoYo,
        AnimationStyle::OneShot,
    ]
    .map(|style| {
        AnimationDefinition::builder(style)
            .frames((0..8).map(|i| (VisualId(i), 1.0 / 12.0)))
            .event("step_left", 0.2)
            .event("step_right", 0.5)
            .build()
    });

    let mut table = StateTable::with_capacity(count);
    for i in 0..count {
        let handle = AnimatorHandle::new(i as u32, 0);
        table.insert(handle, AnimatorState::registered(0, &defs[i % 3], (i % 8) as u16));
    }
    table
}

fn bench_sequential(c: &mut Criterion) {
    let mut table = populated_table(ANIMATOR_COUNT);
    let outbound = Outbound::new();
    let writer = outbound.writer();
    let mut now = 0.0;

    c.bench_function("advance_sequential_100K", |b| {
        b.iter(|| {
            now += 1.0 / 60.0;
            let stats = advance_all_sequential(table.as_mut_slice(), now, &writer);
            // Keep the queues from growing without bound.
            outbound.drain_frames().for_each(drop);
            outbound.drain_events().for_each(drop);
            black_box(stats)
        });
    });
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance_parallel_100K");

    for min_len in [64, 256, 1024, 4096] {
        let mut table = populated_table(ANIMATOR_COUNT);
        let outbound = Outbound::new();
        let writer = outbound.writer();
        let mut now = 0.0;

        group.bench_with_input(BenchmarkId::from_parameter(min_len), &min_len, |b, &min_len| {
            b.iter(|| {
                now += 1.0 / 60.0;
                let stats = advance_all(table.as_mut_slice(), now, &writer, min_len);
                outbound.drain_frames().for_each(drop);
                outbound.drain_events().for_each(drop);
                black_box(stats)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sequential, bench_parallel);
criterion_main!(benches);
