//! # Tick Benchmark
//!
//! Full tick (advance + apply) at crowd scale, with a recording-free sink.
//!
//! Target: 50K animators under 2ms per tick.

#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keyframe::{
    AnimationDefinition, AnimationGateway, AnimationScheduler, AnimationStyle, NullSink,
    SchedulerConfig, VisualId,
};

fn clip(style: AnimationStyle) -> Arc<AnimationDefinition> {
    Arc::new(
        AnimationDefinition::builder(style)
            .frames((0..12).map(|i| (VisualId(i), 1.0 / 24.0)))
            .event("footstep", 0.1)
            .event("footstep", 0.3)
            .loop_start(2)
            .build(),
    )
}

fn populated(count: usize, config: SchedulerConfig) -> AnimationScheduler {
    let gateway = AnimationGateway::with_capacity(count);
    let mut scheduler = AnimationScheduler::new(config).expect("scheduler");
    gateway.attach(&scheduler).expect("attach");

    let clips = [
        clip(AnimationStyle::Loop),
        clip(AnimationStyle::YoYo),
        clip(AnimationStyle::OneShot),
    ];
    for i in 0..count {
        let handle = gateway.acquire_handle();
        gateway.register(handle, Some(&clips[i % 3])).expect("register");
    }
    scheduler.tick(0.0, &mut NullSink);
    scheduler.tick(0.0, &mut NullSink);
    scheduler
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for count in [1_000, 10_000, 50_000] {
        let mut parallel = populated(count, SchedulerConfig::default());
        let mut now = 0.0;
        group.bench_with_input(BenchmarkId::new("parallel", count), &count, |b, _| {
            b.iter(|| {
                now += 1.0 / 60.0;
                black_box(parallel.tick(now, &mut NullSink))
            });
        });

        let mut sequential = populated(count, SchedulerConfig::sequential());
        let mut now = 0.0;
        group.bench_with_input(BenchmarkId::new("sequential", count), &count, |b, _| {
            b.iter(|| {
                now += 1.0 / 60.0;
                black_box(sequential.tick(now, &mut NullSink))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
