use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pipeweld::prelude::*;

fn range_source(size: u64) -> Source<u64> {
    Source::new(move |out: Outbox<u64>| async move {
        for n in 0..size {
            if out.send(n).await.is_err() {
                break;
            }
        }
    })
}

fn doubler(capacity: usize) -> Transform<u64, u64> {
    Transform::with_config(
        |mut input: Inbox<u64>, out: Outbox<u64>| async move {
            while let Some(n) = input.recv().await {
                let _ = out.send(black_box(n * 2)).await;
            }
        },
        NodeConfig::new().buffer_capacity(capacity),
    )
}

fn summing_sink(capacity: usize, total: Arc<AtomicU64>) -> Sink<u64> {
    Sink::with_config(
        move |mut input: Inbox<u64>| async move {
            while let Some(n) = input.recv().await {
                total.fetch_add(n, Ordering::Relaxed);
            }
        },
        NodeConfig::new().buffer_capacity(capacity),
    )
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");
    let size = 10_000u64;
    group.throughput(Throughput::Elements(size));

    for capacity in [0usize, 1, 16, 256].iter() {
        group.bench_with_input(
            BenchmarkId::new("source_transform_sink", capacity),
            capacity,
            |b, &capacity| {
                b.iter(|| {
                    tokio::runtime::Runtime::new().unwrap().block_on(async {
                        let total = Arc::new(AtomicU64::new(0));
                        let source = range_source(size);
                        let double = doubler(capacity);
                        let sink = summing_sink(capacity, total.clone());

                        source.sends_to(&[&double]).unwrap();
                        double.sends_to(&[&sink]).unwrap();
                        source.start().unwrap();
                        sink.done().wait().await.unwrap();
                        black_box(total.load(Ordering::Relaxed));
                    })
                });
            },
        );
    }

    group.finish();
}

fn bench_fan_out_fan_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out_fan_in");
    let size = 1_000u64;

    for width in [1usize, 4, 16].iter() {
        group.throughput(Throughput::Elements(size * *width as u64));

        group.bench_with_input(BenchmarkId::new("diamond", width), width, |b, &width| {
            b.iter(|| {
                tokio::runtime::Runtime::new().unwrap().block_on(async {
                    let total = Arc::new(AtomicU64::new(0));
                    let source = range_source(size);
                    let branches: Vec<_> = (0..width).map(|_| doubler(16)).collect();
                    let sink = summing_sink(64, total.clone());

                    let receivers: Vec<&dyn Consumer<u64>> = branches
                        .iter()
                        .map(|branch| branch as &dyn Consumer<u64>)
                        .collect();
                    source.sends_to(&receivers).unwrap();
                    for branch in &branches {
                        branch.sends_to(&[&sink]).unwrap();
                    }
                    source.start().unwrap();
                    sink.done().wait().await.unwrap();
                    black_box(total.load(Ordering::Relaxed));
                })
            });
        });
    }

    group.finish();
}

fn bench_graph_construction(c: &mut Criterion) {
    c.bench_function("wire_and_start_100_stage_chain", |b| {
        b.iter(|| {
            tokio::runtime::Runtime::new().unwrap().block_on(async {
                let total = Arc::new(AtomicU64::new(0));
                let source = range_source(1);
                let stages: Vec<_> = (0..100).map(|_| doubler(0)).collect();
                let sink = summing_sink(0, total.clone());

                source.sends_to(&[&stages[0]]).unwrap();
                for pair in stages.windows(2) {
                    pair[0].sends_to(&[&pair[1]]).unwrap();
                }
                stages[99].sends_to(&[&sink]).unwrap();
                source.start().unwrap();
                sink.done().wait().await.unwrap();
                black_box(total.load(Ordering::Relaxed));
            })
        });
    });
}

criterion_group!(
    benches,
    bench_chain,
    bench_fan_out_fan_in,
    bench_graph_construction
);
criterion_main!(benches);
