//! Throughput benchmarks for datapipe pipelines.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use datapipe::pipeline::{Pipeline, PipelineBuilder, PipelineConfig};
use datapipe::stage::Stage;
use datapipe::stages::{Filter, ListSource};
use datapipe::tape::Tape;
use std::hint::black_box;

fn evens(count: u64, config: PipelineConfig) -> Pipeline<u64> {
    PipelineBuilder::read_list((0..count).collect())
        .filter(|x| x % 2 == 0)
        .with_config(config)
        .build()
}

fn bench_raw_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("raw_filter");

    for count in [1_000_u64, 100_000].iter() {
        group.throughput(Throughput::Elements(*count));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let items: Vec<u64> = (0..count).collect();
            let mut stage = Filter::new(ListSource::new(items), |x: &u64| Ok(x % 2 == 0));
            b.iter(|| {
                stage.reset();
                while let Ok(Some(item)) = stage.next() {
                    black_box(item);
                }
            });
        });
    }

    group.finish();
}

fn bench_pipeline_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_filter");

    for (label, config) in [
        ("bare", PipelineConfig::bare()),
        ("default", PipelineConfig::default()),
    ] {
        let count = 100_000_u64;
        group.throughput(Throughput::Elements(count));
        group.bench_function(label, |b| {
            let mut pipeline = evens(count, config.clone());
            b.iter(|| {
                pipeline.reset();
                while let Ok(Some(item)) = pipeline.next() {
                    black_box(item);
                }
            });
        });
    }

    group.finish();
}

fn bench_composed_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("composed_chain");

    for batch_size in [8_usize, 64, 512].iter() {
        group.throughput(Throughput::Elements(100_000));
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            batch_size,
            |b, &batch_size| {
                b.iter(|| {
                    let mut pipeline = PipelineBuilder::count(0, 1)
                        .filter(|x| x % 3 != 0)
                        .map(|x| x.wrapping_mul(31))
                        .take(100_000)
                        .batch(batch_size, false)
                        .expect("batch size is non-zero")
                        .with_config(PipelineConfig::bare())
                        .build();
                    while let Ok(Some(batch)) = pipeline.next() {
                        black_box(batch);
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_checkpoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("checkpoint");
    group.throughput(Throughput::Elements(1));

    let mut pipeline = evens(1_000, PipelineConfig::default());
    for _ in 0..100 {
        let _ = pipeline.next();
    }

    group.bench_function("record", |b| {
        b.iter(|| black_box(pipeline.checkpoint()));
    });

    let tape = pipeline.checkpoint();
    group.bench_function("encode", |b| {
        b.iter(|| black_box(tape.to_bytes()));
    });

    let bytes = tape.to_bytes().expect("tape encodes");
    group.bench_function("decode", |b| {
        b.iter(|| black_box(Tape::from_bytes(&bytes)));
    });

    let mut resumed = evens(1_000, PipelineConfig::default());
    group.bench_function("restore", |b| {
        b.iter(|| resumed.restore(&tape));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_raw_filter,
    bench_pipeline_filter,
    bench_composed_chain,
    bench_checkpoint,
);
criterion_main!(benches);
