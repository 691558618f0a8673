use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use futures::future::try_join_all;
use gapless::{
    Backoff, DocumentSequencer, ImmediateSleep, MemoryStore, OrgTag, Result, SequencerConfig,
    SystemClock, TokioYield,
};
use std::{sync::Arc, time::Instant};
use tokio::runtime::Builder;

// Number of identifiers issued per benchmark iteration.
const TOTAL_IDS: usize = 4096;

fn contended_config() -> SequencerConfig {
    SequencerConfig::default()
        .with_max_attempts(10_000)
        .with_backoff(Backoff::none())
}

/// Formatting and validating identifiers, no store involved.
fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    let tag = OrgTag::SOSEXPAT;
    let epoch = gapless::EpochKey::new(2026).unwrap();
    let ids: Vec<String> = (1..=TOTAL_IDS as u32)
        .map(|n| tag.document_id(epoch, n).unwrap().to_string())
        .collect();

    group.bench_function(format!("to_string/{}", TOTAL_IDS), |b| {
        b.iter(|| {
            for n in 1..=TOTAL_IDS as u32 {
                black_box(tag.document_id(epoch, n).unwrap().to_string());
            }
        });
    });

    group.bench_function(format!("is_valid_format/{}", TOTAL_IDS), |b| {
        b.iter(|| {
            for id in &ids {
                black_box(gapless::is_valid_format(black_box(id)));
            }
        });
    });

    group.finish();
}

/// One task issuing identifiers back to back on one Tokio worker.
fn bench_sequential_tokio(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential/async/tokio/memory");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        let rt = Builder::new_multi_thread()
            .enable_all()
            .worker_threads(1)
            .build()
            .unwrap();

        b.to_async(&rt).iter_custom(|iters| async move {
            let start = Instant::now();

            for _ in 0..iters {
                let sequencer = DocumentSequencer::new(
                    MemoryStore::new(),
                    SystemClock,
                    ImmediateSleep,
                    SequencerConfig::default(),
                )
                .unwrap();
                for _ in 0..TOTAL_IDS {
                    let id = sequencer.next_identifier().await.unwrap();
                    black_box(id);
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Many tasks racing on one shared counter; losers retry after a yield.
fn bench_contended_tokio(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended/async/tokio/memory");
    group.sample_size(10);
    group.sampling_mode(criterion::SamplingMode::Flat);

    for num_tasks in [1, 2, 4, 8, 16, 32, 64] {
        let ids_per_task = TOTAL_IDS / num_tasks;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{}/tasks/{}", TOTAL_IDS, num_tasks), |b| {
            let rt = Builder::new_multi_thread().enable_all().build().unwrap();

            b.to_async(&rt).iter_custom(move |iters| async move {
                let start = Instant::now();

                for _ in 0..iters {
                    let sequencer = Arc::new(
                        DocumentSequencer::new(
                            MemoryStore::new(),
                            SystemClock,
                            TokioYield,
                            contended_config(),
                        )
                        .unwrap(),
                    );

                    let mut tasks: Vec<tokio::task::JoinHandle<Result<()>>> =
                        Vec::with_capacity(num_tasks);
                    for _ in 0..num_tasks {
                        let sequencer = Arc::clone(&sequencer);
                        tasks.push(tokio::spawn(async move {
                            for _ in 0..ids_per_task {
                                let id = sequencer.next_identifier().await?;
                                black_box(id);
                            }
                            Ok(())
                        }));
                    }

                    for result in try_join_all(tasks).await.unwrap() {
                        result.unwrap();
                    }
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_format,
    bench_sequential_tokio,
    bench_contended_tokio,
);
criterion_main!(benches);
