use batchpool::{CancellationToken, WorkerPool};
use core::{hint::black_box, time::Duration};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::time::Instant;
use tokio::runtime::Builder;

// Number of inputs per run.
const TOTAL_INPUTS: usize = 4096;

/// Benchmarks runs whose work completes immediately, which isolates the cost of
/// dispatching, collecting and reordering.
fn bench_pool_ready(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool/ready");
    group.throughput(Throughput::Elements(TOTAL_INPUTS as u64));

    for workers in worker_counts() {
        group.bench_function(
            format!("elems/{}/workers/{}", TOTAL_INPUTS, workers),
            |b| {
                let rt = Builder::new_multi_thread().enable_all().build().unwrap();
                let pool = WorkerPool::new(workers, |_: CancellationToken, n: u64| async move {
                    Ok::<_, ()>(black_box(n.wrapping_mul(31)))
                });

                b.to_async(&rt).iter_custom(|iters| {
                    let pool = pool.clone();
                    async move {
                        let start = Instant::now();
                        for _ in 0..iters {
                            let outputs = pool.run((0..TOTAL_INPUTS as u64).collect()).await;
                            black_box(outputs.unwrap());
                        }
                        start.elapsed()
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmarks runs whose work yields to the scheduler, the shape of work that
/// waits on I/O.
fn bench_pool_yielding(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool/yielding");
    group.sample_size(10);
    group.sampling_mode(criterion::SamplingMode::Flat);
    group.throughput(Throughput::Elements(TOTAL_INPUTS as u64));

    for workers in worker_counts() {
        group.bench_function(
            format!("elems/{}/workers/{}", TOTAL_INPUTS, workers),
            |b| {
                let rt = Builder::new_multi_thread().enable_all().build().unwrap();
                let pool = WorkerPool::new(workers, |_: CancellationToken, n: u64| async move {
                    tokio::task::yield_now().await;
                    Ok::<_, ()>(n)
                });

                b.to_async(&rt).iter_custom(|iters| {
                    let pool = pool.clone();
                    async move {
                        let start = Instant::now();
                        for _ in 0..iters {
                            let outputs = pool.run((0..TOTAL_INPUTS as u64).collect()).await;
                            black_box(outputs.unwrap());
                        }
                        start.elapsed()
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmarks how quickly a run tears down when an early input fails while the
/// rest of the batch is slow.
fn bench_pool_fail_fast(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool/fail_fast");
    group.sample_size(10);

    for workers in worker_counts() {
        group.bench_function(
            format!("elems/{}/workers/{}", TOTAL_INPUTS, workers),
            |b| {
                let rt = Builder::new_multi_thread().enable_all().build().unwrap();
                let pool = WorkerPool::new(workers, |cancel: CancellationToken, n: u64| async move {
                    if n == 8 {
                        return Err(n);
                    }
                    tokio::select! {
                        () = cancel.cancelled() => {}
                        () = tokio::time::sleep(Duration::from_millis(1)) => {}
                    }
                    Ok(n)
                });

                b.to_async(&rt).iter_custom(|iters| {
                    let pool = pool.clone();
                    async move {
                        let start = Instant::now();
                        for _ in 0..iters {
                            let outputs = pool.run((0..TOTAL_INPUTS as u64).collect()).await;
                            black_box(outputs.unwrap_err());
                        }
                        start.elapsed()
                    }
                });
            },
        );
    }

    group.finish();
}

fn worker_counts() -> Vec<usize> {
    let mut counts = vec![1, 2, 4, 8, 16, 64];
    let cpus = num_cpus::get();
    if !counts.contains(&cpus) {
        counts.push(cpus);
        counts.sort_unstable();
    }
    counts
}

criterion_group!(
    benches,
    bench_pool_ready,
    bench_pool_yielding,
    bench_pool_fail_fast,
);
criterion_main!(benches);
