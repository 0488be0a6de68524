use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hearth::pool::ThreadPool;

fn benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_throughput");
    for workers in [1, 4, 16] {
        for jobs in [100, 1_000] {
            group.throughput(Throughput::Elements(jobs as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("workers={workers}"), jobs),
                &jobs,
                |b, &jobs| {
                    b.iter(|| {
                        let pool = ThreadPool::new(workers);
                        let count = Arc::new(AtomicUsize::new(0));
                        for _ in 0..jobs {
                            let count = Arc::clone(&count);
                            pool.schedule(move || {
                                count.fetch_add(1, Ordering::Relaxed);
                            });
                        }
                        pool.wait();
                        assert_eq!(count.load(Ordering::Relaxed), jobs);
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
