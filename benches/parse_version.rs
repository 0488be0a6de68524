use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hearth::http::version::Version;
use std::str::FromStr;

const VERSIONS: [&str; 2] = ["HTTP/1.1", "HTTP/1.0"];

fn benchmark(c: &mut Criterion) {
    for version in VERSIONS {
        c.bench_with_input(BenchmarkId::new("version", version), black_box(&version), |b, i| {
            b.iter(|| Version::from_str(i))
        });
    }
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
