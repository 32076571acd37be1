use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dns_sd_lookup::{select, SrvTarget};

fn records(count: u16) -> Vec<SrvTarget> {
    (0..count)
        .map(|i| SrvTarget::new(i % 3, i % 7, 443, format!("host{i}.example.com")))
        .collect()
}

fn selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    for count in [1, 10, 100, 1000] {
        let records = records(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            b.iter(|| select(black_box(records)))
        });
    }
    group.finish();
}

criterion_group!(benches, selection);
criterion_main!(benches);
