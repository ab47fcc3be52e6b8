use std::time::{Duration, Instant};

use bloomserver_filter::{BloomFilter, ScanRequest, SubstringScanner};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn word_filter() -> BloomFilter {
    let mut filter = BloomFilter::with_capacity(100_000, 0.001).unwrap();
    for i in 0..100_000u32 {
        filter.insert(format!("word{}", i).as_bytes());
    }
    filter
}

fn bench_contains(c: &mut Criterion) {
    let filter = word_filter();
    c.bench_function("contains_hit", |b| {
        b.iter(|| filter.contains(black_box(b"word4242")))
    });
    c.bench_function("contains_miss", |b| {
        b.iter(|| filter.contains(black_box(b"not-a-word")))
    });
}

fn bench_scan(c: &mut Criterion) {
    let filter = word_filter();
    let scanner = SubstringScanner::new(&filter);
    let mut group = c.benchmark_group("scan");

    for len in [64usize, 256, 1024] {
        let text: String = "the quick brown fox word17 jumps "
            .chars()
            .cycle()
            .take(len)
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(len), &text, |b, text| {
            b.iter(|| {
                let request =
                    ScanRequest::new(text.clone(), 3, Instant::now() + Duration::from_secs(60));
                scanner.scan(black_box(&request))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_contains, bench_scan);
criterion_main!(benches);
