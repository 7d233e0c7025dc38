//! Round-trip benchmarks
//!
//! Measures each stage of the decorator round trip on a generated source:
//! - Locating decorators
//! - Encoding and decoding
//! - Full transform versus the host formatter alone
//! - Batch transform on the rayon pool

use asfmt_formatter::{decode, encode, locate, Marker, Pipeline};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// A module of `n` decorated declarations
fn decorated_module(n: usize) -> String {
    let mut source = String::new();
    for i in 0..n {
        source.push_str(&format!(
            "@inline\nexport function f{i}(a: i32, b: i32): i32 {{ return a + b * {i}; }}\n\
             @lazy let v{i}: i32 = f{i}(1, 2);\n\
             @unmanaged class C{i} {{\n  @inline get x(): i32 {{ return {i}; }}\n}}\n\n"
        ));
    }
    source
}

fn bench_locate(c: &mut Criterion) {
    let source = decorated_module(50);
    c.bench_function("locate_50_decls", |b| {
        b.iter(|| locate(black_box(&source)));
    });
}

fn bench_codec(c: &mut Criterion) {
    let source = decorated_module(50);
    let ranges = locate(&source).unwrap_or_default();
    let marker = Marker::for_source(&source).expect("tag");
    c.bench_function("encode_decode_50_decls", |b| {
        b.iter(|| {
            let encoded = encode(black_box(&source), &ranges, &marker).expect("encodes");
            decode(encoded.text(), &marker)
        });
    });
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let pipeline = Pipeline::default();
    for n in [10, 100] {
        let source = decorated_module(n);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("decorated", n), &source, |b, s| {
            b.iter(|| pipeline.transform(black_box(s)))
        });
        let plain = source.replace("@inline", "").replace("@lazy", "").replace("@unmanaged", "");
        group.bench_with_input(BenchmarkId::new("host_only", n), &plain, |b, s| {
            b.iter(|| asfmt_host::format_source(black_box(s)))
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let pipeline = Pipeline::default();
    let sources: Vec<String> = (0..32).map(|_| decorated_module(10)).collect();
    c.bench_function("transform_batch_32_files", |b| {
        b.iter(|| pipeline.transform_batch(black_box(&sources)));
    });
}

criterion_group!(benches, bench_locate, bench_codec, bench_transform, bench_batch);
criterion_main!(benches);
