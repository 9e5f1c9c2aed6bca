//! Throughput benchmarks for the bit predictors.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use entropy_predictors::{Cm, Fpaq, Predictor, Tpaq, TpaqSize};
use std::hint::black_box;

fn bits_of(data: &[u8]) -> impl Iterator<Item = bool> + '_ {
    data.iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1 != 0))
}

fn sample_data(size: usize) -> Vec<u8> {
    let text = b"The quick brown fox jumps over the lazy dog. ";
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        let remaining = size - data.len();
        data.extend_from_slice(&text[..remaining.min(text.len())]);
    }
    data
}

fn bench_fpaq(c: &mut Criterion) {
    let mut group = c.benchmark_group("fpaq_predict_update");
    for &size in &[4096usize, 65536] {
        let data = sample_data(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                let mut p = Fpaq::new();
                for bit in bits_of(data) {
                    black_box(p.get());
                    p.update(bit);
                }
            });
        });
    }
    group.finish();
}

fn bench_cm(c: &mut Criterion) {
    let mut group = c.benchmark_group("cm_predict_update");
    for &size in &[4096usize, 65536] {
        let data = sample_data(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                let mut p = Cm::new();
                for bit in bits_of(data) {
                    black_box(p.get());
                    p.update(bit);
                }
            });
        });
    }
    group.finish();
}

fn bench_tpaq(c: &mut Criterion) {
    let mut group = c.benchmark_group("tpaq_predict_update");
    for &size in &[4096usize, 16384] {
        let data = sample_data(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                let mut p = Tpaq::new(TpaqSize::Small, false);
                for bit in bits_of(data) {
                    black_box(p.get());
                    p.update(bit);
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fpaq, bench_cm, bench_tpaq);
criterion_main!(benches);
