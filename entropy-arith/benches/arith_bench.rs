//! Throughput benchmarks for the binary arithmetic codec.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use entropy_arith::BlockCodec;
use entropy_core::bitstream::{BitReader, BitWriter};
use entropy_predictors::Fpaq;
use std::hint::black_box;
use std::io::Cursor;

fn sample_data(size: usize) -> Vec<u8> {
    let text = b"The quick brown fox jumps over the lazy dog. ";
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        let remaining = size - data.len();
        data.extend_from_slice(&text[..remaining.min(text.len())]);
    }
    data
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("arith_encode");
    for &size in &[4096usize, 65536] {
        let data = sample_data(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                let mut output = Vec::new();
                let mut writer = BitWriter::new(&mut output);
                let mut codec = BlockCodec::new(Fpaq::new());
                codec.write(&mut writer, black_box(data)).unwrap();
                writer.flush().unwrap();
                black_box(output);
            });
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("arith_decode");
    for &size in &[4096usize, 65536] {
        let data = sample_data(size);
        let mut encoded = Vec::new();
        {
            let mut writer = BitWriter::new(&mut encoded);
            let mut codec = BlockCodec::new(Fpaq::new());
            codec.write(&mut writer, &data).unwrap();
            writer.flush().unwrap();
        }

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(encoded, size),
            |b, (encoded, size)| {
                b.iter(|| {
                    let mut reader = BitReader::new(Cursor::new(encoded));
                    let mut codec = BlockCodec::new(Fpaq::new());
                    black_box(codec.read(&mut reader, *size).unwrap());
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
