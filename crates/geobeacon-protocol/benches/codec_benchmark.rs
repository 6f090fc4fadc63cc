//! Benchmarks for the location record codec.
//!
//! ```bash
//! cargo bench -p geobeacon-protocol
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use geobeacon_protocol::{codec, FrameAssembler, RECORD_LEN};

const VALID: &[u8] = b"+47.606209,-122.332071";
const INVALID: &[u8] = b"+47.606209,-122.33207x";

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    group.throughput(Throughput::Bytes(RECORD_LEN as u64));
    group.bench_function("valid_record", |b| {
        b.iter(|| codec::validate(black_box(VALID)))
    });
    group.bench_function("invalid_record", |b| {
        b.iter(|| codec::validate(black_box(INVALID)))
    });
    group.finish();
}

fn bench_decode_encode(c: &mut Criterion) {
    let fix = codec::decode(VALID);
    c.bench_function("decode", |b| b.iter(|| codec::decode(black_box(VALID))));
    c.bench_function("encode", |b| b.iter(|| codec::encode(black_box(&fix))));
}

fn bench_assemble(c: &mut Criterion) {
    c.bench_function("assemble_line", |b| {
        b.iter(|| {
            let mut assembler = FrameAssembler::new();
            let status = assembler.accumulate_pass(
                VALID.iter().copied().chain(b"\r\n".iter().copied()),
            );
            black_box(status)
        })
    });
}

criterion_group!(benches, bench_validate, bench_decode_encode, bench_assemble);
criterion_main!(benches);
