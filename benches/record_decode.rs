//! Benchmarks for record header parsing, MMI decoding and whole-file scans
//!
//! Tests decoding performance for:
//! - 15-byte record headers (record profile)
//! - MMI_DYNAMIC and MMI_STATUS sub-packets
//! - Dispatching complete records
//! - Scanning a synthetic record file end to end
//!
//! Platform: Cross-platform (synthetic records, CI-safe)

use atp_decode::config::ScanConfig;
use atp_decode::file::RecordFileReader;
use atp_decode::mmi;
use atp_decode::record::{RecordDispatcher, RecordHeader};
use atp_decode::test_utils::{mmi_dynamic_body, record, sample_record_file};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_header(c: &mut Criterion) {
    let raw = record(1, &mmi_dynamic_body());

    c.bench_function("record_header_parse", |b| {
        b.iter(|| black_box(RecordHeader::parse(black_box(&raw)).unwrap()))
    });
}

fn bench_mmi(c: &mut Criterion) {
    let dynamic = mmi_dynamic_body();
    let status = [2u8, 0, 0, 9, 0x31, 0b1001_1110];

    let mut group = c.benchmark_group("mmi_decode");
    group.bench_function("dynamic", |b| {
        b.iter(|| black_box(mmi::decode_mmi_dynamic(black_box(&dynamic)).unwrap()))
    });
    group.bench_function("status", |b| {
        b.iter(|| black_box(mmi::decode_mmi_status(black_box(&status)).unwrap()))
    });
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let cases = [
        ("status", record(2, &[5])),
        ("mmi_dynamic", record(1, &mmi_dynamic_body())),
        ("button", record(216, &[3])),
        ("unknown", record(0xFF, &[0xAA; 32])),
    ];

    let mut group = c.benchmark_group("dispatch");
    for (name, raw) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), raw, |b, raw| {
            let mut dispatcher = RecordDispatcher::new();
            b.iter(|| black_box(dispatcher.decode(black_box(raw)).unwrap()))
        });
    }
    group.finish();
}

fn bench_file_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_scan");

    for copies in [1usize, 64, 1024] {
        let data: Vec<u8> = sample_record_file().repeat(copies);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(copies), &data, |b, data| {
            b.iter(|| {
                let mut reader = RecordFileReader::from_bytes(data.clone(), ScanConfig::default());
                black_box(reader.read_all().unwrap().len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_header, bench_mmi, bench_dispatch, bench_file_scan);
criterion_main!(benches);
