//! Pack and unpack throughput
//!
//! # Tree shapes
//!
//! - **Many small**: 500 files of 256 bytes across 10 directories
//! - **Few large**: 4 files of 4 MiB

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use satchel_archive::{Limits, PackOptions, pack, unpack};
use std::fs;
use std::hint::black_box;
use std::path::Path;

fn build_many_small(root: &Path) -> u64 {
    for d in 0..10 {
        let dir = root.join(format!("dir{d:02}"));
        fs::create_dir_all(&dir).unwrap();
        for f in 0..50 {
            fs::write(dir.join(format!("file{f:03}.dat")), [d as u8; 256]).unwrap();
        }
    }
    500 * 256
}

fn build_few_large(root: &Path) -> u64 {
    let chunk: Vec<u8> = (0..4 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    for f in 0..4 {
        fs::write(root.join(format!("large{f}.bin")), &chunk).unwrap();
    }
    4 * chunk.len() as u64
}

fn bench_pack_unpack(c: &mut Criterion) {
    let shapes: [(&str, fn(&Path) -> u64); 2] =
        [("many_small", build_many_small), ("few_large", build_few_large)];

    let mut group = c.benchmark_group("archive");
    group.sample_size(20);

    for (name, build) in shapes {
        let src = tempfile::tempdir().unwrap();
        let bytes = build(src.path());
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("bench.satchel");
        group.throughput(Throughput::Bytes(bytes));

        group.bench_with_input(BenchmarkId::new("pack", name), &src, |b, src| {
            b.iter(|| pack(black_box(src.path()), &archive, &PackOptions::default()).unwrap());
        });

        pack(src.path(), &archive, &PackOptions::default()).unwrap();
        group.bench_with_input(BenchmarkId::new("unpack", name), &archive, |b, archive| {
            b.iter_batched(
                || tempfile::tempdir().unwrap(),
                |target| {
                    unpack(black_box(archive), &target.path().join("out"), &Limits::default())
                        .unwrap();
                    target
                },
                BatchSize::PerIteration,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pack_unpack);
criterion_main!(benches);
