//! Benchmarks for layout generation, the layout codec, and store reconciliation.
//!
//! Run with: cargo bench -p bento-layout

use bento_core::ItemId;
use bento_layout::{LayoutCodec, LayoutStore, MemoryStorage, PersistedLayout, generate};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn named(n: usize) -> Vec<ItemId> {
    (0..n).map(|i| ItemId::new(format!("stream-{i}"))).collect()
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/generate");

    for n in [1, 4, 6, 9, 16, 36] {
        let items = named(n);
        group.bench_with_input(BenchmarkId::new("items", n), &items, |b, items| {
            b.iter(|| black_box(generate(items, items.last())))
        });
    }

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/codec");

    for n in [2, 6, 16] {
        let items = named(n);
        let arrangement = generate(&items, None);

        group.bench_with_input(BenchmarkId::new("encode", n), &n, |b, _| {
            b.iter(|| black_box(PersistedLayout::encode(&arrangement, &items)))
        });

        let codec = LayoutCodec::new(MemoryStorage::new());
        codec
            .save(&arrangement, &items)
            .expect("memory storage accepts writes");
        group.bench_with_input(BenchmarkId::new("load", n), &n, |b, &n| {
            b.iter(|| black_box(codec.load(n, &items, items.first())))
        });
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/reconcile");

    for n in [4, 16] {
        let items = named(n);
        let renamed: Vec<ItemId> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if i % 2 == 0 {
                    ItemId::new(format!("{item}-renamed"))
                } else {
                    item.clone()
                }
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("remap", n), &n, |b, _| {
            b.iter_batched(
                || {
                    let mut store = LayoutStore::new(MemoryStorage::new());
                    store.set_items(items.clone());
                    store
                },
                |mut store| black_box(store.set_items(renamed.clone())),
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("swap", n), &n, |b, &n| {
            let mut store = LayoutStore::new(MemoryStorage::new());
            store.set_items(items.clone());
            b.iter(|| black_box(store.swap_by_index(0, n - 1)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate, bench_codec, bench_reconcile);
criterion_main!(benches);
