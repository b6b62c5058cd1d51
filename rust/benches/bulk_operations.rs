use bplustree::BPlusTreeMap;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;

const TREE_CAPACITY: usize = 64;
const SEED: u64 = 42;

fn generate_test_data(size: usize) -> Vec<(i32, i32)> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..size)
        .map(|_| (rng.gen_range(0..size as i32 * 2), rng.gen()))
        .collect()
}

fn bench_sequential_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_insertion");
    group.sample_size(30);

    for size in [1000, 5000, 10000].iter() {
        let data: Vec<(i32, i32)> = (0..*size as i32).map(|i| (i, i)).collect();

        group.bench_with_input(BenchmarkId::new("insert", size), size, |b, _| {
            b.iter(|| {
                let mut tree = BPlusTreeMap::new(TREE_CAPACITY).unwrap();
                for (key, value) in &data {
                    black_box(tree.insert(*key, *value));
                }
                black_box(tree)
            })
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    group.sample_size(100);

    for size in [100, 1000, 10000, 50000].iter() {
        let data = generate_test_data(*size);
        let mut tree = BPlusTreeMap::new(TREE_CAPACITY).unwrap();
        for (key, value) in &data {
            tree.insert(*key, *value);
        }

        let mut rng = StdRng::seed_from_u64(SEED + 1);
        let lookup_keys: Vec<i32> = (0..1000)
            .map(|_| rng.gen_range(0..*size as i32 * 3))
            .collect();

        group.bench_with_input(BenchmarkId::new("get", size), size, |b, _| {
            b.iter(|| {
                for key in &lookup_keys {
                    black_box(tree.get(key));
                }
            })
        });
    }
    group.finish();
}

fn bench_deletion(c: &mut Criterion) {
    let mut group = c.benchmark_group("deletion");
    group.sample_size(20);

    for size in [1000, 5000, 10000].iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("remove_all", size), size, |b, _| {
            b.iter(|| {
                let mut tree = BPlusTreeMap::new(TREE_CAPACITY).unwrap();
                for (key, value) in &data {
                    tree.insert(*key, *value);
                }
                for (key, _) in &data {
                    black_box(tree.remove(key));
                }
                black_box(&tree)
            })
        });
    }
    group.finish();
}

fn bench_range_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_queries");
    group.sample_size(50);

    let size = 10000;
    let data: Vec<(i32, i32)> = (0..size).map(|i| (i, i)).collect();
    let mut tree = BPlusTreeMap::new(TREE_CAPACITY).unwrap();
    for (key, value) in &data {
        tree.insert(*key, *value);
    }

    for range_size in [10, 100, 1000].iter() {
        let start = size / 4;
        let end = start + range_size;

        group.bench_with_input(BenchmarkId::new("range", range_size), range_size, |b, _| {
            b.iter(|| {
                let count = tree.range(start..end).count();
                black_box(count)
            })
        });
    }
    group.finish();
}

fn bench_bulk_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_load");
    group.sample_size(20);

    for size in [1000, 10000, 100000].iter() {
        let mut source = BPlusTreeMap::new(TREE_CAPACITY).unwrap();
        for i in 0..*size as i32 {
            source.insert(i, i);
        }
        let mut buf = Vec::new();
        source.save(&mut buf).unwrap();

        group.bench_with_input(BenchmarkId::new("load", size), &buf, |b, buf| {
            b.iter(|| {
                let tree =
                    BPlusTreeMap::<i32, i32>::load(TREE_CAPACITY, Cursor::new(buf.clone()))
                        .unwrap();
                black_box(tree)
            })
        });

        group.bench_with_input(BenchmarkId::new("point_insert", size), size, |b, size| {
            b.iter(|| {
                let mut tree = BPlusTreeMap::new(TREE_CAPACITY).unwrap();
                for i in 0..*size as i32 {
                    tree.insert(i, i);
                }
                black_box(tree)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_insertion,
    bench_lookup,
    bench_deletion,
    bench_range_queries,
    bench_bulk_load
);
criterion_main!(benches);
