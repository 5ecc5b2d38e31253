use avl_treemap::{AvlTree, Dynamic, NodeAllocator, Pooled, Slab};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;
use std::hint::black_box;

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn build<A: NodeAllocator<i64, i64>>(alloc: &mut A, keys: &[i64]) -> AvlTree<i64, i64> {
    let mut tree = AvlTree::new();
    for &k in keys {
        tree.put(alloc, k, k).unwrap();
    }
    tree
}

// ─── Insert ─────────────────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion, name: &str, keys: &[i64]) {
    let mut group = c.benchmark_group(name);

    group.bench_function(BenchmarkId::new("Dynamic", N), |b| {
        b.iter(|| {
            let mut heap = Dynamic::new();
            let mut tree = build(&mut heap, keys);
            tree.destroy(&mut heap);
        });
    });

    group.bench_function(BenchmarkId::new("Pooled", N), |b| {
        let mut pool = Pooled::new(N, N);
        b.iter(|| {
            let mut tree = build(&mut pool, keys);
            tree.destroy(&mut pool);
        });
    });

    group.bench_function(BenchmarkId::new("Slab", N), |b| {
        let mut slab = Slab::with_capacity(N);
        b.iter(|| {
            let mut tree = build(&mut slab, keys);
            tree.destroy(&mut slab);
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_insert_ordered(c: &mut Criterion) {
    bench_insert(c, "insert_ordered", &ordered_keys(N));
}

fn bench_insert_random(c: &mut Criterion) {
    bench_insert(c, "insert_random", &random_keys(N));
}

// ─── Lookup ─────────────────────────────────────────────────────────────────

fn bench_get_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("get_random");

    let mut slab = Slab::with_capacity(N);
    let mut tree = build(&mut slab, &keys);
    group.bench_function(BenchmarkId::new("AvlTree", N), |b| {
        b.iter(|| {
            for k in &keys {
                black_box(tree.get(&slab, k));
            }
        });
    });
    tree.destroy(&mut slab);

    let map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            for k in &keys {
                black_box(map.get(k));
            }
        });
    });

    group.finish();
}

fn bench_get_by_rank(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("get_by_rank");

    let mut slab = Slab::with_capacity(N);
    let mut tree = build(&mut slab, &keys);
    group.bench_function(BenchmarkId::new("AvlTree", N), |b| {
        b.iter(|| {
            for rank in 0..tree.len() {
                black_box(tree.get_by_rank(&slab, rank));
            }
        });
    });
    tree.destroy(&mut slab);

    let map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            for rank in (0..map.len()).step_by(100) {
                black_box(map.iter().nth(rank));
            }
        });
    });

    group.finish();
}

// ─── Remove ─────────────────────────────────────────────────────────────────

fn bench_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("remove_random");

    group.bench_function(BenchmarkId::new("Pooled", N), |b| {
        b.iter_batched(
            || {
                let mut pool = Pooled::new(N, N);
                let tree = build(&mut pool, &keys);
                (pool, tree)
            },
            |(mut pool, mut tree)| {
                for k in &keys {
                    black_box(tree.remove(&mut pool, k));
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<_, _>>(),
            |mut map| {
                for k in &keys {
                    black_box(map.remove(k));
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Deque ──────────────────────────────────────────────────────────────────

fn bench_deque(c: &mut Criterion) {
    let mut group = c.benchmark_group("deque_push_pop");

    group.bench_function(BenchmarkId::new("AvlTree", N), |b| {
        let mut slab = Slab::with_capacity(N);
        b.iter(|| {
            let mut tree: AvlTree<i64, usize> = AvlTree::new();
            for i in 0..N {
                if i % 2 == 0 {
                    tree.push_first(&mut slab, i).unwrap();
                } else {
                    tree.push_last(&mut slab, i).unwrap();
                }
            }
            while let Some(value) = tree.pop_first(&mut slab) {
                black_box(value);
            }
        });
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(insert_benches, bench_insert_ordered, bench_insert_random,);

criterion_group!(lookup_benches, bench_get_random, bench_get_by_rank,);

criterion_group!(remove_benches, bench_remove_random, bench_deque,);

criterion_main!(insert_benches, lookup_benches, remove_benches,);
