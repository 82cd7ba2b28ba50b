//! Throughput Benchmarks for LiteKV
//!
//! Measures the store under single-threaded and contended workloads, the
//! janitor's sweep cost, and the dispatcher's per-line overhead.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use litekv::commands::CommandDispatcher;
use litekv::protocol::tokenize;
use litekv::storage::Store;
use std::sync::Arc;
use std::time::Duration;

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let store = Arc::new(Store::new());

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            store.set(key, Bytes::from("small_value"), None);
            i += 1;
        });
    });

    group.bench_function("set_with_ttl", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("ttl:{}", i));
            store.set(key, Bytes::from("value"), Some(Duration::from_secs(3600)));
            i += 1;
        });
    });

    group.bench_function("overwrite_same_key", |b| {
        let value = Bytes::from("x".repeat(1024)); // 1KB value
        b.iter(|| {
            store.set(Bytes::from("hot"), value.clone(), None);
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let store = Arc::new(Store::new());

    for i in 0..100_000 {
        store.set(
            Bytes::from(format!("key:{}", i)),
            Bytes::from(format!("value:{}", i)),
            None,
        );
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i % 100_000));
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("missing:{}", i));
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark contended access: every call takes the single write lock
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    for threads in [1usize, 4, 8] {
        group.bench_function(format!("{}_threads_set_get", threads), |b| {
            b.iter(|| {
                let store = Arc::new(Store::new());
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let store = Arc::clone(&store);
                        thread::spawn(move || {
                            for i in 0..10_000 {
                                let key = Bytes::from(format!("key:{}:{}", t, i));
                                store.set(key.clone(), Bytes::from("value"), None);
                                store.get(&key);
                            }
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.join().unwrap();
                }

                black_box(store.len());
            });
        });
    }

    group.finish();
}

/// Benchmark a full janitor sweep
fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");

    for (name, expired) in [("nothing_expired", 0usize), ("half_expired", 50_000)] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || {
                    let store = Store::new();
                    for i in 0..100_000 {
                        let ttl = if i < expired {
                            Some(Duration::from_nanos(1))
                        } else {
                            None
                        };
                        store.set(Bytes::from(format!("key:{}", i)), Bytes::from("v"), ttl);
                    }
                    store
                },
                |store| black_box(store.sweep_expired()),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

/// Benchmark tokenizing and dispatching one request line
fn bench_dispatch(c: &mut Criterion) {
    let store = Arc::new(Store::new());
    let dispatcher = CommandDispatcher::new(Arc::clone(&store));
    dispatcher.execute(&tokenize(&Bytes::from("SET greeting hello")));

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let ping = Bytes::from("PING\r\n");
    let set = Bytes::from("SET session:42 token EX 3600\r\n");
    let get = Bytes::from("GET greeting\r\n");

    group.bench_function("ping", |b| {
        b.iter(|| black_box(dispatcher.execute(&tokenize(&ping))));
    });

    group.bench_function("set_ex", |b| {
        b.iter(|| black_box(dispatcher.execute(&tokenize(&set))));
    });

    group.bench_function("get_hit", |b| {
        b.iter(|| black_box(dispatcher.execute(&tokenize(&get)).map(|r| r.serialize())));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_concurrent,
    bench_sweep,
    bench_dispatch,
);

criterion_main!(benches);
