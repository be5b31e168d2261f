use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::{LinkedList, VecDeque};
use std::hint::black_box;
use unrolled_list::UnrolledList;

const SIZES: [usize; 3] = [100, 1_000, 10_000];

fn bench_push_back(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_back");
    for n in SIZES {
        group.bench_with_input(BenchmarkId::new("VecDeque", n), &n, |b, &n| {
            b.iter(|| {
                let mut d = VecDeque::new();
                for i in 0..n {
                    d.push_back(black_box(i));
                }
                d
            })
        });
        group.bench_with_input(BenchmarkId::new("LinkedList", n), &n, |b, &n| {
            b.iter(|| {
                let mut l = LinkedList::new();
                for i in 0..n {
                    l.push_back(black_box(i));
                }
                l
            })
        });
        group.bench_with_input(BenchmarkId::new("UnrolledList<_, 16>", n), &n, |b, &n| {
            b.iter(|| {
                let mut l: UnrolledList<usize, 16> = UnrolledList::new();
                for i in 0..n {
                    l.push_back(black_box(i));
                }
                l
            })
        });
    }
    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");
    for n in SIZES {
        let deque: VecDeque<usize> = (0..n).collect();
        let linked: LinkedList<usize> = (0..n).collect();
        let unrolled: UnrolledList<usize, 16> = (0..n).collect();
        group.bench_function(BenchmarkId::new("VecDeque", n), |b| {
            b.iter(|| black_box(&deque).iter().sum::<usize>())
        });
        group.bench_function(BenchmarkId::new("LinkedList", n), |b| {
            b.iter(|| black_box(&linked).iter().sum::<usize>())
        });
        group.bench_function(BenchmarkId::new("UnrolledList<_, 16>", n), |b| {
            b.iter(|| black_box(&unrolled).iter().sum::<usize>())
        });
    }
    group.finish();
}

/// Inserting and erasing through a position that stays near the middle.
fn bench_insert_erase_middle(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_erase_middle");
    for n in SIZES {
        group.bench_with_input(BenchmarkId::new("VecDeque", n), &n, |b, &n| {
            let mut d: VecDeque<usize> = (0..n).collect();
            b.iter(|| {
                d.insert(n / 2, black_box(0));
                d.remove(n / 2)
            })
        });
        group.bench_with_input(BenchmarkId::new("UnrolledList<_, 16>", n), &n, |b, &n| {
            let mut l: UnrolledList<usize, 16> = (0..n).collect();
            let mut pos = l.position(n / 2).unwrap();
            b.iter(|| {
                let inserted = l.insert(pos, black_box(0)).unwrap();
                pos = l.erase(inserted).unwrap();
            })
        });
    }
    group.finish();
}

fn bench_erase_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("erase_range");
    for n in SIZES {
        group.bench_with_input(BenchmarkId::new("VecDeque", n), &n, |b, &n| {
            b.iter_batched(
                || (0..n).collect::<VecDeque<usize>>(),
                |mut d| {
                    d.drain(n / 8..n - n / 8);
                    d
                },
                criterion::BatchSize::SmallInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("UnrolledList<_, 16>", n), &n, |b, &n| {
            b.iter_batched(
                || (0..n).collect::<UnrolledList<usize, 16>>(),
                |mut l| {
                    let first = l.position(n / 8).unwrap();
                    let last = l.position(n - n / 8).unwrap();
                    l.erase_range(first, last).unwrap();
                    l
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_push_back,
    bench_iterate,
    bench_insert_erase_middle,
    bench_erase_range
);
criterion_main!(benches);
