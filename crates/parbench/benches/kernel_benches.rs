use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use parbench::{dot, matrix, Matrix, Plan};

fn lcg_values(len: usize, seed: u32, bound: u32) -> Vec<i64> {
    let mut s = seed;
    (0..len)
        .map(|_| {
            s = s.wrapping_mul(1103515245).wrapping_add(12345);
            ((s >> 16) % bound) as i64
        })
        .collect()
}

fn bench_dot(c: &mut Criterion) {
    let len = 1 << 20;
    let a = lcg_values(len, 0x1234_5678, 100);
    let b = lcg_values(len, 0xDEAD_BEEF, 100);

    let mut group = c.benchmark_group("dot");
    group.throughput(Throughput::Elements(len as u64));
    group.bench_function("sequential", |bench| {
        bench.iter(|| dot::sequential(&a, &b).unwrap())
    });
    for workers in [1usize, 2, 4, 8] {
        let plan = Plan::new(workers);
        group.bench_with_input(BenchmarkId::new("parallel", workers), &plan, |bench, plan| {
            bench.iter(|| dot::parallel_with(&a, &b, plan).unwrap())
        });
    }
    group.finish();
}

fn bench_matmul(c: &mut Criterion) {
    let dim = 128;
    let a = Matrix::from_vec(dim, lcg_values(dim * dim, 42, 10)).unwrap();
    let b = Matrix::from_vec(dim, lcg_values(dim * dim, 7, 10)).unwrap();

    let mut group = c.benchmark_group("matmul");
    group.sample_size(20);
    group.bench_function("sequential", |bench| {
        bench.iter(|| matrix::sequential(&a, &b).unwrap())
    });
    for workers in [1usize, 2, 4, 8] {
        let plan = Plan::new(workers);
        group.bench_with_input(BenchmarkId::new("parallel", workers), &plan, |bench, plan| {
            bench.iter(|| matrix::parallel_with(&a, &b, plan).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_dot, bench_matmul);
criterion_main!(benches);
