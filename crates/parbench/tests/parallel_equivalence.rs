use parbench::exec::map_ranges;
use parbench::partition::covers;
use parbench::{
    dot, matrix, partition, partition_balanced, Executor, Matrix, PlanBuilder, Range, Split,
};
use proptest::prelude::*;

fn plan(workers: usize, executor: Executor) -> parbench::Plan {
    PlanBuilder::default()
        .workers(workers)
        .executor(executor)
        .build()
        .expect("plan")
}

fn executor() -> impl Strategy<Value = Executor> {
    prop_oneof![Just(Executor::Threads), Just(Executor::Rayon)]
}

fn vectors() -> impl Strategy<Value = (Vec<i64>, Vec<i64>)> {
    (1usize..200).prop_flat_map(|n| {
        (
            prop::collection::vec(0i64..100, n),
            prop::collection::vec(0i64..100, n),
        )
    })
}

fn matrices() -> impl Strategy<Value = (Matrix, Matrix)> {
    (1usize..12).prop_flat_map(|n| {
        (
            prop::collection::vec(-10i64..10, n * n),
            prop::collection::vec(-10i64..10, n * n),
        )
            .prop_map(move |(a, b)| {
                (
                    Matrix::from_vec(n, a).expect("square"),
                    Matrix::from_vec(n, b).expect("square"),
                )
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn dot_parallel_matches_sequential(
        (a, b) in vectors(),
        frac in 0.0f64..1.0,
        executor in executor(),
    ) {
        let workers = 1 + ((a.len() - 1) as f64 * frac) as usize;
        let expected = dot::sequential(&a, &b).unwrap();
        prop_assert_eq!(dot::parallel_with(&a, &b, &plan(workers, executor)).unwrap(), expected);
    }

    #[test]
    fn matmul_parallel_matches_triple_loop(
        (a, b) in matrices(),
        frac in 0.0f64..1.0,
        executor in executor(),
    ) {
        let workers = 1 + ((a.dim() - 1) as f64 * frac) as usize;
        let expected = matrix::sequential(&a, &b).unwrap();
        let actual = matrix::parallel_with(&a, &b, &plan(workers, executor)).unwrap();
        prop_assert!(parbench::matrices_equal(&expected, &actual));
    }

    #[test]
    fn partition_tiles_extent(extent in 0usize..10_000, workers in 1usize..64) {
        for ranges in [partition(extent, workers).unwrap(), partition_balanced(extent, workers).unwrap()] {
            prop_assert_eq!(ranges.len(), workers);
            prop_assert!(covers(&ranges, extent));
        }
    }

    #[test]
    fn last_range_absorbs_remainder(extent in 0usize..10_000, workers in 1usize..64) {
        let ranges = partition(extent, workers).unwrap();
        let block = extent / workers;
        for r in &ranges[..workers - 1] {
            prop_assert_eq!(r.len(), block);
        }
        prop_assert_eq!(ranges[workers - 1].len(), block + extent % workers);
    }
}

#[test]
fn dot_product_scenario() {
    let a: Vec<i64> = (1..=8).collect();
    let b: Vec<i64> = (1..=8).rev().collect();

    let ranges = partition(a.len(), 4).unwrap();
    assert_eq!(
        ranges,
        [
            Range::new(0, 2),
            Range::new(2, 4),
            Range::new(4, 6),
            Range::new(6, 8)
        ]
    );

    assert_eq!(dot::sequential(&a, &b).unwrap(), 120);
    assert_eq!(dot::parallel(&a, &b, 4).unwrap(), 120);
}

#[test]
fn identity_times_matrix_scenario() {
    let a = Matrix::identity(4);
    let b = Matrix::from_rows(vec![
        vec![3, 1, 4, 1],
        vec![5, 9, 2, 6],
        vec![5, 3, 5, 8],
        vec![9, 7, 9, 3],
    ])
    .unwrap();

    assert_eq!(
        partition(4, 2).unwrap(),
        [Range::new(0, 2), Range::new(2, 4)]
    );
    assert_eq!(matrix::parallel(&a, &b, 2).unwrap(), b);
}

#[test]
fn single_worker_matches_sequential() {
    let a: Vec<i64> = (0..1000).map(|i| i % 97).collect();
    let b: Vec<i64> = (0..1000).map(|i| (i * 7) % 89).collect();
    assert_eq!(partition(a.len(), 1).unwrap(), [Range::new(0, 1000)]);
    assert_eq!(
        dot::parallel(&a, &b, 1).unwrap(),
        dot::sequential(&a, &b).unwrap()
    );
}

#[test]
fn more_workers_than_rows_does_not_stall() {
    let a = Matrix::identity(3);
    let b = Matrix::from_vec(3, (1..=9).collect()).unwrap();
    for executor in [Executor::Threads, Executor::Rayon] {
        let c = matrix::parallel_with(&a, &b, &plan(16, executor)).unwrap();
        assert_eq!(c, b);
    }
}

#[test]
fn zero_extent_runs_every_worker() {
    let ranges = partition(0, 8).unwrap();
    let visited = map_ranges(Executor::Threads, &ranges, |r| r.is_empty()).unwrap();
    assert_eq!(visited, [true; 8]);
}

#[test]
fn balanced_split_gives_same_result() {
    let a: Vec<i64> = (0..1001).collect();
    let b: Vec<i64> = (0..1001).map(|i| 1000 - i).collect();
    let balanced = PlanBuilder::default()
        .workers(7)
        .split(Split::Balanced)
        .build()
        .unwrap();
    assert_eq!(
        dot::parallel_with(&a, &b, &balanced).unwrap(),
        dot::sequential(&a, &b).unwrap()
    );
}
