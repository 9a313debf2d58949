//! Launching one unit of work per range and joining them all.
//!
//! Every entry point blocks until all units have terminated; results come
//! back in worker-index order. Units are never reused across calls: the
//! thread strategy spawns scoped threads, the rayon strategy builds a pool
//! sized to the number of ranges for each call.

use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::thread;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::partition::{covers, Range, Split};

/// Strategy used to launch the per-range units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Executor {
    /// One scoped OS thread per range.
    #[default]
    Threads,
    /// One rayon task per range on a pool built for the call.
    Rayon,
}

impl FromStr for Executor {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "threads" => Ok(Executor::Threads),
            "rayon" => Ok(Executor::Rayon),
            other => Err(format!("unknown executor '{other}' (expected threads|rayon)")),
        }
    }
}

/// Number of hardware threads, or 1 if it cannot be queried.
pub fn available_workers() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

/// Per-call parallel execution choices.
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct Plan {
    pub workers: usize,
    pub executor: Executor,
    pub split: Split,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            workers: available_workers(),
            executor: Executor::default(),
            split: Split::default(),
        }
    }
}

impl Plan {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            ..Default::default()
        }
    }

    pub fn ranges(&self, extent: usize) -> Result<Vec<Range>> {
        self.split.partition(extent, self.workers)
    }
}

/// Run `work` once per range and return the per-range results in order.
pub fn map_ranges<T, F>(executor: Executor, ranges: &[Range], work: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(Range) -> T + Sync,
{
    run_units(executor, ranges.to_vec(), &work)
}

/// Split `out` into one block of `range.len() * stride` elements per range
/// and run `work` on every block concurrently.
///
/// `ranges` must tile `[0, out.len() / stride)`; each unit only ever sees
/// its own block.
pub fn for_each_block_mut<T, F>(
    executor: Executor,
    out: &mut [T],
    stride: usize,
    ranges: &[Range],
    work: F,
) -> Result<()>
where
    T: Send,
    F: Fn(Range, &mut [T]) + Sync,
{
    let extent = ranges.last().map_or(0, |r| r.end);
    if !covers(ranges, extent) || extent.checked_mul(stride) != Some(out.len()) {
        return Err(Error::invalid(format!(
            "ranges do not tile an output of {} elements with stride {}",
            out.len(),
            stride
        )));
    }

    let units: Vec<(Range, &mut [T])> = ranges
        .iter()
        .copied()
        .zip(split_blocks(out, stride, ranges))
        .collect();
    run_units(executor, units, &|(range, block): (Range, &mut [T])| {
        work(range, block)
    })?;
    Ok(())
}

fn split_blocks<'a, T>(mut rest: &'a mut [T], stride: usize, ranges: &[Range]) -> Vec<&'a mut [T]> {
    let mut blocks = Vec::with_capacity(ranges.len());
    for r in ranges {
        let (head, tail) = core::mem::take(&mut rest).split_at_mut(r.len() * stride);
        blocks.push(head);
        rest = tail;
    }
    blocks
}

fn run_units<U, T, F>(executor: Executor, units: Vec<U>, work: &F) -> Result<Vec<T>>
where
    U: Send,
    T: Send,
    F: Fn(U) -> T + Sync,
{
    log::debug!("launching {} units ({:?})", units.len(), executor);
    match executor {
        Executor::Threads => run_threads(units, work),
        Executor::Rayon => run_rayon(units, work),
    }
}

fn run_threads<U, T, F>(units: Vec<U>, work: &F) -> Result<Vec<T>>
where
    U: Send,
    T: Send,
    F: Fn(U) -> T + Sync,
{
    thread::scope(|s| {
        let mut handles = Vec::with_capacity(units.len());
        for (worker, unit) in units.into_iter().enumerate() {
            let spawned = thread::Builder::new()
                .name(format!("parbench-{worker}"))
                .spawn_scoped(s, move || work(unit));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(Error::Spawn { worker, source });
                }
            }
        }

        // Barrier: every handle is joined before any result is inspected.
        let joined: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
        log::trace!("joined {} threads", joined.len());

        joined
            .into_iter()
            .enumerate()
            .map(|(worker, r)| r.map_err(|_| Error::ExecutionInterrupted { worker }))
            .collect()
    })
}

fn run_rayon<U, T, F>(units: Vec<U>, work: &F) -> Result<Vec<T>>
where
    U: Send,
    T: Send,
    F: Fn(U) -> T + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(units.len().max(1))
        .thread_name(|i| format!("parbench-rayon-{i}"))
        .build()?;

    let mut slots: Vec<Option<thread::Result<T>>> = Vec::with_capacity(units.len());
    slots.resize_with(units.len(), || None);

    pool.scope(|s| {
        for (slot, unit) in slots.iter_mut().zip(units) {
            s.spawn(move |_| {
                *slot = Some(panic::catch_unwind(AssertUnwindSafe(|| work(unit))));
            });
        }
    });
    log::trace!("rayon scope finished ({} slots)", slots.len());

    slots
        .into_iter()
        .enumerate()
        .map(|(worker, slot)| match slot {
            Some(Ok(value)) => Ok(value),
            _ => Err(Error::ExecutionInterrupted { worker }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partition;

    const EXECUTORS: [Executor; 2] = [Executor::Threads, Executor::Rayon];

    #[test]
    fn test_map_ranges_preserves_order() {
        let ranges = partition(10, 3).unwrap();
        for executor in EXECUTORS {
            let lens = map_ranges(executor, &ranges, |r| r.len()).unwrap();
            assert_eq!(lens, [3, 3, 4]);
        }
    }

    #[test]
    fn test_empty_ranges_complete() {
        let ranges = partition(0, 6).unwrap();
        for executor in EXECUTORS {
            let out = map_ranges(executor, &ranges, |r| r.len()).unwrap();
            assert_eq!(out, [0; 6]);
        }
    }

    #[test]
    fn test_panicking_worker_is_reported() {
        let ranges = partition(8, 4).unwrap();
        for executor in EXECUTORS {
            let err = map_ranges(executor, &ranges, |r| {
                if r.start == 4 {
                    panic!("boom");
                }
                r.len()
            })
            .unwrap_err();
            assert!(
                matches!(err, Error::ExecutionInterrupted { worker: 2 }),
                "{executor:?}: {err}"
            );
        }
    }

    #[test]
    fn test_blocks_are_disjoint_rows() {
        let ranges = partition(5, 2).unwrap();
        for executor in EXECUTORS {
            let mut out = vec![0usize; 5 * 3];
            for_each_block_mut(executor, &mut out, 3, &ranges, |range, block| {
                assert_eq!(block.len(), range.len() * 3);
                for (offset, row) in block.chunks_mut(3).enumerate() {
                    row.fill(range.start + offset);
                }
            })
            .unwrap();
            assert_eq!(out, [0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
        }
    }

    #[test]
    fn test_blocks_reject_mismatched_output() {
        let ranges = partition(4, 2).unwrap();
        let mut out = vec![0i64; 10];
        let err = for_each_block_mut(Executor::Threads, &mut out, 3, &ranges, |_, _| {}).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_plan_builder_defaults() {
        let plan = PlanBuilder::default().workers(3).build().unwrap();
        assert_eq!(plan.workers, 3);
        assert_eq!(plan.executor, Executor::Threads);
        assert_eq!(plan.split, Split::Last);
        assert!(Plan::default().workers >= 1);
    }

    #[test]
    fn test_parse_strategies() {
        assert_eq!("rayon".parse::<Executor>().unwrap(), Executor::Rayon);
        assert_eq!("balanced".parse::<Split>().unwrap(), Split::Balanced);
        assert!("pool".parse::<Executor>().is_err());
    }
}
