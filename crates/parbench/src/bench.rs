//! Sequential-vs-parallel timing harness.

use std::time::{Duration, Instant};

use crate::dot;
use crate::error::{Error, Result};
use crate::exec::Plan;
use crate::matrix::{self, matrices_equal, Matrix};
use crate::report::BenchmarkRecord;

/// One timed run.
#[derive(Clone, Debug)]
pub struct Measurement<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Measurement<T> {
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Run `f` and measure its wall-clock time on a monotonic clock.
pub fn time<T>(f: impl FnOnce() -> T) -> Measurement<T> {
    let start = Instant::now();
    let value = f();
    Measurement {
        value,
        elapsed: start.elapsed(),
    }
}

/// `sequential / parallel`.
///
/// A zero parallel time gives `+inf`; if both times are zero the runs are
/// considered equally fast and the result is `1.0`.
pub fn speedup(sequential: f64, parallel: f64) -> f64 {
    if parallel == 0.0 {
        if sequential == 0.0 {
            1.0
        } else {
            f64::INFINITY
        }
    } else {
        sequential / parallel
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
}

impl Verdict {
    pub fn is_match(self) -> bool {
        self == Verdict::Match
    }
}

/// Result values that can be checked for sequential/parallel agreement.
pub trait Agree {
    const KERNEL: &'static str;

    fn agrees_with(&self, other: &Self) -> bool;
}

impl Agree for i64 {
    const KERNEL: &'static str = "dot product";

    fn agrees_with(&self, other: &Self) -> bool {
        self == other
    }
}

impl Agree for Matrix {
    const KERNEL: &'static str = "matrix multiply";

    fn agrees_with(&self, other: &Self) -> bool {
        matrices_equal(self, other)
    }
}

/// Both timed runs of one benchmark.
#[derive(Clone, Debug)]
pub struct Comparison<T> {
    pub input_size: usize,
    pub workers: usize,
    pub sequential: Measurement<T>,
    pub parallel: Measurement<T>,
}

impl<T: Agree> Comparison<T> {
    pub fn speedup(&self) -> f64 {
        speedup(self.sequential.seconds(), self.parallel.seconds())
    }

    pub fn verdict(&self) -> Verdict {
        if self.sequential.value.agrees_with(&self.parallel.value) {
            Verdict::Match
        } else {
            Verdict::Mismatch
        }
    }

    /// Turn a mismatch into [`Error::ComputationMismatch`].
    pub fn verify(&self) -> Result<()> {
        match self.verdict() {
            Verdict::Match => Ok(()),
            Verdict::Mismatch => {
                log::warn!("{}: parallel result differs from baseline", T::KERNEL);
                Err(Error::ComputationMismatch { kernel: T::KERNEL })
            }
        }
    }

    pub fn record(&self, label: &str, host: &str) -> BenchmarkRecord {
        BenchmarkRecord {
            label: label.to_string(),
            host: host.to_string(),
            input_size: self.input_size,
            workers: self.workers,
            sequential_seconds: self.sequential.seconds(),
            parallel_seconds: self.parallel.seconds(),
            speedup: self.speedup(),
        }
    }
}

fn compare<T>(
    input_size: usize,
    plan: &Plan,
    sequential: impl FnOnce() -> Result<T>,
    parallel: impl FnOnce() -> Result<T>,
) -> Result<Comparison<T>> {
    let seq = time(sequential);
    let sequential = Measurement {
        value: seq.value?,
        elapsed: seq.elapsed,
    };
    log::info!("sequential: {:.4}s", sequential.seconds());

    let par = time(parallel);
    let parallel = Measurement {
        value: par.value?,
        elapsed: par.elapsed,
    };
    log::info!("parallel ({} workers): {:.4}s", plan.workers, parallel.seconds());

    Ok(Comparison {
        input_size,
        workers: plan.workers,
        sequential,
        parallel,
    })
}

/// Time [`dot::sequential`] against [`dot::parallel_with`].
///
/// Lengths and the worker count are checked before either run starts.
pub fn compare_dot(a: &[i64], b: &[i64], plan: &Plan) -> Result<Comparison<i64>> {
    dot::check_lengths(a, b)?;
    plan.ranges(a.len())?;
    compare(
        a.len(),
        plan,
        || dot::sequential(a, b),
        || dot::parallel_with(a, b, plan),
    )
}

/// Time [`matrix::sequential`] against [`matrix::parallel_with`].
///
/// Dimensions and the worker count are checked before either run starts.
pub fn compare_matmul(a: &Matrix, b: &Matrix, plan: &Plan) -> Result<Comparison<Matrix>> {
    matrix::check_dims(a, b)?;
    plan.ranges(a.dim())?;
    compare(
        a.dim(),
        plan,
        || matrix::sequential(a, b),
        || matrix::parallel_with(a, b, plan),
    )
}
