//! Chunked parallel reductions with a sequential-vs-parallel harness.
//!
//! An index extent is split into contiguous ranges ([`partition`]), one unit
//! of work runs per range ([`exec`]), and the results are joined behind a
//! full barrier. Two kernels use the pattern: an integer dot product with a
//! private accumulator per worker ([`dot`]), and a square matrix product
//! where every worker owns a disjoint block of output rows ([`matrix`]).
//! [`bench`] times both paths against each other and [`report`] persists
//! the outcome.

pub mod bench;
pub mod dot;
pub mod error;
pub mod exec;
pub mod matrix;
pub mod partition;
pub mod report;

pub use bench::{compare_dot, compare_matmul, speedup, Comparison, Measurement, Verdict};
pub use error::{Error, Result};
pub use exec::{available_workers, Executor, Plan, PlanBuilder};
pub use matrix::{matrices_equal, Matrix};
pub use partition::{partition, partition_balanced, Range, Split};
pub use report::{BenchmarkRecord, JsonLines, LogFormat, ReportSink, TextLog};
