//! Integer dot product, sequential and chunked-parallel.
//!
//! Both paths use wrapping 64-bit arithmetic, so they agree even when the
//! sum overflows. For the usual inputs (values in `[0, 100)`, up to 5·10^7
//! elements) the sum stays far below `i64::MAX`.

use crate::error::{Error, Result};
use crate::exec::{map_ranges, Plan};
use crate::partition::Range;

pub(crate) fn check_lengths(a: &[i64], b: &[i64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::invalid(format!(
            "vector lengths differ: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

/// Dot product of `a[range]` and `b[range]`.
pub fn dot_range(a: &[i64], b: &[i64], range: Range) -> i64 {
    a[range.indices()]
        .iter()
        .zip(&b[range.indices()])
        .fold(0i64, |acc, (&x, &y)| acc.wrapping_add(x.wrapping_mul(y)))
}

/// Single-threaded baseline.
pub fn sequential(a: &[i64], b: &[i64]) -> Result<i64> {
    check_lengths(a, b)?;
    let mut sum = 0i64;
    for (&x, &y) in a.iter().zip(b) {
        sum = sum.wrapping_add(x.wrapping_mul(y));
    }
    Ok(sum)
}

/// Parallel dot product over `workers` ranges with the default plan.
pub fn parallel(a: &[i64], b: &[i64], workers: usize) -> Result<i64> {
    parallel_with(a, b, &Plan::new(workers))
}

/// Parallel dot product: one private accumulator per range, summed in
/// worker order once every unit has finished.
pub fn parallel_with(a: &[i64], b: &[i64], plan: &Plan) -> Result<i64> {
    check_lengths(a, b)?;
    let ranges = plan.ranges(a.len())?;
    log::debug!("dot: {} elements over {} ranges", a.len(), ranges.len());

    let partials = map_ranges(plan.executor, &ranges, |range| dot_range(a, b, range))?;
    Ok(partials.iter().fold(0i64, |acc, &p| acc.wrapping_add(p)))
}
