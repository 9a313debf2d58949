//! Splitting an index extent into contiguous per-worker ranges.
//!
//! The default split hands every worker `extent / workers` elements and lets
//! the last worker absorb the remainder. With a large remainder this leaves
//! the last worker with noticeably more work than the others; results stay
//! comparable with earlier runs that used the same policy. [`Split::Balanced`]
//! spreads the remainder over the first ranges instead.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Half-open index interval `[start, end)` owned by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Indices covered by this range.
    pub fn indices(&self) -> core::ops::Range<usize> {
        self.start..self.end
    }
}

impl core::fmt::Display for Range {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// How the remainder of `extent / workers` is distributed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// The last range takes every leftover element.
    #[default]
    Last,
    /// The first `extent % workers` ranges take one extra element each.
    Balanced,
}

/// Partition `[0, extent)` into `workers` ranges, remainder to the last one.
///
/// When `workers > extent` the block size is zero, so every range but the
/// last is empty and the last one is `[0, extent)`. `extent == 0` yields
/// `workers` empty ranges.
pub fn partition(extent: usize, workers: usize) -> Result<Vec<Range>> {
    if workers == 0 {
        return Err(Error::invalid("worker count must be positive"));
    }

    let block = extent / workers;
    let ranges = (0..workers)
        .map(|i| {
            let start = i * block;
            let end = if i == workers - 1 { extent } else { (i + 1) * block };
            Range::new(start, end)
        })
        .collect();
    Ok(ranges)
}

/// Partition `[0, extent)` into `workers` ranges whose lengths differ by at
/// most one.
pub fn partition_balanced(extent: usize, workers: usize) -> Result<Vec<Range>> {
    if workers == 0 {
        return Err(Error::invalid("worker count must be positive"));
    }

    let block = extent / workers;
    let extra = extent % workers;
    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for i in 0..workers {
        let len = block + usize::from(i < extra);
        ranges.push(Range::new(start, start + len));
        start += len;
    }
    Ok(ranges)
}

impl FromStr for Split {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "last" => Ok(Split::Last),
            "balanced" => Ok(Split::Balanced),
            other => Err(format!("unknown split '{other}' (expected last|balanced)")),
        }
    }
}

impl Split {
    pub fn partition(self, extent: usize, workers: usize) -> Result<Vec<Range>> {
        match self {
            Split::Last => partition(extent, workers),
            Split::Balanced => partition_balanced(extent, workers),
        }
    }
}

/// Check that `ranges` tile `[0, extent)` exactly, in order.
pub fn covers(ranges: &[Range], extent: usize) -> bool {
    let mut next = 0;
    for r in ranges {
        if r.start != next || r.end < r.start {
            return false;
        }
        next = r.end;
    }
    next == extent
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(ranges: &[Range]) -> Vec<(usize, usize)> {
        ranges.iter().map(|r| (r.start, r.end)).collect()
    }

    #[test]
    fn test_remainder_goes_to_last() {
        let ranges = partition(10, 3).unwrap();
        assert_eq!(spans(&ranges), [(0, 3), (3, 6), (6, 10)]);
    }

    #[test]
    fn test_even_split() {
        let ranges = partition(8, 4).unwrap();
        assert_eq!(spans(&ranges), [(0, 2), (2, 4), (4, 6), (6, 8)]);
    }

    #[test]
    fn test_single_worker() {
        let ranges = partition(17, 1).unwrap();
        assert_eq!(spans(&ranges), [(0, 17)]);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(partition(10, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            partition_balanced(10, 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_more_workers_than_elements() {
        let ranges = partition(3, 5).unwrap();
        assert_eq!(ranges.len(), 5);
        assert!(ranges[..4].iter().all(Range::is_empty));
        assert_eq!(ranges[4], Range::new(0, 3));
        assert!(covers(&ranges, 3));
    }

    #[test]
    fn test_empty_extent() {
        let ranges = partition(0, 4).unwrap();
        assert_eq!(ranges.len(), 4);
        assert!(ranges.iter().all(Range::is_empty));
        assert!(covers(&ranges, 0));
    }

    #[test]
    fn test_balanced_spreads_remainder() {
        let ranges = partition_balanced(10, 3).unwrap();
        assert_eq!(spans(&ranges), [(0, 4), (4, 7), (7, 10)]);

        let ranges = partition_balanced(3, 5).unwrap();
        assert_eq!(spans(&ranges), [(0, 1), (1, 2), (2, 3), (3, 3), (3, 3)]);
    }

    #[test]
    fn test_covers_rejects_gaps() {
        assert!(!covers(&[Range::new(0, 2), Range::new(3, 5)], 5));
        assert!(!covers(&[Range::new(0, 2)], 5));
        assert!(covers(&[Range::new(0, 2), Range::new(2, 5)], 5));
    }

    #[test]
    fn test_range_display() {
        assert_eq!(Range::new(6, 10).to_string(), "[6, 10)");
        assert_eq!(Range::new(6, 10).len(), 4);
    }
}
