//! Seeded input generation for the benchmark programs.
//!
//! Values are drawn uniformly-ish from `[0, bound)` with a ChaCha8 stream, so
//! a seed fully determines the inputs of a run.

use std::time::{SystemTime, UNIX_EPOCH};

use parbench::{Error, Matrix, Result};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Upper bound (exclusive) for vector elements.
pub const VECTOR_BOUND: u32 = 100;
/// Upper bound (exclusive) for matrix cells.
pub const MATRIX_BOUND: u32 = 10;

/// Vector length large enough for the work to dominate thread start-up.
pub const DEFAULT_VECTOR_LEN: usize = 50_000_000;
/// Matrix dimension; the product is O(n^3).
pub const DEFAULT_MATRIX_DIM: usize = 1000;

/// Seed taken from the wall clock, for runs that do not pin one.
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

pub struct InputGen {
    rng: ChaCha8Rng,
}

impl InputGen {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn next_below(&mut self, bound: u32) -> i64 {
        // Modulo bias is negligible for the small bounds used here.
        (self.rng.next_u32() % bound) as i64
    }

    fn values(&mut self, len: usize, bound: u32) -> Result<Vec<i64>> {
        if bound == 0 {
            return Err(Error::InvalidArgument("value bound must be positive".into()));
        }
        Ok((0..len).map(|_| self.next_below(bound)).collect())
    }

    /// `len` values in `[0, bound)`.
    pub fn vector(&mut self, len: usize, bound: u32) -> Result<Vec<i64>> {
        log::debug!("generating vector of {} values below {}", len, bound);
        self.values(len, bound)
    }

    /// `dim x dim` matrix with cells in `[0, bound)`.
    pub fn matrix(&mut self, dim: usize, bound: u32) -> Result<Matrix> {
        log::debug!("generating {}x{} matrix below {}", dim, dim, bound);
        let len = dim
            .checked_mul(dim)
            .ok_or_else(|| Error::InvalidArgument(format!("matrix dimension {dim} too large")))?;
        Matrix::from_vec(dim, self.values(len, bound)?)
    }
}
