//! Injectable randomness for room selection.
//!
//! # Responsibility
//! - Hide the concrete RNG behind a one-method trait so allocation can be
//!   driven deterministically in tests.
//!
//! # Invariants
//! - `pick_index(len)` returns a value in `0..len` for any `len > 0`.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, RngCore, SeedableRng};

/// Source of uniform choices among eligible rooms.
pub trait RandomSource {
    /// Returns an index uniformly distributed over `0..len`.
    ///
    /// Callers never pass `len == 0`.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// [`RandomSource`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R: RngCore> {
    rng: R,
}

impl<R: RngCore> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<ThreadRng> {
    /// Thread-local generator used in production.
    pub fn thread() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl RngSource<StdRng> {
    /// Seeded generator for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> RandomSource for RngSource<R> {
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }
}
