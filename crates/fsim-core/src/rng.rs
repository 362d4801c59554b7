//! Deterministic RNG wrapper and seed-derivation helpers.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

use crate::MAX_K;

/// Random facility consumed by diagram selection and move proposals.
///
/// The handle is a thin wrapper around `StdRng`. A master `seed: u64` must be
/// provided by the caller. Substreams are derived by hashing
/// `(master_seed, substream_id)` with SipHash-1-3 configured with fixed zero
/// keys, so independent trajectories never share a stream.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
    seed: u64,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Re-seeds the handle in place.
    pub fn reset(&mut self, seed: u64) {
        *self = Self::from_seed(seed);
    }

    /// Seed the handle was last created or reset with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer from the half-open range `[lo, hi)`.
    ///
    /// Panics when the range is empty; callers picking from a pool must guard
    /// against an empty pool first.
    pub fn irn(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo < hi, "irn called with empty range [{lo}, {hi})");
        self.rng.gen_range(lo..hi)
    }

    /// Uniform index from `[0, len)`.
    pub fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick an index from an empty range");
        self.rng.gen_range(0..len)
    }

    /// Uniform real from `[0, 1)`.
    pub fn urn(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform momentum label from `[-MAX_K, MAX_K)`.
    pub fn random_pick_k(&mut self) -> i32 {
        self.irn(-(MAX_K as i64), MAX_K as i64) as i32
    }

    /// Uniform spin change, either `+1` or `-1`.
    pub fn random_pick_dspin(&mut self) -> i32 {
        (self.irn(0, 2) * 2 - 1) as i32
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Derives the deterministic seed for a specific substream.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
