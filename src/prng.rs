//! Seeded pseudorandom stream used as the sole entropy source for
//! reproducible prime generation and sampling.
//!
//! The generator expands a 32-byte seed with domain-separated BLAKE2b-256:
//! every output block is the hash of the seed and an invocation counter.
//! Identical seeds always produce identical streams, which is what makes
//! [`Accumulator::bootstrap`](crate::Accumulator::bootstrap) reproducible.
//! Seed-derived generation is meant for tests and debugging; production
//! callers should reach for the `*_with_rng` entry points instead.

use crate::error::{AccumulatorError, Result};
use blake2::digest::{consts::U32, Digest};
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

type Blake2b256 = blake2::Blake2b<U32>;

const PRNG_DOMAIN: &[u8] = b"RSA_ACC_PRNG";
const MATERIAL_DOMAIN: &[u8] = b"RSA_ACC_PRNG_MATERIAL";

/// A deterministic stream generator derived from BLAKE2b-256.
///
/// Internal state is wiped when the generator is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SimplePrng {
    seed: [u8; 32],
    counter: u64,
    buffer: [u8; 32],
    offset: usize,
}

impl fmt::Debug for SimplePrng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplePrng")
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

impl SimplePrng {
    /// Creates a new PRNG seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(PRNG_DOMAIN);
        hasher.update(seed.to_be_bytes());
        let mut base = [0u8; 32];
        base.copy_from_slice(&hasher.finalize());
        Self::from_seed_bytes(base)
    }

    /// Creates a PRNG from a raw 32-byte seed.
    pub fn from_seed_bytes(seed: [u8; 32]) -> Self {
        Self {
            seed,
            counter: 0,
            buffer: [0u8; 32],
            offset: 32,
        }
    }

    /// Creates a PRNG whose seed is bound to arbitrary byte material.
    pub(crate) fn from_material(material: &[u8]) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(MATERIAL_DOMAIN);
        hasher.update((material.len() as u64).to_be_bytes());
        hasher.update(material);
        let mut base = [0u8; 32];
        base.copy_from_slice(&hasher.finalize());
        Self::from_seed_bytes(base)
    }

    fn refill(&mut self) {
        let mut hasher = Blake2b256::new();
        hasher.update(PRNG_DOMAIN);
        hasher.update(self.seed);
        hasher.update(self.counter.to_be_bytes());
        self.buffer.copy_from_slice(&hasher.finalize());
        self.counter = self.counter.wrapping_add(1);
        self.offset = 0;
    }
}

impl RngCore for SimplePrng {
    fn next_u32(&mut self) -> u32 {
        let mut chunk = [0u8; 4];
        self.fill_bytes(&mut chunk);
        u32::from_be_bytes(chunk)
    }

    fn next_u64(&mut self) -> u64 {
        let mut chunk = [0u8; 8];
        self.fill_bytes(&mut chunk);
        u64::from_be_bytes(chunk)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut written = 0;
        while written < dest.len() {
            if self.offset >= self.buffer.len() {
                self.refill();
            }
            let take = (self.buffer.len() - self.offset).min(dest.len() - written);
            dest[written..written + take]
                .copy_from_slice(&self.buffer[self.offset..self.offset + take]);
            self.offset += take;
            written += take;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Samples `r` with `from < r < until`, using `seed` as the only entropy.
///
/// Each attempt draws a uniform `until.bits()`-bit integer from
/// [`SimplePrng::new`] and rejects it if it falls outside the open range; a
/// rejected draw retries with `seed + 1`.  When `from >= until` the lower
/// bound is clamped to zero and a warning is logged; use
/// [`random_big_integer_checked`] to turn that case into an error instead.
///
/// # Errors
///
/// * [`AccumulatorError::InvalidRange`] if no integer lies strictly between
///   the (normalized) bounds.
/// * [`AccumulatorError::SamplingExhausted`] after `max_attempts` rejections.
pub fn random_big_integer(
    from: &BigUint,
    until: &BigUint,
    seed: u64,
    max_attempts: u64,
) -> Result<BigUint> {
    if from >= until {
        log::warn!(
            "sampling lower bound {} is not below upper bound {}; using 0 instead",
            from,
            until
        );
        return sample_open_range(&BigUint::default(), until, seed, max_attempts);
    }
    sample_open_range(from, until, seed, max_attempts)
}

/// Strict variant of [`random_big_integer`] that refuses `from >= until`.
///
/// # Errors
///
/// Returns [`AccumulatorError::InvalidRange`] instead of normalizing the
/// lower bound, plus every error [`random_big_integer`] can return.
pub fn random_big_integer_checked(
    from: &BigUint,
    until: &BigUint,
    seed: u64,
    max_attempts: u64,
) -> Result<BigUint> {
    if from >= until {
        return Err(AccumulatorError::InvalidRange {
            from: from.clone(),
            until: until.clone(),
        });
    }
    sample_open_range(from, until, seed, max_attempts)
}

fn sample_open_range(
    from: &BigUint,
    until: &BigUint,
    seed: u64,
    max_attempts: u64,
) -> Result<BigUint> {
    if &(from + BigUint::one()) >= until {
        return Err(AccumulatorError::InvalidRange {
            from: from.clone(),
            until: until.clone(),
        });
    }
    let bits = until.bits();
    let mut seed = seed;
    for _ in 0..max_attempts {
        let mut prng = SimplePrng::new(seed);
        let candidate = prng.gen_biguint(bits);
        if &candidate > from && &candidate < until {
            return Ok(candidate);
        }
        seed = seed.wrapping_add(1);
    }
    Err(AccumulatorError::SamplingExhausted {
        attempts: max_attempts,
    })
}
