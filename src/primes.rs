//! Safe-prime generation for the RSA modulus.
//!
//! A safe prime `p` satisfies `p = 2p' + 1` with `p'` prime.  Generation
//! draws a probable prime `p'` one bit shorter than the target, applies a
//! cheap sieve (`p' ≡ 2` and `p ≡ 2 (mod 3)`; any other residue makes one of
//! them divisible by three) and only then pays for Miller–Rabin on `p`.
//!
//! The seeded functions use [`SimplePrng::new(seed)`](SimplePrng::new) as
//! the sole entropy source and move on to `seed + 1` after each rejected
//! candidate, so identical seeds always reproduce identical primes.  The
//! `*_with_rng` functions accept a caller-supplied cryptographic RNG and are
//! the ones to use outside of tests.

use crate::error::{AccumulatorError, Result};
use crate::params::MIN_PRIME_BITS;
use crate::primality::is_probable_prime;
use crate::prng::SimplePrng;
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::{CryptoRng, RngCore};

/// A safe prime together with the seed that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafePrime {
    /// The safe prime `p = 2p' + 1`.
    pub prime: BigUint,
    /// Seed whose stream yielded `p'`.
    pub seed: u64,
}

/// Draws odd `bits`-bit candidates from `rng` until one is a probable prime.
///
/// The top bit is forced so the result has exactly `bits` bits.
///
/// # Errors
///
/// * [`AccumulatorError::InvalidParameters`] if `bits < 2`.
/// * [`AccumulatorError::PrimeGenerationExhausted`] after `max_attempts` candidates.
pub fn generate_probable_prime<R: RngCore + ?Sized>(
    bits: u64,
    certainty: u32,
    max_attempts: u64,
    rng: &mut R,
) -> Result<BigUint> {
    if bits < 2 {
        return Err(AccumulatorError::InvalidParameters(format!(
            "cannot draw a {bits}-bit prime"
        )));
    }
    for _ in 0..max_attempts {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if is_probable_prime(&candidate, certainty) {
            return Ok(candidate);
        }
    }
    Err(AccumulatorError::PrimeGenerationExhausted {
        attempts: max_attempts,
    })
}

/// Draws one `p'` from `rng` and returns `2p' + 1` if it passes the sieve and
/// the primality test.
fn safe_prime_candidate<R: RngCore + ?Sized>(
    bit_length: u64,
    certainty: u32,
    max_attempts: u64,
    rng: &mut R,
) -> Result<Option<BigUint>> {
    let three = BigUint::from(3u8);
    let two = BigUint::from(2u8);
    let inner = generate_probable_prime(bit_length - 1, certainty, max_attempts, rng)?;
    if &inner % &three != two {
        return Ok(None);
    }
    let candidate = (inner << 1u8) + BigUint::one();
    if &candidate % &three != two {
        return Ok(None);
    }
    if is_probable_prime(&candidate, certainty) {
        Ok(Some(candidate))
    } else {
        Ok(None)
    }
}

fn check_bit_length(bit_length: u64) -> Result<()> {
    if bit_length < MIN_PRIME_BITS {
        return Err(AccumulatorError::InvalidParameters(format!(
            "safe primes need at least {MIN_PRIME_BITS} bits, got {bit_length}"
        )));
    }
    Ok(())
}

/// Finds a `bit_length`-bit safe prime starting from `seed`.
///
/// Each seed gets a fresh [`SimplePrng`]; a rejected candidate moves on to
/// `seed + 1`.  The returned [`SafePrime::seed`] is the seed that succeeded.
///
/// # Errors
///
/// * [`AccumulatorError::InvalidParameters`] for `bit_length` below the minimum.
/// * [`AccumulatorError::PrimeGenerationExhausted`] after `max_attempts` seeds.
pub fn generate_safe_prime(
    bit_length: u64,
    seed: u64,
    certainty: u32,
    max_attempts: u64,
) -> Result<SafePrime> {
    check_bit_length(bit_length)?;
    let mut seed = seed;
    for attempt in 0..max_attempts {
        let mut prng = SimplePrng::new(seed);
        let candidate = safe_prime_candidate(bit_length, certainty, max_attempts, &mut prng)?;
        if let Some(prime) = candidate {
            log::debug!("found {}-bit safe prime after {} seed(s)", bit_length, attempt + 1);
            return Ok(SafePrime { prime, seed });
        }
        seed = seed.wrapping_add(1);
    }
    Err(AccumulatorError::PrimeGenerationExhausted {
        attempts: max_attempts,
    })
}

/// Finds a `bit_length`-bit safe prime using a caller-supplied RNG.
///
/// # Errors
///
/// Same as [`generate_safe_prime`].
pub fn generate_safe_prime_with_rng<R: RngCore + CryptoRng + ?Sized>(
    bit_length: u64,
    certainty: u32,
    max_attempts: u64,
    rng: &mut R,
) -> Result<BigUint> {
    check_bit_length(bit_length)?;
    for _ in 0..max_attempts {
        if let Some(prime) = safe_prime_candidate(bit_length, certainty, max_attempts, rng)? {
            return Ok(prime);
        }
    }
    Err(AccumulatorError::PrimeGenerationExhausted {
        attempts: max_attempts,
    })
}

/// Generates two distinct `bit_length`-bit safe primes from two seeds.
///
/// Both searches run independently (concurrently on native targets).  If
/// they land on the same prime, the second search restarts one seed past
/// where it succeeded until the primes differ.
///
/// # Errors
///
/// * Everything [`generate_safe_prime`] returns.
/// * [`AccumulatorError::PrimeGenerationExhausted`] if `max_attempts`
///   restarts of the second search never produce a distinct prime.
pub fn generate_distinct_safe_primes(
    bit_length: u64,
    seed1: u64,
    seed2: u64,
    certainty: u32,
    max_attempts: u64,
) -> Result<(BigUint, BigUint)> {
    check_bit_length(bit_length)?;
    let (first, second) = join(
        || generate_safe_prime(bit_length, seed1, certainty, max_attempts),
        || generate_safe_prime(bit_length, seed2, certainty, max_attempts),
    );
    let first = first?;
    let mut second = second?;
    let mut restarts = 0u64;
    while first.prime == second.prime {
        if restarts == max_attempts {
            return Err(AccumulatorError::PrimeGenerationExhausted {
                attempts: max_attempts,
            });
        }
        restarts += 1;
        second = generate_safe_prime(
            bit_length,
            second.seed.wrapping_add(1),
            certainty,
            max_attempts,
        )?;
    }
    Ok((first.prime, second.prime))
}

/// Generates two distinct `bit_length`-bit safe primes from a caller RNG.
///
/// # Errors
///
/// Same as [`generate_distinct_safe_primes`].
pub fn generate_distinct_safe_primes_with_rng<R: RngCore + CryptoRng + ?Sized>(
    bit_length: u64,
    certainty: u32,
    max_attempts: u64,
    rng: &mut R,
) -> Result<(BigUint, BigUint)> {
    let first = generate_safe_prime_with_rng(bit_length, certainty, max_attempts, rng)?;
    for _ in 0..max_attempts {
        let second = generate_safe_prime_with_rng(bit_length, certainty, max_attempts, rng)?;
        if second != first {
            return Ok((first, second));
        }
    }
    Err(AccumulatorError::PrimeGenerationExhausted {
        attempts: max_attempts,
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    rayon::join(a, b)
}

#[cfg(target_arch = "wasm32")]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA,
    B: FnOnce() -> RB,
{
    (a(), b())
}

#[cfg(test)]
mod tests {
    use super::{
        generate_distinct_safe_primes, generate_distinct_safe_primes_with_rng,
        generate_probable_prime, generate_safe_prime, generate_safe_prime_with_rng,
    };
    use crate::error::AccumulatorError;
    use crate::primality::is_probable_prime;
    use crate::prng::SimplePrng;
    use num_bigint::BigUint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_safe_prime(p: &BigUint, bits: u64) {
        assert_eq!(p.bits(), bits);
        assert!(is_probable_prime(p, 20));
        let inner = (p - 1u8) >> 1u8;
        assert!(is_probable_prime(&inner, 20));
        assert_eq!(p % BigUint::from(3u8), BigUint::from(2u8));
    }

    #[test]
    fn test_probable_prime_has_requested_size() {
        let mut prng = SimplePrng::new(11);
        for bits in [2u64, 8, 33, 64, 128] {
            let p = generate_probable_prime(bits, 20, 100_000, &mut prng).unwrap();
            assert_eq!(p.bits(), bits);
            assert!(is_probable_prime(&p, 20));
        }
    }

    #[test]
    fn test_probable_prime_rejects_one_bit() {
        let mut prng = SimplePrng::new(0);
        let err = generate_probable_prime(1, 20, 10, &mut prng).unwrap_err();
        assert!(matches!(err, AccumulatorError::InvalidParameters(_)));
    }

    #[test]
    fn test_safe_prime_structure() {
        for bits in [8u64, 32, 64, 96] {
            let safe =
                generate_safe_prime(bits, 1_234_567_890_123_456_789, 20, 1_000_000).unwrap();
            assert_safe_prime(&safe.prime, bits);
            assert!(safe.seed >= 1_234_567_890_123_456_789);
        }
    }

    #[test]
    fn test_safe_prime_is_reproducible() {
        let a = generate_safe_prime(64, 42, 20, 1_000_000).unwrap();
        let b = generate_safe_prime(64, 42, 20, 1_000_000).unwrap();
        assert_eq!(a, b);
        // Restarting from the successful seed lands on the same prime.
        let c = generate_safe_prime(64, a.seed, 20, 1_000_000).unwrap();
        assert_eq!(a, c);
    }

    #[test]
    fn test_safe_prime_exhaustion() {
        let err = generate_safe_prime(64, 1, 20, 0).unwrap_err();
        assert_eq!(err, AccumulatorError::PrimeGenerationExhausted { attempts: 0 });
    }

    #[test]
    fn test_safe_prime_rejects_tiny_sizes() {
        let err = generate_safe_prime(3, 1, 20, 10).unwrap_err();
        assert!(matches!(err, AccumulatorError::InvalidParameters(_)));
    }

    #[test]
    fn test_distinct_pair_from_seeds() {
        let (p, q) = generate_distinct_safe_primes(
            64,
            1_234_567_890_123_456_789,
            1_098_765_432_109_876_543,
            20,
            1_000_000,
        )
        .unwrap();
        assert_ne!(p, q);
        assert_safe_prime(&p, 64);
        assert_safe_prime(&q, 64);
        let again = generate_distinct_safe_primes(
            64,
            1_234_567_890_123_456_789,
            1_098_765_432_109_876_543,
            20,
            1_000_000,
        )
        .unwrap();
        assert_eq!((p, q), again);
    }

    #[test]
    fn test_equal_seeds_still_yield_distinct_primes() {
        let (p, q) = generate_distinct_safe_primes(48, 77, 77, 20, 1_000_000).unwrap();
        assert_ne!(p, q);
        assert_eq!(p, generate_safe_prime(48, 77, 20, 1_000_000).unwrap().prime);
        assert_safe_prime(&q, 48);
    }

    #[test]
    fn test_pair_with_caller_rng() {
        let mut rng = StdRng::seed_from_u64(2024);
        let (p, q) = generate_distinct_safe_primes_with_rng(64, 20, 1_000_000, &mut rng).unwrap();
        assert_ne!(p, q);
        assert_safe_prime(&p, 64);
        assert_safe_prime(&q, 64);
        let single = generate_safe_prime_with_rng(32, 20, 1_000_000, &mut rng).unwrap();
        assert_safe_prime(&single, 32);
    }
}
