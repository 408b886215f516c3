//! Probabilistic primality testing.
//!
//! Candidates first go through trial division by every prime below 256,
//! which settles all inputs below 2¹⁶ outright and discards most composites
//! cheaply.  Survivors face Miller–Rabin rounds whose bases are drawn from a
//! [`SimplePrng`] bound to the candidate itself, so the verdict for a given
//! `(n, rounds)` is always the same.  That matters: proof verification must
//! recompute exactly the prime the prover used.

use crate::prng::SimplePrng;
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

const SMALL_PRIMES: [u32; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

// Every composite below 2^16 has a prime factor below 2^8.
const TRIAL_DIVISION_BOUND: u32 = 1 << 16;

/// Returns `true` if `n` is probably prime.
///
/// `rounds` Miller–Rabin rounds are run after trial division; a composite
/// survives with probability at most `4^-rounds`.  A `rounds` of zero is
/// treated as one.
pub fn is_probable_prime(n: &BigUint, rounds: u32) -> bool {
    match n.to_u32() {
        Some(small) if small < 2 => return false,
        _ => {}
    }
    for &p in SMALL_PRIMES.iter() {
        if (n % p).is_zero() {
            return *n == BigUint::from(p);
        }
    }
    if *n < BigUint::from(TRIAL_DIVISION_BOUND) {
        return true;
    }

    let one = BigUint::one();
    let two = BigUint::from(2u8);
    let n_minus_one = n - &one;
    // n is odd here, so n - 1 has at least one trailing zero.
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    let mut prng = SimplePrng::from_material(&n.to_bytes_be());
    for _ in 0..rounds.max(1) {
        let base = prng.gen_biguint_range(&two, &n_minus_one);
        if !miller_rabin_round(n, &n_minus_one, &d, s, &base) {
            return false;
        }
    }
    true
}

/// One Miller–Rabin round for `n - 1 = d·2^s` and witness candidate `base`.
fn miller_rabin_round(
    n: &BigUint,
    n_minus_one: &BigUint,
    d: &BigUint,
    s: u64,
    base: &BigUint,
) -> bool {
    let mut x = base.modpow(d, n);
    if x.is_one() || x == *n_minus_one {
        return true;
    }
    for _ in 1..s {
        x = (&x * &x).mod_floor(n);
        if x == *n_minus_one {
            return true;
        }
        if x.is_one() {
            return false;
        }
    }
    false
}
